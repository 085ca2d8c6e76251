pub mod bitboard;
pub mod ggf;
pub mod movegen;
pub mod perft;
pub mod position;
pub mod time_control;
pub mod types;

pub use bitboard::*;
pub use ggf::GameRecord;
pub use movegen::{available_generators, generator, MoveGenerator, ScalarGenerator, Tier};
pub use perft::{perft, perft_divide};
pub use position::*;
pub use time_control::*;
pub use types::*;
