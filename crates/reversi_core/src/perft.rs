use crate::position::Position;
use crate::types::Move;

/// Count leaf nodes `depth` plies ahead. A forced pass counts as a ply; a
/// finished game counts as a single leaf.
pub fn perft(pos: &mut Position, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = pos.legal_moves();
    if moves.is_empty() {
        return 1;
    }
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for mv in moves {
        pos.apply(mv);
        nodes += perft(pos, depth - 1);
        pos.undo();
    }
    nodes
}

/// Per-move breakdown at the root, useful when hunting generator bugs.
pub fn perft_divide(pos: &mut Position, depth: u8) -> Vec<(Move, u64)> {
    pos.legal_moves()
        .into_iter()
        .map(|mv| {
            pos.apply(mv);
            let nodes = perft(pos, depth.saturating_sub(1));
            pos.undo();
            (mv, nodes)
        })
        .collect()
}
