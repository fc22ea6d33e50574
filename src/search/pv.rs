use std::collections::HashSet;

use crate::board::position::{Move, Position};
use crate::search::transposition::{SearchEntry, TranspositionTable};

#[derive(Debug, Clone)]
pub struct PvNode {
    pub position: Position,
    pub score: i32,
    pub mv: Move,
}

// Walks the table from `pos` following stored best moves. Stops on a
// missing entry, a missing best move, or a key seen before (repetitions
// would loop forever otherwise).
pub fn reconstruct<E: SearchEntry>(tt: &TranspositionTable<E>, pos: &Position) -> Vec<PvNode> {
    let mut line = Vec::new();
    let mut visited = HashSet::new();
    let mut current = *pos;

    loop {
        let key = current.key();
        if !visited.insert(key) {
            break;
        }
        let entry = match tt.probe(key) {
            Some(entry) => entry,
            None => break,
        };
        let mv = match entry.best_move() {
            Some(mv) => mv.clone(),
            None => break,
        };
        line.push(PvNode {
            position: current,
            score: entry.score(),
            mv: mv.clone(),
        });
        current = current.do_move(&mv);
    }
    line
}

pub fn moves<E: SearchEntry>(tt: &TranspositionTable<E>, pos: &Position) -> Vec<Move> {
    reconstruct(tt, pos).into_iter().map(|node| node.mv).collect()
}
