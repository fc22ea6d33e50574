use crate::board::position::{Move, Position};
use crate::eval::evaluate::MATE_VALUE;
use crate::movegen::legal_moves::{has_capture, MoveCache};
use crate::search::pv;
use crate::search::transposition::{MtdEntry, TranspositionTable};
use crate::search::{SearchResult, MAX_NODES, MAX_SEARCH_DEPTH};

// Bisection stops once lower and upper are this close.
const EVAL_ROUGHNESS: i32 = 3;

pub struct MtdSearch {
    tt: TranspositionTable<MtdEntry>,
    nodes: u64,
    max_nodes: u64,
}

impl MtdSearch {
    pub fn new() -> Self {
        Self::with_budget(MAX_NODES)
    }

    pub fn with_budget(max_nodes: u64) -> Self {
        Self {
            tt: TranspositionTable::new(),
            nodes: 0,
            max_nodes,
        }
    }

    pub fn set_budget(&mut self, max_nodes: u64) {
        self.max_nodes = max_nodes;
    }

    pub fn tt(&self) -> &TranspositionTable<MtdEntry> {
        &self.tt
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    // Iterative deepening with a bisection on the score: every probe is a
    // null-window alpha-beta around gamma, and the window shrinks until
    // lower and upper nearly meet. The budget is only checked between
    // depth iterations, so a started depth always completes.
    pub fn search(&mut self, gen: &mut MoveCache, pos: &Position) -> SearchResult {
        self.tt.begin_search();
        self.nodes = 0;

        if gen.legal_moves(pos).is_empty() {
            return SearchResult::terminal(pos.score);
        }

        let mut score = 0;
        let mut depth_reached = 0;
        for depth in 1..=MAX_SEARCH_DEPTH {
            let mut lower = -MATE_VALUE;
            let mut upper = MATE_VALUE;
            while lower < upper - EVAL_ROUGHNESS {
                let gamma = (lower + upper + 1).div_euclid(2);
                let bound = self.bound(gen, pos, gamma, depth);
                if bound >= gamma {
                    lower = bound;
                } else {
                    upper = bound;
                }
            }
            score = lower;
            depth_reached = depth;
            if self.nodes >= self.max_nodes || score.abs() >= MATE_VALUE {
                break;
            }
        }

        let best_move = match self.tt.probe(pos.key()) {
            Some(entry) => entry.best_move.clone(),
            None => None,
        };
        SearchResult {
            best_move,
            score,
            depth: depth_reached,
            nodes: self.nodes,
            pv: pv::moves(&self.tt, pos),
        }
    }

    // Null-window probe: returns a score that is meaningful only on its
    // gamma side (>= gamma proves at least, < gamma proves at most).
    fn bound(&mut self, gen: &mut MoveCache, pos: &Position, gamma: i32, depth: i32) -> i32 {
        self.nodes += 1;
        let key = pos.key();

        if let Some(entry) = self.tt.probe(key) {
            if entry.depth >= depth
                && ((entry.score < entry.gamma && entry.score < gamma)
                    || (entry.score >= entry.gamma && entry.score >= gamma))
            {
                return entry.score;
            }
        }

        if pos.score.abs() >= MATE_VALUE {
            return pos.score;
        }

        // Null move: only sound when the opponent cannot answer with a
        // capture, otherwise passing hands over a forced win.
        if depth >= 4 && !has_capture(pos) {
            let r = if depth > 8 { 3 } else { 2 };
            let nullscore = -self.bound(gen, &pos.rotate(), 1 - gamma, depth - 1 - r);
            if nullscore >= gamma {
                return nullscore;
            }
        }

        if depth <= 0 && !has_capture(pos) {
            return pos.score;
        }

        let mut moves = gen.legal_moves(pos);
        if moves.is_empty() {
            return -MATE_VALUE;
        }
        moves.sort_by_key(|m| -pos.eval_move(m));

        let mut best = -MATE_VALUE;
        let mut best_move: Option<Move> = None;
        for m in moves {
            let score = -self.bound(gen, &pos.do_move(&m), 1 - gamma, depth - 1);
            if best_move.is_none() || score > best {
                best = score;
                best_move = Some(m);
            }
            if best >= gamma {
                break;
            }
        }

        // Depth-preferring replacement; only fail-high results may
        // overwrite, they are the ones carrying a best move.
        let overwrite = match self.tt.probe(key) {
            Some(entry) => depth >= entry.depth && best >= gamma,
            None => true,
        };
        if overwrite {
            self.tt.store(
                key,
                MtdEntry {
                    depth,
                    score: best,
                    gamma,
                    best_move,
                },
            );
        }
        best
    }
}

impl Default for MtdSearch {
    fn default() -> Self {
        Self::new()
    }
}
