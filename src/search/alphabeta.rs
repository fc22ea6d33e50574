use crate::board::position::{Move, Position};
use crate::eval::evaluate::MATE_VALUE;
use crate::movegen::legal_moves::{has_capture, MoveCache};
use crate::search::pv;
use crate::search::transposition::{AbEntry, TranspositionTable};
use crate::search::{SearchResult, MAX_NODES, MAX_SEARCH_DEPTH};

const ASPIRATION_WINDOW: i32 = 50;

// Classical failsoft alpha-beta with explicit max/min players. Scores are
// kept in the max player's frame, so min-side leaves negate pos.score.
pub struct AlphaBetaSearch {
    tt: TranspositionTable<AbEntry>,
    nodes: u64,
    max_nodes: u64,
}

impl AlphaBetaSearch {
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

    pub fn tt(&self) -> &TranspositionTable<AbEntry> {
        &self.tt
    }

    // Iterative deepening inside an aspiration window around the previous
    // score. A fail outside the window re-searches the same depth at full
    // width; a fail at full width is already exact and is accepted.
    pub fn search(&mut self, gen: &mut MoveCache, pos: &Position) -> SearchResult {
        self.tt.begin_search();
        self.nodes = 0;

        if gen.legal_moves(pos).is_empty() {
            return SearchResult::terminal(pos.score);
        }

        let mut alpha = -MATE_VALUE;
        let mut beta = MATE_VALUE;
        let mut score = 0;
        let mut depth = 1;
        let mut depth_reached = 0;
        while depth <= MAX_SEARCH_DEPTH {
            score = self.alphabeta(gen, pos, alpha, beta, depth, 0);

            if (score <= alpha || score >= beta) && (alpha > -MATE_VALUE || beta < MATE_VALUE) {
                alpha = -MATE_VALUE;
                beta = MATE_VALUE;
                continue;
            }

            depth_reached = depth;
            alpha = score - ASPIRATION_WINDOW;
            beta = score + ASPIRATION_WINDOW;
            if self.nodes >= self.max_nodes || score.abs() >= MATE_VALUE {
                break;
            }
            depth += 1;
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

    fn alphabeta(
        &mut self,
        gen: &mut MoveCache,
        pos: &Position,
        mut alpha: i32,
        mut beta: i32,
        depth: i32,
        player: u8,
    ) -> i32 {
        self.nodes += 1;
        let key = pos.key();

        if let Some(entry) = self.tt.probe(key) {
            if entry.depth >= depth {
                return entry.score;
            }
        }

        let stand = if player == 0 { pos.score } else { -pos.score };
        if pos.score.abs() >= MATE_VALUE {
            return stand;
        }

        if depth >= 4 && !has_capture(pos) {
            let r = if depth > 8 { 3 } else { 2 };
            let nullscore =
                self.alphabeta(gen, &pos.rotate(), alpha, beta, depth - 1 - r, 1 - player);
            if player == 0 && nullscore >= beta {
                return nullscore;
            }
            if player == 1 && nullscore <= alpha {
                return nullscore;
            }
        }

        if depth <= 0 && !has_capture(pos) {
            return stand;
        }

        let mut moves = gen.legal_moves(pos);
        if moves.is_empty() {
            // The side to move here has lost.
            return if player == 0 { -MATE_VALUE } else { MATE_VALUE };
        }
        moves.sort_by_key(|m| -pos.eval_move(m));

        let mut best = 0;
        let mut best_move: Option<Move> = None;
        if player == 0 {
            for m in moves {
                let score = self.alphabeta(gen, &pos.do_move(&m), alpha, beta, depth - 1, 1);
                if best_move.is_none() || score > best {
                    best = score;
                    best_move = Some(m);
                }
                alpha = alpha.max(best);
                if beta <= alpha {
                    break;
                }
            }
        } else {
            for m in moves {
                let score = self.alphabeta(gen, &pos.do_move(&m), alpha, beta, depth - 1, 0);
                if best_move.is_none() || score < best {
                    best = score;
                    best_move = Some(m);
                }
                beta = beta.min(best);
                if beta <= alpha {
                    break;
                }
            }
        }

        let overwrite = match self.tt.probe(key) {
            Some(entry) => depth >= entry.depth,
            None => true,
        };
        if overwrite {
            self.tt.store(
                key,
                AbEntry {
                    depth,
                    score: best,
                    best_move,
                },
            );
        }
        best
    }
}

impl Default for AlphaBetaSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::position::{Position, EMPTY, SENTINEL};

    fn board_with(own: &[(usize, u8)], opp: &[(usize, u8)]) -> Position {
        let mut board = [EMPTY; 52];
        board[0] = SENTINEL;
        board[51] = SENTINEL;
        for &(sq, cell) in own {
            board[sq] = cell;
        }
        for &(sq, cell) in opp {
            board[sq] = cell;
        }
        Position::from_board(board)
    }

    #[test]
    fn test_finds_the_winning_capture() {
        let pos = board_with(&[(28, b'P')], &[(23, b'p')]);
        let mut gen = MoveCache::new();
        let mut search = AlphaBetaSearch::with_budget(10_000);
        let result = search.search(&mut gen, &pos);

        let best = result.best_move.expect("a best move");
        assert_eq!(best.steps, vec![28, 19]);
        assert!(result.score >= MATE_VALUE);
    }

    #[test]
    fn test_initial_position_is_sane() {
        let pos = Position::initial();
        let mut gen = MoveCache::new();
        let mut search = AlphaBetaSearch::with_budget(2_000);
        let result = search.search(&mut gen, &pos);

        let best = result.best_move.expect("a best move");
        assert!((31..=35).contains(&best.from()));
        assert!(result.score.abs() < MATE_VALUE);
        assert!(result.depth >= 1);
    }

    #[test]
    fn test_terminal_position() {
        let pos = board_with(&[(46, b'P')], &[(41, b'p'), (37, b'p')]);
        let mut gen = MoveCache::new();
        let mut search = AlphaBetaSearch::new();
        let result = search.search(&mut gen, &pos);
        assert!(result.best_move.is_none());
        assert_eq!(result.score, pos.score);
    }

    #[test]
    fn test_agrees_with_mtd_on_forced_material() {
        use crate::search::mtdbi::MtdSearch;

        // A single forced exchange: both searchers should pick the same
        // first move.
        let pos = board_with(&[(32, b'P'), (38, b'P')], &[(28, b'p'), (19, b'p')]);
        let mut gen = MoveCache::new();

        let ab = AlphaBetaSearch::with_budget(20_000).search(&mut gen, &pos);
        let mtd = MtdSearch::with_budget(20_000).search(&mut gen, &pos);
        assert_eq!(
            ab.best_move.map(|m| (m.from(), m.to())),
            mtd.best_move.map(|m| (m.from(), m.to()))
        );
    }
}
