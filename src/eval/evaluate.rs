use crate::board::geometry::BOARD_CELLS;
use crate::board::position::{is_own, Board, Move, Position, KING, MAN, PROMOTION_ROW};
use crate::eval::material::piece_value;
use crate::eval::pst::pst;

pub const MATE_VALUE: i32 = 90000;

fn side_sum(board: &Board) -> i32 {
    let mut total = 0;
    for (sq, &cell) in board.iter().enumerate() {
        if is_own(cell) {
            total += piece_value(cell) + pst(cell, sq);
        }
    }
    total
}

impl Position {
    // Score delta of applying `m`, without applying it. Captured pieces are
    // valued on the mirrored square 51-k: they belong to the opponent, whose
    // tables are the rotated image of ours.
    pub fn eval_move(&self, m: &Move) -> i32 {
        let from = m.from();
        let to = m.to();
        let piece = self.board[from];

        let from_value = pst(piece, from) + piece_value(piece);
        let to_value = if piece == MAN && PROMOTION_ROW.contains(&to) {
            pst(KING, to) + piece_value(KING)
        } else {
            pst(piece, to) + piece_value(piece)
        };

        let mut delta = to_value - from_value;
        for &taken in &m.takes {
            let captured = self.board[taken].to_ascii_uppercase();
            delta += pst(captured, BOARD_CELLS - 1 - taken) + piece_value(captured);
        }
        delta
    }

    pub fn eval_pos(&self) -> i32 {
        side_sum(&self.board) - side_sum(&self.rotate().board)
    }
}

#[cfg(test)]
mod tests {
    use crate::board::position::{Move, Position, EMPTY, MAN, OPP_MAN, SENTINEL};
    use crate::movegen::legal_moves::gen_moves;

    #[test]
    fn test_eval_pos_is_zero_when_symmetric() {
        assert_eq!(Position::initial().eval_pos(), 0);
    }

    #[test]
    fn test_eval_move_matches_do_move() {
        let pos = Position::initial();
        for m in gen_moves(&pos) {
            let child = pos.do_move(&m);
            assert_eq!(child.rotate().score, pos.score + pos.eval_move(&m));
            assert_eq!(child.score, child.eval_pos());
        }
    }

    #[test]
    fn test_eval_move_counts_captures() {
        let mut board = [EMPTY; 52];
        board[0] = SENTINEL;
        board[51] = SENTINEL;
        board[32] = MAN;
        board[28] = OPP_MAN;
        board[46] = MAN;
        board[5] = OPP_MAN;
        let pos = Position::from_board(board);

        let m = Move::capture(vec![32, 23], vec![28]);
        let delta = pos.eval_move(&m);
        let child = pos.do_move(&m);
        assert_eq!(child.rotate().score, pos.score + delta);
        assert_eq!(child.score, child.eval_pos());
        // Winning a man is worth at least its material.
        assert!(delta >= 1000);
    }

    #[test]
    fn test_eval_move_promotion() {
        let mut board = [EMPTY; 52];
        board[0] = SENTINEL;
        board[51] = SENTINEL;
        board[7] = MAN;
        board[45] = OPP_MAN;
        let pos = Position::from_board(board);

        let m = Move::step(7, 1);
        let child = pos.do_move(&m);
        assert_eq!(child.score, child.eval_pos());
        // Promotion trades man material for king material.
        assert!(pos.eval_move(&m) >= 2000 - 100);
    }
}
