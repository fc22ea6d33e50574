use crate::board::geometry::{BOARD_CELLS, FIRST_SQUARE, LAST_SQUARE};
use crate::board::zobrist::hash_board;

pub type Board = [u8; BOARD_CELLS];

// Cells are ASCII so boards read naturally in tests and dumps.
// Uppercase is always the side to move; changing sides rotates the board.
pub const EMPTY: u8 = b'.';
pub const MAN: u8 = b'P';
pub const KING: u8 = b'K';
pub const OPP_MAN: u8 = b'p';
pub const OPP_KING: u8 = b'k';
pub const SENTINEL: u8 = b'0';

pub const PROMOTION_ROW: std::ops::RangeInclusive<usize> = 1..=5;

#[inline(always)]
pub const fn is_own(cell: u8) -> bool {
    cell == MAN || cell == KING
}

#[inline(always)]
pub const fn is_opp(cell: u8) -> bool {
    cell == OPP_MAN || cell == OPP_KING
}

#[inline(always)]
pub const fn swap_case(cell: u8) -> u8 {
    match cell {
        MAN => OPP_MAN,
        KING => OPP_KING,
        OPP_MAN => MAN,
        OPP_KING => KING,
        other => other,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    pub steps: Vec<usize>,
    pub takes: Vec<usize>,
}

impl Move {
    #[inline(always)]
    pub fn step(from: usize, to: usize) -> Self {
        Self {
            steps: vec![from, to],
            takes: Vec::new(),
        }
    }

    #[inline(always)]
    pub fn capture(steps: Vec<usize>, takes: Vec<usize>) -> Self {
        Self { steps, takes }
    }

    #[inline(always)]
    pub fn from(&self) -> usize {
        self.steps[0]
    }

    #[inline(always)]
    pub fn to(&self) -> usize {
        self.steps[self.steps.len() - 1]
    }

    #[inline(always)]
    pub fn is_capture(&self) -> bool {
        !self.takes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub board: Board,
    pub score: i32,
}

impl Position {
    pub fn from_board(board: Board) -> Self {
        let mut pos = Self { board, score: 0 };
        pos.score = pos.eval_pos();
        pos
    }

    pub fn initial() -> Self {
        let mut board = [EMPTY; BOARD_CELLS];
        board[0] = SENTINEL;
        board[BOARD_CELLS - 1] = SENTINEL;
        for sq in 1..=20 {
            board[sq] = OPP_MAN;
        }
        for sq in 31..=50 {
            board[sq] = MAN;
        }
        Self::from_board(board)
    }

    // Reverse plus case swap is an involution; the sentinels at 0 and 51
    // trade places with each other.
    pub fn rotate(&self) -> Self {
        let mut board = [SENTINEL; BOARD_CELLS];
        for (sq, cell) in board.iter_mut().enumerate() {
            *cell = swap_case(self.board[BOARD_CELLS - 1 - sq]);
        }
        Self {
            board,
            score: -self.score,
        }
    }

    // Applies the move and returns the position from the opponent's
    // perspective. Captured squares are cleared here and only here; during
    // chain generation they stay occupied.
    pub fn do_move(&self, m: &Move) -> Self {
        let from = m.from();
        let to = m.to();
        let mut piece = self.board[from];
        if piece == MAN && PROMOTION_ROW.contains(&to) {
            piece = KING;
        }

        let score = self.score + self.eval_move(m);

        let mut board = self.board;
        board[from] = EMPTY;
        for &taken in &m.takes {
            board[taken] = EMPTY;
        }
        board[to] = piece;

        Self { board, score }.rotate()
    }

    #[inline(always)]
    pub fn key(&self) -> u64 {
        hash_board(&self.board)
    }

    pub fn count_own(&self) -> usize {
        self.board[FIRST_SQUARE..=LAST_SQUARE]
            .iter()
            .filter(|&&c| is_own(c))
            .count()
    }

    pub fn count_opp(&self) -> usize {
        self.board[FIRST_SQUARE..=LAST_SQUARE]
            .iter()
            .filter(|&&c| is_opp(c))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_position() {
        let pos = Position::initial();
        assert_eq!(pos.board[0], SENTINEL);
        assert_eq!(pos.board[51], SENTINEL);
        assert_eq!(pos.count_own(), 20);
        assert_eq!(pos.count_opp(), 20);
        assert_eq!(pos.score, 0);
        assert_eq!(pos.score, pos.eval_pos());
    }

    #[test]
    fn test_rotate_is_involution() {
        let mut board = Position::initial().board;
        board[31] = b'.';
        board[27] = b'P';
        board[1] = b'k';
        let pos = Position::from_board(board);

        let rotated = pos.rotate();
        assert_eq!(rotated.score, -pos.score);
        for sq in 0..BOARD_CELLS {
            assert_eq!(rotated.board[sq], swap_case(pos.board[BOARD_CELLS - 1 - sq]));
        }
        assert_eq!(pos.rotate().rotate(), pos);
    }

    #[test]
    fn test_do_move_plain_step() {
        let pos = Position::initial();
        let m = Move::step(32, 28);
        let next = pos.do_move(&m);

        // The result is rotated, so our man now shows up lowercase at 51-28.
        assert_eq!(next.board[51 - 28], OPP_MAN);
        assert_eq!(next.board[51 - 32], EMPTY);
        assert_eq!(next.score, -(pos.score + pos.eval_move(&m)));
    }

    #[test]
    fn test_do_move_capture_clears_taken() {
        let mut board = [EMPTY; BOARD_CELLS];
        board[0] = SENTINEL;
        board[51] = SENTINEL;
        board[32] = MAN;
        board[28] = OPP_MAN;
        let pos = Position::from_board(board);

        let m = Move::capture(vec![32, 23], vec![28]);
        let next = pos.do_move(&m);
        assert_eq!(next.board[51 - 23], OPP_MAN);
        assert_eq!(next.board[51 - 28], EMPTY);
        assert_eq!(next.board[51 - 32], EMPTY);
        assert_eq!(next.count_own(), 0);
        assert_eq!(next.count_opp(), 1);
    }

    #[test]
    fn test_promotion_on_back_row() {
        let mut board = [EMPTY; BOARD_CELLS];
        board[0] = SENTINEL;
        board[51] = SENTINEL;
        board[7] = MAN;
        board[45] = OPP_MAN;
        let pos = Position::from_board(board);

        let m = Move::step(7, 1);
        let next = pos.do_move(&m);
        assert_eq!(next.board[51 - 1], OPP_KING);
    }

    #[test]
    fn test_score_stays_consistent_with_eval_pos() {
        // Invariant: do_move keeps the incremental score equal to a full
        // re-evaluation, ply after ply.
        use crate::movegen::legal_moves::gen_moves;

        let mut pos = Position::initial();
        for _ in 0..12 {
            let moves = gen_moves(&pos);
            if moves.is_empty() {
                break;
            }
            pos = pos.do_move(&moves[0]);
            assert_eq!(pos.score, pos.eval_pos());
        }
    }
}
