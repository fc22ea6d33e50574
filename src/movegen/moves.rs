use crate::board::geometry::{tables, Direction};
use crate::board::position::{is_opp, Board, Move, EMPTY, KING, MAN};

// Basic non-capture moves from square `i`. Men step toward the promotion
// row only; kings slide until the first occupied square or the edge.
pub fn piece_moves(board: &Board, i: usize, out: &mut Vec<Move>) {
    let geo = tables();
    match board[i] {
        MAN => {
            for dir in Direction::FORWARD {
                let j = geo.next(dir, i);
                if board[j] == EMPTY {
                    out.push(Move::step(i, j));
                }
            }
        }
        KING => {
            for dir in Direction::ALL {
                for j in geo.ray(dir, i) {
                    if board[j] != EMPTY {
                        break;
                    }
                    out.push(Move::step(i, j));
                }
            }
        }
        _ => {}
    }
}

// One-leg captures from square `i`. Men capture in all four directions,
// forward or not. A king may land on any empty square past the piece it
// jumps, but never jumps two pieces in a row.
pub fn piece_captures(board: &Board, i: usize, out: &mut Vec<Move>) {
    let geo = tables();
    match board[i] {
        MAN => {
            for dir in Direction::ALL {
                let j = geo.next(dir, i);
                if !is_opp(board[j]) {
                    continue;
                }
                let land = geo.next(dir, j);
                if board[land] == EMPTY {
                    out.push(Move::capture(vec![i, land], vec![j]));
                }
            }
        }
        KING => {
            for dir in Direction::ALL {
                let mut take = None;
                for j in geo.ray(dir, i) {
                    let cell = board[j];
                    match take {
                        None => {
                            if is_opp(cell) {
                                take = Some(j);
                            } else if cell != EMPTY {
                                break;
                            }
                        }
                        Some(taken) => {
                            if cell == EMPTY {
                                out.push(Move::capture(vec![i, j], vec![taken]));
                            } else {
                                break;
                            }
                        }
                    }
                }
            }
        }
        _ => {}
    }
}

#[inline(always)]
pub fn piece_can_capture(board: &Board, i: usize) -> bool {
    let geo = tables();
    match board[i] {
        MAN => {
            for dir in Direction::ALL {
                let j = geo.next(dir, i);
                if is_opp(board[j]) && board[geo.next(dir, j)] == EMPTY {
                    return true;
                }
            }
            false
        }
        KING => {
            for dir in Direction::ALL {
                let mut take = None;
                for j in geo.ray(dir, i) {
                    let cell = board[j];
                    match take {
                        None => {
                            if is_opp(cell) {
                                take = Some(j);
                            } else if cell != EMPTY {
                                break;
                            }
                        }
                        Some(_) => {
                            if cell == EMPTY {
                                return true;
                            }
                            break;
                        }
                    }
                }
            }
            false
        }
        _ => false,
    }
}
