use std::collections::HashMap;

use anyhow::{Context, Result};

use crate::board::position::{Move, Position};
use crate::movegen::legal_moves::{match_move, parse_steps, MoveCache};

// Opening book: every position reached while replaying the book lines is
// counted, keyed by its Zobrist key. Probing prefers the move that leads
// to the most frequently seen book position.
pub struct OpeningBook {
    table: HashMap<u64, u32>,
}

impl OpeningBook {
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    // Loads whitespace-separated numeric-notation openings, one per line.
    // Move-number prefixes like "1." or "12." are stripped. Returns the
    // number of lines loaded.
    pub fn load(&mut self, text: &str) -> Result<usize> {
        let mut loaded = 0;
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            self.load_line(line)
                .with_context(|| format!("opening line {}", lineno + 1))?;
            loaded += 1;
        }
        Ok(loaded)
    }

    fn load_line(&mut self, line: &str) -> Result<()> {
        let mut pos = Position::initial();
        let mut white_to_move = true;
        for token in line.split_whitespace() {
            let token = strip_move_number(token);
            if token.is_empty() {
                continue;
            }
            let mut steps = parse_steps(token)
                .with_context(|| format!("bad move token {:?}", token))?;
            // Book squares are absolute; black moves are played on the
            // rotated board, so mirror them into the mover's frame.
            if !white_to_move {
                for sq in steps.iter_mut() {
                    *sq = 51 - *sq;
                }
            }
            let m = match_move(&pos, &steps)
                .with_context(|| format!("illegal book move {:?}", token))?;
            pos = pos.do_move(&m);
            white_to_move = !white_to_move;
            *self.table.entry(pos.key()).or_insert(0) += 1;
        }
        Ok(())
    }

    pub fn probe(&self, gen: &mut MoveCache, pos: &Position) -> Option<Move> {
        let mut best: Option<(u32, Move)> = None;
        for m in gen.legal_moves(pos) {
            let child = pos.do_move(&m);
            if let Some(&freq) = self.table.get(&child.key()) {
                let better = match &best {
                    Some((top, _)) => freq > *top,
                    None => true,
                };
                if better {
                    best = Some((freq, m));
                }
            }
        }
        best.map(|(_, m)| m)
    }
}

impl Default for OpeningBook {
    fn default() -> Self {
        Self::new()
    }
}

// "12.32-28" and bare "12." both reduce to the move part.
fn strip_move_number(token: &str) -> &str {
    match token.find('.') {
        Some(dot) if dot > 0 && token[..dot].bytes().all(|b| b.is_ascii_digit()) => {
            &token[dot + 1..]
        }
        _ => token,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_move_number() {
        assert_eq!(strip_move_number("1.32-28"), "32-28");
        assert_eq!(strip_move_number("12."), "");
        assert_eq!(strip_move_number("32-28"), "32-28");
        assert_eq!(strip_move_number("19-23"), "19-23");
    }

    #[test]
    fn test_load_and_probe() {
        let mut book = OpeningBook::new();
        let loaded = book
            .load("1. 32-28 19-23 2. 28x19 14x23\n1. 32-28 19-23\n1. 33-29 19-23\n")
            .unwrap();
        assert_eq!(loaded, 3);
        assert!(!book.is_empty());

        let mut gen = MoveCache::new();
        let pos = Position::initial();
        // 32-28 appears twice, 33-29 once.
        let m = book.probe(&mut gen, &pos).unwrap();
        assert_eq!((m.from(), m.to()), (32, 28));

        // Off book: no suggestion. The reply is given in black's own
        // frame (absolute 19-23 mirrors to 32-28).
        let off = pos.do_move(&match_move(&pos, &[31, 26]).unwrap());
        let off = off.do_move(&match_move(&off, &[32, 28]).unwrap());
        assert!(book.probe(&mut gen, &off).is_none());
    }

    #[test]
    fn test_malformed_lines_are_reported() {
        let mut book = OpeningBook::new();
        assert!(book.load("32-29\n").is_err());
        assert!(book.load("banana\n").is_err());
    }
}
