use anyhow::{bail, Context, Result};

use crate::board::geometry::{BOARD_CELLS, FIRST_SQUARE, LAST_SQUARE};
use crate::board::position::{
    Board, Position, EMPTY, KING, MAN, OPP_KING, OPP_MAN, SENTINEL,
};

fn empty_board() -> Board {
    let mut board = [EMPTY; BOARD_CELLS];
    board[0] = SENTINEL;
    board[BOARD_CELLS - 1] = SENTINEL;
    board
}

fn place(board: &mut Board, sq: usize, cell: u8) -> Result<()> {
    if !(FIRST_SQUARE..=LAST_SQUARE).contains(&sq) {
        bail!("square {} is off the board", sq);
    }
    if board[sq] != EMPTY {
        bail!("square {} is occupied twice", sq);
    }
    board[sq] = cell;
    Ok(())
}

// One FEN group entry: a square or an a-b range, optionally King-flagged.
fn parse_entry(board: &mut Board, entry: &str, man: u8, king: u8) -> Result<()> {
    let (cell, body) = match entry.strip_prefix('K') {
        Some(rest) => (king, rest),
        None => (man, entry),
    };
    match body.split_once('-') {
        Some((lo, hi)) => {
            let lo: usize = lo.trim().parse().with_context(|| format!("bad square {:?}", lo))?;
            let hi: usize = hi.trim().parse().with_context(|| format!("bad square {:?}", hi))?;
            if lo > hi {
                bail!("empty range {}-{}", lo, hi);
            }
            for sq in lo..=hi {
                place(board, sq, cell)?;
            }
        }
        None => {
            let sq: usize = body
                .trim()
                .parse()
                .with_context(|| format!("bad square {:?}", body))?;
            place(board, sq, cell)?;
        }
    }
    Ok(())
}

// FEN-like input: "W:W15,19,K24:B5,8,30-32". White is stored uppercase and
// the result is canonicalized so the side to move reads uppercase; a
// trailing ".suffix" is ignored.
pub fn parse_fen(fen: &str) -> Result<Position> {
    let fen = match fen.split_once('.') {
        Some((head, _)) => head,
        None => fen,
    };
    let mut fields = fen.trim().split(':');

    let side = fields.next().unwrap_or("").trim();
    if side != "W" && side != "B" {
        bail!("side to move must be W or B, got {:?}", side);
    }

    let mut board = empty_board();
    let mut seen_groups = 0;
    for group in fields {
        let group = group.trim();
        let (man, king) = match group.chars().next() {
            Some('W') => (MAN, KING),
            Some('B') => (OPP_MAN, OPP_KING),
            _ => bail!("piece group must start with W or B, got {:?}", group),
        };
        seen_groups += 1;
        for entry in group[1..].split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            parse_entry(&mut board, entry, man, king)
                .with_context(|| format!("in group {:?}", group))?;
        }
    }
    if seen_groups != 2 {
        bail!("expected two piece groups, got {}", seen_groups);
    }

    let pos = Position::from_board(board);
    if side == "B" {
        Ok(pos.rotate())
    } else {
        Ok(pos)
    }
}

// Board literal: the 50 playable cells (or a full 100-cell sheet, from
// which the dark squares are taken) over {p,P,k,K,.}, whitespace free-form,
// already written from the side to move.
pub fn parse_board(text: &str) -> Result<Position> {
    let cells: Vec<u8> = text.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    let playable: Vec<u8> = match cells.len() {
        50 => cells,
        100 => cells
            .chunks(10)
            .enumerate()
            .flat_map(|(row, chunk)| {
                let offset = if row % 2 == 0 { 1 } else { 0 };
                (0..5).map(move |i| chunk[2 * i + offset])
            })
            .collect(),
        n => bail!("expected 50 or 100 board cells, got {}", n),
    };

    let mut board = empty_board();
    for (i, &cell) in playable.iter().enumerate() {
        match cell {
            b'.' => {}
            MAN | KING | OPP_MAN | OPP_KING => board[i + 1] = cell,
            other => bail!("bad cell {:?} at square {}", other as char, i + 1),
        }
    }
    Ok(Position::from_board(board))
}

// Renders the canonical W-perspective FEN of a position.
pub fn to_fen(pos: &Position) -> String {
    let mut white = Vec::new();
    let mut black = Vec::new();
    for sq in FIRST_SQUARE..=LAST_SQUARE {
        match pos.board[sq] {
            MAN => white.push(sq.to_string()),
            KING => white.push(format!("K{}", sq)),
            OPP_MAN => black.push(sq.to_string()),
            OPP_KING => black.push(format!("K{}", sq)),
            _ => {}
        }
    }
    format!("W:W{}:B{}", white.join(","), black.join(","))
}
