use std::io::{self, BufRead, Write};

use crate::board::fen::{parse_board, parse_fen, to_fen};
use crate::board::geometry::FIRST_SQUARE;
use crate::board::position::Position;
use crate::book::OpeningBook;
use crate::movegen::legal_moves::{match_move, parse_steps, render_move, MoveCache};
use crate::search::alphabeta::AlphaBetaSearch;
use crate::search::mtdbi::MtdSearch;
use crate::search::pvf::PvfSearch;
use crate::search::SearchResult;

const ENGINE_NAME: &str = "DamIron";
const ENGINE_VERSION: &str = "1.2";
const DEFAULT_MAX_NODES: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchMode {
    Mtd,
    AlphaBeta,
    Forced,
}

pub struct Console {
    pos: Position,
    gen: MoveCache,
    mtd: MtdSearch,
    alphabeta: AlphaBetaSearch,
    pvf: PvfSearch,
    book: OpeningBook,
    max_nodes: u64,
    mode: SearchMode,
}

impl Console {
    pub fn new() -> Self {
        Self {
            pos: Position::initial(),
            gen: MoveCache::new(),
            mtd: MtdSearch::with_budget(DEFAULT_MAX_NODES),
            alphabeta: AlphaBetaSearch::with_budget(DEFAULT_MAX_NODES),
            pvf: PvfSearch::with_budget(DEFAULT_MAX_NODES),
            book: OpeningBook::new(),
            max_nodes: DEFAULT_MAX_NODES,
            mode: SearchMode::Mtd,
        }
    }

    pub fn run(&mut self) {
        println!("{} {}", ENGINE_NAME, ENGINE_VERSION);
        io::stdout().flush().ok();

        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let command = match line {
                Ok(command) => command,
                Err(_) => break,
            };
            let trimmed = command.trim();
            if trimmed.is_empty() {
                continue;
            }
            if !self.handle_command(trimmed) {
                break;
            }
            io::stdout().flush().ok();
        }
    }

    fn handle_command(&mut self, command: &str) -> bool {
        let parts: Vec<&str> = command.split_whitespace().collect();
        let rest = parts[1..].join(" ");

        match parts[0] {
            "new" => {
                self.pos = Position::initial();
                self.show();
            }
            "fen" => match parse_fen(&rest) {
                Ok(pos) => {
                    self.pos = pos;
                    self.show();
                }
                Err(err) => println!("error: {:#}", err),
            },
            "setup" => match parse_board(&rest) {
                Ok(pos) => {
                    self.pos = pos;
                    self.show();
                }
                Err(err) => println!("error: {:#}", err),
            },
            "show" => self.show(),
            "moves" => {
                for m in self.gen.legal_moves(&self.pos) {
                    println!("{}", render_move(&m));
                }
            }
            "eval" => println!("eval {}", self.pos.score),
            "nodes" => match rest.parse::<u64>() {
                Ok(n) if n > 0 => {
                    self.max_nodes = n;
                    println!("nodes {}", n);
                }
                _ => println!("error: bad node budget {:?}", rest),
            },
            "mode" => match rest.as_str() {
                "mtd" => self.mode = SearchMode::Mtd,
                "ab" => self.mode = SearchMode::AlphaBeta,
                "pvf" => self.mode = SearchMode::Forced,
                other => println!("error: unknown mode {:?}", other),
            },
            "go" => self.go(),
            "move" => self.play(&rest),
            "book" => match std::fs::read_to_string(rest.trim()) {
                Ok(text) => match self.book.load(&text) {
                    Ok(lines) => println!("book {} lines, {} positions", lines, self.book.len()),
                    Err(err) => println!("error: {:#}", err),
                },
                Err(err) => println!("error: cannot read {:?}: {}", rest.trim(), err),
            },
            "ping" => println!("pong"),
            "quit" => return false,
            other => println!("error: unknown command {:?}", other),
        }
        true
    }

    fn go(&mut self) {
        if let Some(m) = self.book.probe(&mut self.gen, &self.pos) {
            println!("bestmove {} (book)", render_move(&m));
            self.pos = self.pos.do_move(&m);
            return;
        }

        let result = self.search();
        let pv: Vec<String> = result.pv.iter().map(render_move).collect();
        println!(
            "info depth {} nodes {} score {} pv {}",
            result.depth,
            result.nodes,
            result.score,
            pv.join(" ")
        );
        match result.best_move {
            Some(m) => {
                println!("bestmove {}", render_move(&m));
                self.pos = self.pos.do_move(&m);
            }
            None => println!("bestmove (none)"),
        }
    }

    fn search(&mut self) -> SearchResult {
        match self.mode {
            SearchMode::Mtd => {
                self.mtd.set_budget(self.max_nodes);
                self.mtd.search(&mut self.gen, &self.pos)
            }
            SearchMode::AlphaBeta => {
                self.alphabeta.set_budget(self.max_nodes);
                self.alphabeta.search(&mut self.gen, &self.pos)
            }
            SearchMode::Forced => {
                self.pvf.set_budget(self.max_nodes);
                self.pvf.search(&mut self.gen, &self.pos)
            }
        }
    }

    fn play(&mut self, token: &str) {
        let matched = parse_steps(token).and_then(|steps| match_move(&self.pos, &steps));
        match matched {
            Some(m) => {
                self.pos = self.pos.do_move(&m);
                println!("played {}", render_move(&m));
            }
            None => println!("no move"),
        }
    }

    // Board from the side to move; lowercase pieces are the opponent's.
    fn show(&self) {
        for row in 0..10 {
            let mut line = String::new();
            if row % 2 == 0 {
                line.push_str("  ");
            }
            for col in 0..5 {
                let sq = row * 5 + col + FIRST_SQUARE;
                line.push(self.pos.board[sq] as char);
                line.push_str("   ");
            }
            println!("{}", line);
        }
        println!("{}  eval {}", to_fen(&self.pos), self.pos.score);
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

pub fn run_console() {
    Console::new().run();
}
