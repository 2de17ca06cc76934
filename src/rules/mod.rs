use std::fmt;
use std::fmt::{Display, Formatter};

mod chess_rules;

pub use chess_rules::{ChessRules, ChessState};

pub const PAWN: u8 = 1;
pub const KNIGHT: u8 = 2;
pub const BISHOP: u8 = 3;
pub const ROOK: u8 = 4;
pub const QUEEN: u8 = 5;
pub const KING: u8 = 6;

#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Color {
    White = 0,
    Black = 1,
}

/// A move as the rules engine reports it. Squares are 0..64 with a1 = 0 and
/// h8 = 63; `promotion` is a piece type in `PAWN..=KING`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Move {
    pub from: u8,
    pub to: u8,
    pub promotion: Option<u8>,
}

impl Move {
    pub const fn new(from: u8, to: u8) -> Self {
        Move { from, to, promotion: None }
    }

    pub const fn with_promotion(from: u8, to: u8, promotion: u8) -> Self {
        Move { from, to, promotion: Some(promotion) }
    }
}

fn write_square(f: &mut Formatter<'_>, square: u8) -> fmt::Result {
    write!(f, "{}{}", (b'a' + square % 8) as char, (b'1' + square / 8) as char)
}

impl Display for Move {
    /// Long algebraic (UCI) notation, e.g. `e2e4` or `e7e8q`.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_square(f, self.from)?;
        write_square(f, self.to)?;
        match self.promotion {
            Some(KNIGHT) => write!(f, "n"),
            Some(BISHOP) => write!(f, "b"),
            Some(ROOK) => write!(f, "r"),
            Some(QUEEN) => write!(f, "q"),
            _ => Ok(()),
        }
    }
}

/// An occupied square.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PlacedPiece {
    pub square: u8,
    pub color: Color,
    pub piece_type: u8,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    WhiteWins,
    BlackWins,
    Draw,
    Ongoing,
}

impl Outcome {
    pub fn is_decisive(&self) -> bool {
        matches!(self, Outcome::WhiteWins | Outcome::BlackWins)
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::WhiteWins => "1-0",
            Outcome::BlackWins => "0-1",
            Outcome::Draw => "1/2-1/2",
            Outcome::Ongoing => "*",
        };
        write!(f, "{}", s)
    }
}

/// Legality, state transitions and terminal status. The agent consults nothing
/// else about the game.
pub trait RulesEngine {
    type State: Clone;

    fn initial_state(&self) -> Self::State;

    /// Legal moves in a stable enumeration order.
    fn legal_moves(&self, state: &Self::State) -> Vec<Move>;

    /// `mv` must be one of `legal_moves(state)`.
    fn apply(&self, state: &Self::State, mv: Move) -> Self::State;

    fn is_terminal(&self, state: &Self::State) -> bool;

    fn outcome(&self, state: &Self::State) -> Outcome;

    fn pieces(&self, state: &Self::State) -> Vec<PlacedPiece>;
}
