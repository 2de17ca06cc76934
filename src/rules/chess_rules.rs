use std::str::FromStr;

use chess::{Board, BoardStatus, ChessMove, MoveGen, Piece, ALL_PIECES, ALL_SQUARES};

use crate::rules::{Color, Move, Outcome, PlacedPiece, RulesEngine, BISHOP, KING, KNIGHT};

const FIVEFOLD_REPETITION: usize = 5;
const THREEFOLD_REPETITION: usize = 3;
/// Halfmoves without a capture or pawn move before the game ends on its own.
const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;
/// Halfmoves without a capture or pawn move before a draw may be claimed.
const FIFTY_MOVE_PLIES: u32 = 100;

/// A chess position plus what the board alone cannot tell: the halfmove clock
/// and the positions seen since the last capture or pawn move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChessState {
    pub board: Board,
    pub halfmove_clock: u32,
    positions: Vec<u64>,
}

impl ChessState {
    pub fn new(board: Board, halfmove_clock: u32) -> Self {
        ChessState {
            positions: vec![board.get_hash()],
            board,
            halfmove_clock,
        }
    }

    /// How many times the current position has occurred, counting itself.
    pub fn repetitions(&self) -> usize {
        let current = self.board.get_hash();
        self.positions.iter().filter(|&&hash| hash == current).count()
    }
}

/// Standard chess legality backed by the `chess` crate.
///
/// A game ends on checkmate, stalemate, insufficient material, fivefold
/// repetition or the seventy-five-move rule. `outcome` also scores positions
/// where a draw could be claimed (threefold repetition, fifty-move rule), so a
/// game cut short by a move ceiling in such a position reports a draw.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChessRules;

impl ChessRules {
    /// Parses a FEN. The halfmove clock field is optional and defaults to 0.
    pub fn state_from_fen(&self, fen: &str) -> Result<ChessState, chess::Error> {
        let board = Board::from_str(fen)?;
        let halfmove_clock = match fen.split_whitespace().nth(4) {
            Some(field) => field.parse().map_err(|_| chess::Error::InvalidFen { fen: fen.to_string() })?,
            None => 0,
        };
        Ok(ChessState::new(board, halfmove_clock))
    }

    /// Neither side can possibly mate: only kings and at most one minor
    /// piece, or only kings and bishops that all stand on one square color.
    pub fn has_insufficient_material(&self, state: &ChessState) -> bool {
        let minors: Vec<PlacedPiece> = self
            .pieces(state)
            .into_iter()
            .filter(|p| p.piece_type != KING)
            .collect();
        if minors.iter().any(|p| p.piece_type != KNIGHT && p.piece_type != BISHOP) {
            return false;
        }
        if minors.len() <= 1 {
            return true;
        }
        let square_color = |p: &PlacedPiece| (p.square / 8 + p.square % 8) % 2;
        minors.iter().all(|p| p.piece_type == BISHOP)
            && minors.iter().all(|p| square_color(p) == square_color(&minors[0]))
    }
}

fn piece_type_of(piece: Piece) -> u8 {
    piece.to_index() as u8 + 1
}

fn piece_of(piece_type: u8) -> Option<Piece> {
    if piece_type == 0 {
        return None;
    }
    ALL_PIECES.get(piece_type as usize - 1).copied()
}

fn color_of(color: chess::Color) -> Color {
    match color {
        chess::Color::White => Color::White,
        chess::Color::Black => Color::Black,
    }
}

fn from_chess_move(mv: ChessMove) -> Move {
    Move {
        from: mv.get_source().to_index() as u8,
        to: mv.get_dest().to_index() as u8,
        promotion: mv.get_promotion().map(piece_type_of),
    }
}

fn to_chess_move(mv: Move) -> ChessMove {
    ChessMove::new(
        ALL_SQUARES[mv.from as usize],
        ALL_SQUARES[mv.to as usize],
        mv.promotion.and_then(piece_of),
    )
}

impl RulesEngine for ChessRules {
    type State = ChessState;

    fn initial_state(&self) -> ChessState {
        ChessState::new(Board::default(), 0)
    }

    fn legal_moves(&self, state: &ChessState) -> Vec<Move> {
        MoveGen::new_legal(&state.board).map(from_chess_move).collect()
    }

    fn apply(&self, state: &ChessState, mv: Move) -> ChessState {
        let chess_move = to_chess_move(mv);
        let irreversible = state.board.piece_on(chess_move.get_source()) == Some(Piece::Pawn)
            || state.board.piece_on(chess_move.get_dest()).is_some();
        let board = state.board.make_move_new(chess_move);

        if irreversible {
            ChessState::new(board, 0)
        } else {
            let mut positions = state.positions.clone();
            positions.push(board.get_hash());
            ChessState {
                board,
                halfmove_clock: state.halfmove_clock + 1,
                positions,
            }
        }
    }

    fn is_terminal(&self, state: &ChessState) -> bool {
        state.board.status() != BoardStatus::Ongoing
            || self.has_insufficient_material(state)
            || state.repetitions() >= FIVEFOLD_REPETITION
            || state.halfmove_clock >= SEVENTY_FIVE_MOVE_PLIES
    }

    fn outcome(&self, state: &ChessState) -> Outcome {
        match state.board.status() {
            BoardStatus::Checkmate => match state.board.side_to_move() {
                chess::Color::White => Outcome::BlackWins,
                chess::Color::Black => Outcome::WhiteWins,
            },
            BoardStatus::Stalemate => Outcome::Draw,
            BoardStatus::Ongoing => {
                if self.has_insufficient_material(state)
                    || state.repetitions() >= THREEFOLD_REPETITION
                    || state.halfmove_clock >= FIFTY_MOVE_PLIES
                {
                    Outcome::Draw
                } else {
                    Outcome::Ongoing
                }
            }
        }
    }

    fn pieces(&self, state: &ChessState) -> Vec<PlacedPiece> {
        ALL_SQUARES
            .iter()
            .filter_map(|&square| {
                let piece = state.board.piece_on(square)?;
                let color = state.board.color_on(square)?;
                Some(PlacedPiece {
                    square: square.to_index() as u8,
                    color: color_of(color),
                    piece_type: piece_type_of(piece),
                })
            })
            .collect()
    }
}
