use lazy_static::lazy_static;
use tch::{Device, Tensor};
use crate::engine::neural::constants::{BOARD_SIZE, NUM_HISTORY_FEATURES, NUM_PIECE_PLANES, NUM_PIECE_TYPE_BITS, NUM_SQUARES};
use crate::error::GanglionError;
use crate::rules::{Color, Move, PlacedPiece, RulesEngine, KING, PAWN, QUEEN};

lazy_static! {
    pub static ref DEVICE: Device = Device::cuda_if_available();
}

/// Maps a move to its policy index, `from * 64 + to`. Promotion is ignored, so
/// all promotions between the same two squares share an index.
pub const fn move_to_index(mv: &Move) -> usize {
    mv.from as usize * NUM_SQUARES + mv.to as usize
}

/// Finds the legal move behind a policy index. Among candidates sharing the
/// index a queen promotion wins, otherwise the first enumerated candidate.
pub fn decode_index(legal_moves: &[Move], index: usize) -> Option<Move> {
    let mut candidates = legal_moves.iter().filter(|mv| move_to_index(mv) == index);
    let first = *candidates.next()?;
    if first.promotion == Some(QUEEN) {
        return Some(first);
    }
    candidates
        .find(|mv| mv.promotion == Some(QUEEN))
        .copied()
        .or(Some(first))
}

pub fn index_to_move<R: RulesEngine>(rules: &R, state: &R::State, index: usize) -> Option<Move> {
    decode_index(&rules.legal_moves(state), index)
}

/// Plane of a piece: 0..6 white P,N,B,R,Q,K then 6..12 black.
fn plane_index(piece: &PlacedPiece) -> Result<usize, GanglionError> {
    if !(PAWN..=KING).contains(&piece.piece_type) || piece.square as usize >= NUM_SQUARES {
        return Err(GanglionError::Encoding {
            square: piece.square,
            piece_type: piece.piece_type,
        });
    }
    let offset = match piece.color {
        Color::White => 0,
        Color::Black => NUM_PIECE_TYPE_BITS as usize,
    };
    Ok(offset + (piece.piece_type - PAWN) as usize)
}

/// Encodes occupancy into a [12, 8, 8] tensor indexed by (plane, rank, file).
pub fn encode_pieces(pieces: &[PlacedPiece]) -> Result<Tensor, GanglionError> {
    let mut planes = vec![0f32; NUM_PIECE_PLANES as usize * NUM_SQUARES];
    for piece in pieces {
        let plane = plane_index(piece)?;
        // square = rank * 8 + file, so the flat offset within a plane is the square itself
        planes[plane * NUM_SQUARES + piece.square as usize] = 1.;
    }
    Ok(Tensor::from_slice(&planes).view([NUM_PIECE_PLANES as i64, BOARD_SIZE, BOARD_SIZE]))
}

pub fn encode_board<R: RulesEngine>(rules: &R, state: &R::State) -> Result<Tensor, GanglionError> {
    encode_pieces(&rules.pieces(state))
}

fn history_features(mv: &Move) -> [f32; NUM_HISTORY_FEATURES as usize] {
    let (is_promotion, promotion_type) = match mv.promotion {
        Some(piece_type) => (1., piece_type as f32 / 6.),
        None => (0., 0.),
    };
    [mv.from as f32 / 63., mv.to as f32 / 63., is_promotion, promotion_type]
}

/// Encodes the last `window` moves as a chronological [T, 4] sequence of
/// `[from / 63, to / 63, is_promotion, promotion_type / 6]`. An empty history
/// becomes a single zero row so the sequence is never empty.
pub fn encode_history(moves: &[Move], window: usize) -> Tensor {
    let recent = &moves[moves.len().saturating_sub(window)..];
    let mut seq: Vec<f32> = recent.iter().flat_map(history_features).collect();
    if seq.is_empty() {
        seq = vec![0.; NUM_HISTORY_FEATURES as usize];
    }
    Tensor::from_slice(&seq).view([-1, NUM_HISTORY_FEATURES])
}
