// Constants for the board feature tensor
pub const NUM_PIECE_TYPE_BITS: u8 = 6; // 6 piece types
pub const NUM_COLOR_BITS: u8 = 2; // 2 colors
pub const NUM_PIECE_PLANES: u8 = NUM_PIECE_TYPE_BITS * NUM_COLOR_BITS; // 12 8x8 planes
pub const BOARD_SIZE: i64 = 8;
pub const NUM_SQUARES: usize = (BOARD_SIZE * BOARD_SIZE) as usize;

// Constants for the move history tensor
pub const MAX_HISTORY: usize = 32; // default window of past moves
pub const NUM_HISTORY_FEATURES: i64 = 4; // from, to, is_promotion, promotion type

// Constants for the policy
pub const POLICY_DIM: i64 = (NUM_SQUARES * NUM_SQUARES) as i64; // 4096 (from, to) pairs

// Constants for the spatial extractor
pub const NUM_CONV_FILTERS_1: i64 = 32;
pub const NUM_CONV_FILTERS_2: i64 = 64;

// Move selection
pub const MIN_TEMPERATURE: f64 = 1e-3;
