use tch::{nn, Tensor};
use crate::engine::neural::constants::{BOARD_SIZE, NUM_PIECE_PLANES};
use crate::engine::neural::utils::DEVICE;

/// Differentiable cellular automaton over an 8x8 grid of hidden channels.
///
/// Each step sees the previous grid and the board planes through one 3x3
/// convolution and adds a tanh-bounded increment, so a single step moves any
/// cell by strictly less than 1.
#[derive(Debug)]
pub struct CellularGrid {
    conv: nn::Conv2D,
    channels: i64,
}

impl CellularGrid {
    pub fn new(vs: &nn::Path, channels: i64) -> Self {
        CellularGrid {
            conv: nn::conv2d(
                vs / "conv",
                channels + NUM_PIECE_PLANES as i64,
                channels,
                3,
                nn::ConvConfig { padding: 1, ..Default::default() },
            ),
            channels,
        }
    }

    pub fn channels(&self) -> i64 {
        self.channels
    }

    /// The grid a game starts from: all zeros, [1, C, 8, 8].
    pub fn initial_state(&self) -> Tensor {
        Tensor::zeros([1, self.channels, BOARD_SIZE, BOARD_SIZE], (tch::Kind::Float, *DEVICE))
    }

    /// grid: [B, C, 8, 8], board_planes: [B, 12, 8, 8] -> [B, C, 8, 8]
    pub fn forward(&self, grid: &Tensor, board_planes: &Tensor) -> Tensor {
        let x = Tensor::cat(&[grid, board_planes], 1);
        let delta = x.apply(&self.conv).tanh();
        grid + delta
    }
}
