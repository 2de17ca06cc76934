use tch::{nn, Tensor};
use crate::engine::neural::constants::{BOARD_SIZE, NUM_CONV_FILTERS_1, NUM_CONV_FILTERS_2, NUM_PIECE_PLANES};

/// Spatial feature extractor: three 3x3 convolutions over the piece planes,
/// then a tanh-bounded projection to `out_dim`.
#[derive(Debug)]
pub struct BoardConv {
    conv1: nn::Conv2D,
    conv2: nn::Conv2D,
    conv3: nn::Conv2D,
    fc: nn::Linear,
}

impl BoardConv {
    pub fn new(vs: &nn::Path, out_dim: i64) -> Self {
        let conv_config = nn::ConvConfig {
            padding: 1,
            ..Default::default()
        };

        BoardConv {
            conv1: nn::conv2d(vs / "conv1", NUM_PIECE_PLANES as i64, NUM_CONV_FILTERS_1, 3, conv_config),
            conv2: nn::conv2d(vs / "conv2", NUM_CONV_FILTERS_1, NUM_CONV_FILTERS_2, 3, conv_config),
            conv3: nn::conv2d(vs / "conv3", NUM_CONV_FILTERS_2, NUM_CONV_FILTERS_2, 3, conv_config),
            fc: nn::linear(vs / "fc", NUM_CONV_FILTERS_2 * BOARD_SIZE * BOARD_SIZE, out_dim, Default::default()),
        }
    }

    /// [B, 12, 8, 8] -> [B, out_dim], components in (-1, 1)
    pub fn forward(&self, x: &Tensor) -> Tensor {
        x.apply(&self.conv1)
            .relu()
            .apply(&self.conv2)
            .relu()
            .apply(&self.conv3)
            .relu()
            .flatten(1, -1)
            .apply(&self.fc)
            .tanh()
    }
}
