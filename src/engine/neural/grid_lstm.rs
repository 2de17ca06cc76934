use tch::{nn, Tensor};
use tch::nn::RNN;

/// Grid context encoder. The 64 cells of the grid are read as a sequence of
/// channel vectors by an LSTM; the embedding is the tanh of the final hidden
/// state.
#[derive(Debug)]
pub struct GridLstm {
    lstm: nn::LSTM,
}

impl GridLstm {
    pub fn new(vs: &nn::Path, channels: i64, hidden_dim: i64) -> Self {
        let config = nn::RNNConfig {
            batch_first: true,
            ..Default::default()
        };
        GridLstm {
            lstm: nn::lstm(vs / "lstm", channels, hidden_dim, config),
        }
    }

    /// [B, C, 8, 8] -> [B, hidden_dim]
    pub fn forward(&self, grid: &Tensor) -> Tensor {
        let size = grid.size();
        let (batch_size, channels) = (size[0], size[1]);
        // [B, C, 64] -> [B, 64, C]
        let seq = grid
            .reshape([batch_size, channels, -1])
            .permute([0, 2, 1])
            .contiguous();
        let (_, state) = self.lstm.seq(&seq);
        state.h().squeeze_dim(0).tanh()
    }
}
