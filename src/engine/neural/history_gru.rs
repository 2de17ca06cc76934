use tch::{nn, Tensor};
use tch::nn::RNN;
use crate::engine::neural::constants::NUM_HISTORY_FEATURES;

/// Summarizes the move history through a GRU; the embedding is the tanh of
/// the final hidden state.
#[derive(Debug)]
pub struct HistoryGru {
    gru: nn::GRU,
}

impl HistoryGru {
    pub fn new(vs: &nn::Path, hidden_dim: i64) -> Self {
        let config = nn::RNNConfig {
            batch_first: true,
            ..Default::default()
        };
        HistoryGru {
            gru: nn::gru(vs / "gru", NUM_HISTORY_FEATURES, hidden_dim, config),
        }
    }

    /// [B, T, 4] -> [B, hidden_dim]
    pub fn forward(&self, seq: &Tensor) -> Tensor {
        let (_, state) = self.gru.seq(seq);
        // h_n: [num_layers, B, H]
        state.0.squeeze_dim(0).tanh()
    }
}
