use tch::{nn, Device, Tensor};
use crate::config::BrainConfig;
use crate::engine::neural::board_conv::BoardConv;
use crate::engine::neural::cellular_grid::CellularGrid;
use crate::engine::neural::constants::POLICY_DIM;
use crate::engine::neural::grid_lstm::GridLstm;
use crate::engine::neural::history_gru::HistoryGru;
use crate::engine::neural::policy_value_network::{BrainOutput, PolicyValueNetwork};

/// The generator. Coordinates three branches:
///  - a convolutional view of the board
///  - a GRU over the move history
///  - an LSTM over the cellular grid, which is advanced first
///
/// and fuses them into a policy over 4096 move indices and a value.
#[derive(Debug)]
pub struct GanglionBrain {
    pub vs: nn::VarStore,
    grid: CellularGrid,
    board_conv: BoardConv,
    history_gru: HistoryGru,
    grid_lstm: GridLstm,
    shared: nn::Linear,
    policy_head: nn::Linear,
    value_head: nn::Linear,
}

impl GanglionBrain {
    pub fn new(device: Device, config: &BrainConfig) -> GanglionBrain {
        let vs = nn::VarStore::new(device);
        let root = &vs.root();

        let grid = CellularGrid::new(&(root / "grid"), config.grid_channels);
        let board_conv = BoardConv::new(&(root / "board"), config.board_dim);
        let history_gru = HistoryGru::new(&(root / "history"), config.history_dim);
        let grid_lstm = GridLstm::new(&(root / "context"), config.grid_channels, config.context_dim);

        let fused_dim = config.board_dim + config.history_dim + config.context_dim;
        let shared = nn::linear(root / "shared", fused_dim, config.hidden_dim, Default::default());
        let policy_head = nn::linear(root / "policy", config.hidden_dim, POLICY_DIM, Default::default());
        let value_head = nn::linear(root / "value", config.hidden_dim, 1, Default::default());

        GanglionBrain {
            vs,
            grid,
            board_conv,
            history_gru,
            grid_lstm,
            shared,
            policy_head,
            value_head,
        }
    }
}

impl PolicyValueNetwork for GanglionBrain {
    fn forward(&self, board_planes: &Tensor, history_seq: &Tensor, grid: &Tensor) -> BrainOutput {
        assert_eq!(board_planes.size().len(), 4);
        assert_eq!(history_seq.size().len(), 3);
        assert_eq!(grid.size()[1], self.grid.channels());

        let new_grid = self.grid.forward(grid, board_planes);

        let board_features = self.board_conv.forward(board_planes);
        let history_features = self.history_gru.forward(history_seq);
        let context_features = self.grid_lstm.forward(&new_grid);

        let fused = Tensor::cat(&[board_features, history_features, context_features], 1);
        let x = fused.apply(&self.shared).relu();

        let policy_logits = x.apply(&self.policy_head);
        let value = x.apply(&self.value_head).tanh();

        BrainOutput {
            policy_logits,
            value,
            grid: new_grid,
        }
    }

    fn initial_grid(&self) -> Tensor {
        self.grid.initial_state()
    }
}

#[cfg(test)]
mod tests {
    use tch::Kind;
    use crate::engine::neural::constants::MAX_HISTORY;
    use crate::engine::neural::utils::{encode_board, encode_history, DEVICE};
    use crate::rules::{ChessRules, Move, RulesEngine};
    use super::*;

    fn small_config() -> BrainConfig {
        BrainConfig {
            board_dim: 32,
            history_dim: 16,
            context_dim: 16,
            grid_channels: 4,
            hidden_dim: 64,
        }
    }

    #[test]
    fn test_forward_shapes() {
        let brain = GanglionBrain::new(*DEVICE, &small_config());
        let rules = ChessRules;
        let state = rules.initial_state();

        let planes = encode_board(&rules, &state).unwrap().unsqueeze(0).to_device(*DEVICE);
        let history = encode_history(&[Move::new(12, 28), Move::new(52, 36)], MAX_HISTORY)
            .unsqueeze(0)
            .to_device(*DEVICE);
        let grid = brain.initial_grid();

        let output = tch::no_grad(|| brain.forward(&planes, &history, &grid));
        assert_eq!(output.policy_logits.size(), vec![1, 4096]);
        assert_eq!(output.value.size(), vec![1, 1]);
        assert_eq!(output.grid.size(), vec![1, 4, 8, 8]);
        assert!(output.value.abs().max().double_value(&[]) < 1.);
    }

    #[test]
    fn test_grid_leaves_zero_after_forward() {
        let brain = GanglionBrain::new(*DEVICE, &small_config());
        let rules = ChessRules;
        let planes = encode_board(&rules, &rules.initial_state()).unwrap().unsqueeze(0).to_device(*DEVICE);
        let history = encode_history(&[], MAX_HISTORY).unsqueeze(0).to_device(*DEVICE);

        let grid = brain.initial_grid();
        assert_eq!(grid.abs().sum(Kind::Float).double_value(&[]), 0.);

        let output = tch::no_grad(|| brain.forward(&planes, &history, &grid));
        assert!(output.grid.abs().sum(Kind::Float).double_value(&[]) > 0.);
        // the input grid is not touched
        assert_eq!(grid.abs().sum(Kind::Float).double_value(&[]), 0.);
    }

    #[test]
    fn test_batched_forward() {
        let brain = GanglionBrain::new(*DEVICE, &small_config());
        let planes = Tensor::zeros([3, 12, 8, 8], (Kind::Float, *DEVICE));
        let history = Tensor::zeros([3, 5, 4], (Kind::Float, *DEVICE));
        let grid = Tensor::zeros([3, 4, 8, 8], (Kind::Float, *DEVICE));

        let output = tch::no_grad(|| brain.forward(&planes, &history, &grid));
        assert_eq!(output.policy_logits.size(), vec![3, 4096]);
        assert_eq!(output.value.size(), vec![3, 1]);
    }
}
