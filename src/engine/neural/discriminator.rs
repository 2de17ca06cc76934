use tch::{nn, Device, Tensor};
use crate::config::DiscriminatorConfig;
use crate::engine::neural::board_conv::BoardConv;
use crate::engine::neural::constants::POLICY_DIM;

/// Judges how plausible a move index is as a real move in a position.
/// Owns its own board extractor; nothing is shared with the generator.
#[derive(Debug)]
pub struct MoveDiscriminator {
    pub vs: nn::VarStore,
    board_conv: BoardConv,
    move_embed: nn::Embedding,
    fc1: nn::Linear,
    fc2: nn::Linear,
}

impl MoveDiscriminator {
    pub fn new(device: Device, config: &DiscriminatorConfig) -> MoveDiscriminator {
        let vs = nn::VarStore::new(device);
        let root = &vs.root();

        let board_conv = BoardConv::new(&(root / "board"), config.board_dim);
        let move_embed = nn::embedding(root / "move_embed", POLICY_DIM, config.move_embed_dim, Default::default());
        let fc1 = nn::linear(root / "fc1", config.board_dim + config.move_embed_dim, config.hidden_dim, Default::default());
        let fc2 = nn::linear(root / "fc2", config.hidden_dim, 1, Default::default());

        MoveDiscriminator {
            vs,
            board_conv,
            move_embed,
            fc1,
            fc2,
        }
    }

    /// board_planes: [B, 12, 8, 8], move_indices: [B] (int64) -> [B, 1] in (0, 1)
    pub fn forward(&self, board_planes: &Tensor, move_indices: &Tensor) -> Tensor {
        let board_features = self.board_conv.forward(board_planes);
        let move_features = move_indices.apply(&self.move_embed);
        Tensor::cat(&[board_features, move_features], 1)
            .apply(&self.fc1)
            .relu()
            .apply(&self.fc2)
            .sigmoid()
    }
}
