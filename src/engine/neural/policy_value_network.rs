use tch::Tensor;

/// What one forward pass of a generator produces.
#[derive(Debug)]
pub struct BrainOutput {
    /// [B, 4096] unconstrained scores, one per move index
    pub policy_logits: Tensor,
    /// [B, 1] in (-1, 1)
    pub value: Tensor,
    /// [B, C, 8, 8] grid after this turn's update
    pub grid: Tensor,
}

pub trait PolicyValueNetwork {
    /// board_planes: [B, 12, 8, 8], history_seq: [B, T, 4], grid: [B, C, 8, 8]
    fn forward(&self, board_planes: &Tensor, history_seq: &Tensor, grid: &Tensor) -> BrainOutput;

    /// Zero grid of the shape `forward` expects, batch size 1.
    fn initial_grid(&self) -> Tensor;
}
