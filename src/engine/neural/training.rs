use tch::nn::OptimizerConfig;
use tch::{nn, Kind, Reduction, Tensor};
use crate::config::GanglionConfig;
use crate::engine::neural::discriminator::MoveDiscriminator;
use crate::engine::neural::ganglion_brain::GanglionBrain;
use crate::engine::neural::policy_value_network::PolicyValueNetwork;
use crate::engine::neural::utils::{move_to_index, DEVICE};
use crate::engine::session::GameSession;
use crate::error::GanglionError;
use crate::rules::{Move, RulesEngine};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LossMetrics {
    pub discriminator_loss: f64,
    pub generator_loss: f64,
}

/// The generator/discriminator pair and one Adam optimizer for each. Each
/// optimizer is built over its own network's `VarStore` only.
pub struct AdversarialTrainer {
    pub brain: GanglionBrain,
    pub discriminator: MoveDiscriminator,
    generator_optimizer: nn::Optimizer,
    discriminator_optimizer: nn::Optimizer,
}

fn index_tensor(index: usize) -> Tensor {
    Tensor::from_slice(&[index as i64]).to_device(*DEVICE)
}

impl AdversarialTrainer {
    pub fn new(config: &GanglionConfig) -> Result<AdversarialTrainer, GanglionError> {
        let brain = GanglionBrain::new(*DEVICE, &config.brain);
        let discriminator = MoveDiscriminator::new(*DEVICE, &config.discriminator);

        let generator_optimizer = nn::Adam::default()
            .build(&brain.vs, config.training.generator_learning_rate)?;
        let discriminator_optimizer = nn::Adam::default()
            .build(&discriminator.vs, config.training.discriminator_learning_rate)?;

        Ok(AdversarialTrainer {
            brain,
            discriminator,
            generator_optimizer,
            discriminator_optimizer,
        })
    }

    /// One discriminator update: binary cross-entropy with target 1 for the
    /// real move and 0 for the fake one. Only the discriminator's parameters
    /// take part in the graph.
    pub fn discriminator_step(
        &mut self,
        board_planes: &Tensor,
        real_index: usize,
        fake_index: usize,
    ) -> f64 {
        self.discriminator_optimizer.zero_grad();

        let real_score = self.discriminator.forward(board_planes, &index_tensor(real_index));
        let fake_score = self.discriminator.forward(board_planes, &index_tensor(fake_index));

        let real_loss = real_score.binary_cross_entropy::<Tensor>(&real_score.ones_like(), None, Reduction::Mean);
        let fake_loss = fake_score.binary_cross_entropy::<Tensor>(&fake_score.zeros_like(), None, Reduction::Mean);
        let loss = real_loss + fake_loss;

        loss.backward();
        self.discriminator_optimizer.step();

        loss.double_value(&[])
    }

    /// One generator update: negative log-probability of the real move under
    /// the full, unmasked 4096-way softmax.
    pub fn generator_step(
        &mut self,
        board_planes: &Tensor,
        history_seq: &Tensor,
        grid: &Tensor,
        real_index: usize,
    ) -> f64 {
        self.generator_optimizer.zero_grad();

        let output = self.brain.forward(board_planes, history_seq, grid);
        let log_probs = output.policy_logits.get(0).log_softmax(0, Kind::Float);
        let loss = -log_probs.get(real_index as i64);

        loss.backward();
        self.generator_optimizer.step();

        loss.double_value(&[])
    }

    /// Trains on the session's current position. The discriminator is always
    /// updated first; the generator then runs its own forward pass from freshly
    /// encoded inputs, so the two updates share no graph.
    pub fn train_on_position<R: RulesEngine>(
        &mut self,
        session: &GameSession<R>,
        real_move: Move,
        fake_move: Move,
    ) -> Result<LossMetrics, GanglionError> {
        let real_index = move_to_index(&real_move);
        let fake_index = move_to_index(&fake_move);

        let board_planes = session.board_tensor()?;
        let discriminator_loss = self.discriminator_step(&board_planes, real_index, fake_index);

        let (board_planes, history_seq, grid) = session.prepare_inputs()?;
        let generator_loss = self.generator_step(&board_planes, &history_seq, &grid, real_index);

        Ok(LossMetrics {
            discriminator_loss,
            generator_loss,
        })
    }
}
