pub mod board_conv;
pub mod cellular_grid;
pub mod constants;
pub mod discriminator;
pub mod ganglion_brain;
pub mod grid_lstm;
pub mod history_gru;
pub mod policy_value_network;
pub mod training;
pub mod utils;

pub use ganglion_brain::GanglionBrain;
pub use discriminator::MoveDiscriminator;
pub use policy_value_network::{BrainOutput, PolicyValueNetwork};
pub use training::{AdversarialTrainer, LossMetrics};
