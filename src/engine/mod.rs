pub mod neural;
pub mod selection;
pub mod self_play;
pub mod session;

pub use self_play::{GameReport, SelfPlayTrainer};
pub use session::{GameSession, Selection};
