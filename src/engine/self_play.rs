use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info, warn};
use crate::config::{GanglionConfig, PlayConfig, TrainingConfig};
use crate::engine::neural::policy_value_network::PolicyValueNetwork;
use crate::engine::neural::training::{AdversarialTrainer, LossMetrics};
use crate::engine::session::GameSession;
use crate::error::GanglionError;
use crate::rules::{Move, Outcome, RulesEngine};

/// Summary of one self-play game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameReport {
    pub plies: usize,
    /// Scored on the final position. A game stopped by the move ceiling is
    /// `Outcome::Ongoing` unless a draw could be claimed there.
    pub outcome: Outcome,
    pub mean_discriminator_loss: f64,
    pub mean_generator_loss: f64,
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0., 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.
    } else {
        sum / count as f64
    }
}

impl GameReport {
    fn from_losses(plies: usize, outcome: Outcome, losses: &[LossMetrics]) -> GameReport {
        GameReport {
            plies,
            outcome,
            mean_discriminator_loss: mean(losses.iter().map(|l| l.discriminator_loss)),
            mean_generator_loss: mean(losses.iter().map(|l| l.generator_loss)),
        }
    }
}

/// Drives adversarial self-play: the brain plays both sides and both networks
/// are updated on every move it makes.
pub struct SelfPlayTrainer<R: RulesEngine> {
    pub trainer: AdversarialTrainer,
    pub session: GameSession<R>,
    rng: StdRng,
    config: TrainingConfig,
    play: PlayConfig,
}

impl<R: RulesEngine> SelfPlayTrainer<R> {
    pub fn new(rules: R, config: &GanglionConfig) -> Result<SelfPlayTrainer<R>, GanglionError> {
        config.validate()?;

        let rng = match config.training.seed {
            Some(seed) => {
                tch::manual_seed(seed as i64);
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_entropy(),
        };

        let trainer = AdversarialTrainer::new(config)?;
        let session = GameSession::new(rules, trainer.brain.initial_grid(), config.training.history_window);

        Ok(SelfPlayTrainer {
            trainer,
            session,
            rng,
            config: config.training.clone(),
            play: config.play.clone(),
        })
    }

    /// Picks a move for the current position without training on it, at
    /// `temperature` or the configured play temperature. The caller commits it
    /// through `session`.
    pub fn suggest_move(&mut self, temperature: Option<f64>) -> Result<Option<Move>, GanglionError> {
        let temperature = temperature.unwrap_or(self.play.temperature);
        let selection = self
            .session
            .select_move(&self.trainer.brain as &dyn PolicyValueNetwork, temperature, &mut self.rng)?;
        Ok(selection.map(|s| s.mv))
    }

    /// Plays one game from the initial position, training after every move,
    /// until the game ends or `max_moves` plies have been played.
    pub fn self_play_game(&mut self) -> Result<GameReport, GanglionError> {
        self.session.reset();
        let mut losses = Vec::new();

        for ply in 0..self.config.max_moves {
            if self.session.is_terminal() {
                break;
            }
            let legal_moves = self.session.legal_moves();
            if legal_moves.is_empty() {
                break;
            }

            let selection = self.session.select_move(
                &self.trainer.brain as &dyn PolicyValueNetwork,
                self.config.exploration_temperature,
                &mut self.rng,
            )?;
            let selection = match selection {
                Some(selection) => selection,
                None => {
                    warn!("ending game at ply {}: no move selected", ply);
                    break;
                }
            };
            let real_move = selection.mv;

            let alternatives: Vec<Move> = legal_moves.into_iter().filter(|&mv| mv != real_move).collect();
            let fake_move = alternatives.choose(&mut self.rng).copied().unwrap_or(real_move);

            let metrics = self.trainer.train_on_position(&self.session, real_move, fake_move)?;
            debug!(
                ply,
                real = %real_move,
                fake = %fake_move,
                value = selection.value,
                d_loss = metrics.discriminator_loss,
                g_loss = metrics.generator_loss,
                "training step"
            );
            losses.push(metrics);

            self.session.commit_move(real_move);
        }

        Ok(GameReport::from_losses(self.session.history().len(), self.session.outcome(), &losses))
    }

    /// Runs the configured number of games in sequence.
    pub fn train(&mut self) -> Result<Vec<GameReport>, GanglionError> {
        let games = self.config.games;
        let mut reports = Vec::with_capacity(games);
        for game in 0..games {
            info!("starting game {}/{}", game + 1, games);
            let report = self.self_play_game()?;
            info!(
                "finished game {}/{}: {} plies, result {}, mean d_loss {:.4}, mean g_loss {:.4}",
                game + 1,
                games,
                report.plies,
                report.outcome,
                report.mean_discriminator_loss,
                report.mean_generator_loss
            );
            reports.push(report);
        }
        Ok(reports)
    }
}
