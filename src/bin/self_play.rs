use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;
use ganglion::engine::SelfPlayTrainer;
use ganglion::rules::ChessRules;
use ganglion::GanglionConfig;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => GanglionConfig::load_or_default(&PathBuf::from(path))?,
        None => GanglionConfig::default(),
    };
    info!(
        "self-play: {} games, max {} moves, temperature {}",
        config.training.games, config.training.max_moves, config.training.exploration_temperature
    );

    let start_time = Instant::now();
    let mut self_play = SelfPlayTrainer::new(ChessRules, &config)?;
    let reports = self_play.train()?;

    let decisive = reports.iter().filter(|r| r.outcome.is_decisive()).count();
    let total_plies: usize = reports.iter().map(|r| r.plies).sum();
    info!(
        "done: {} games, {} decisive, {} plies in {:.2}s",
        reports.len(),
        decisive,
        total_plies,
        start_time.elapsed().as_secs_f32()
    );
    Ok(())
}
