use rand::Rng;
use tch::Tensor;
use tracing::warn;
use crate::engine::neural::policy_value_network::PolicyValueNetwork;
use crate::engine::neural::utils::{encode_board, encode_history, DEVICE};
use crate::engine::selection;
use crate::error::GanglionError;
use crate::rules::{Move, Outcome, RulesEngine};

/// A move chosen by the network, with the value it assigned to the position
/// and the grid it produced.
#[derive(Debug)]
pub struct Selection {
    pub mv: Move,
    pub value: f64,
    pub grid: Tensor,
}

/// One game in progress: rules-engine state, the moves played so far and the
/// recurrent grid carried between turns.
///
/// The grid produced by `select_move` is held back until `commit_move`, so a
/// selection that is never played leaves the session unchanged.
pub struct GameSession<R: RulesEngine> {
    rules: R,
    state: R::State,
    history: Vec<Move>,
    initial_grid: Tensor,
    grid: Tensor,
    pending_grid: Option<Tensor>,
    history_window: usize,
}

impl<R: RulesEngine> GameSession<R> {
    pub fn new(rules: R, initial_grid: Tensor, history_window: usize) -> GameSession<R> {
        let state = rules.initial_state();
        let initial_grid = initial_grid.detach().to_device(*DEVICE);
        GameSession {
            rules,
            state,
            history: Vec::new(),
            grid: initial_grid.copy(),
            initial_grid,
            pending_grid: None,
            history_window,
        }
    }

    pub fn reset(&mut self) {
        let state = self.rules.initial_state();
        self.reset_to(state);
    }

    /// Starts a fresh game from `state` with an empty history and a zeroed grid.
    pub fn reset_to(&mut self, state: R::State) {
        self.state = state;
        self.history.clear();
        self.grid = self.initial_grid.copy();
        self.pending_grid = None;
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn current_state(&self) -> &R::State {
        &self.state
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn grid(&self) -> &Tensor {
        &self.grid
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.rules.legal_moves(&self.state)
    }

    pub fn is_terminal(&self) -> bool {
        self.rules.is_terminal(&self.state)
    }

    pub fn outcome(&self) -> Outcome {
        self.rules.outcome(&self.state)
    }

    /// [1, 12, 8, 8] on `DEVICE`
    pub fn board_tensor(&self) -> Result<Tensor, GanglionError> {
        Ok(encode_board(&self.rules, &self.state)?.unsqueeze(0).to_device(*DEVICE))
    }

    /// [1, T, 4] on `DEVICE`
    pub fn history_tensor(&self) -> Tensor {
        encode_history(&self.history, self.history_window)
            .unsqueeze(0)
            .to_device(*DEVICE)
    }

    /// Board planes, history sequence and committed grid, batched for a
    /// forward pass.
    pub fn prepare_inputs(&self) -> Result<(Tensor, Tensor, Tensor), GanglionError> {
        Ok((self.board_tensor()?, self.history_tensor(), self.grid.shallow_clone()))
    }

    /// Runs the network on the current position and picks a legal move.
    /// Returns `None` if the game is over or there is nothing to play.
    pub fn select_move<G: Rng + ?Sized>(
        &mut self,
        network: &dyn PolicyValueNetwork,
        temperature: f64,
        rng: &mut G,
    ) -> Result<Option<Selection>, GanglionError> {
        if self.is_terminal() {
            return Ok(None);
        }
        let legal_moves = self.legal_moves();
        if legal_moves.is_empty() {
            return Ok(None);
        }

        let (board_planes, history_seq, grid) = self.prepare_inputs()?;
        let output = tch::no_grad(|| network.forward(&board_planes, &history_seq, &grid));
        let new_grid = output.grid.detach();

        let mv = match selection::select_move(&output.policy_logits, &legal_moves, temperature, rng)? {
            Some(mv) => mv,
            None => {
                warn!("no move selected from {} legal moves", legal_moves.len());
                return Ok(None);
            }
        };

        self.pending_grid = Some(new_grid.shallow_clone());
        Ok(Some(Selection {
            mv,
            value: output.value.double_value(&[0, 0]),
            grid: new_grid,
        }))
    }

    /// Plays `mv`, which must be legal in the current position. A grid left
    /// pending by `select_move` becomes the carried grid; a move that was not
    /// selected by the network, such as a human move, keeps the current one.
    pub fn commit_move(&mut self, mv: Move) {
        self.state = self.rules.apply(&self.state, mv);
        self.history.push(mv);
        if let Some(grid) = self.pending_grid.take() {
            self.grid = grid;
        }
    }
}
