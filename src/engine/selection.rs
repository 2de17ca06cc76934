use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use tch::{Device, Kind, Tensor};
use crate::engine::neural::constants::{MIN_TEMPERATURE, POLICY_DIM};
use crate::engine::neural::utils::{decode_index, move_to_index};
use crate::error::GanglionError;
use crate::rules::Move;

/// Copies the raw logits of legal move indices into a 4096-entry vector; every
/// other entry is negative infinity.
pub fn mask_logits(policy_logits: &Tensor, legal_moves: &[Move]) -> Result<Vec<f32>, GanglionError> {
    let logits = Vec::<f32>::try_from(
        &policy_logits
            .flatten(0, -1)
            .to_kind(Kind::Float)
            .to_device(Device::Cpu),
    )?;
    debug_assert_eq!(logits.len(), POLICY_DIM as usize);

    let mut masked = vec![f32::NEG_INFINITY; logits.len()];
    for mv in legal_moves {
        let index = move_to_index(mv);
        masked[index] = logits[index];
    }
    Ok(masked)
}

/// Distinct legal move indices in the order their moves were enumerated.
fn legal_indices(legal_moves: &[Move]) -> Vec<usize> {
    let mut seen = vec![false; POLICY_DIM as usize];
    let mut indices = Vec::with_capacity(legal_moves.len());
    for mv in legal_moves {
        let index = move_to_index(mv);
        if !seen[index] {
            seen[index] = true;
            indices.push(index);
        }
    }
    indices
}

/// Picks the move to play from a policy over move indices.
///
/// With `temperature <= 0` the highest-scoring legal index wins (ties go to the
/// first enumerated move) and `rng` is not touched. Otherwise the legal logits
/// are divided by `max(temperature, MIN_TEMPERATURE)`, normalized with a
/// softmax over the legal subset and sampled.
///
/// Returns `None` when there are no legal moves.
pub fn select_move<G: Rng + ?Sized>(
    policy_logits: &Tensor,
    legal_moves: &[Move],
    temperature: f64,
    rng: &mut G,
) -> Result<Option<Move>, GanglionError> {
    if legal_moves.is_empty() {
        return Ok(None);
    }

    let masked = mask_logits(policy_logits, legal_moves)?;
    let indices = legal_indices(legal_moves);

    let chosen = if temperature <= 0. {
        let mut best = indices[0];
        for &index in &indices[1..] {
            if masked[index] > masked[best] {
                best = index;
            }
        }
        best
    } else {
        let temperature = temperature.max(MIN_TEMPERATURE);
        let scaled: Vec<f64> = indices.iter().map(|&i| masked[i] as f64 / temperature).collect();
        let max = scaled.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let weights: Vec<f64> = scaled.iter().map(|s| (s - max).exp()).collect();
        let distribution = WeightedIndex::new(&weights)?;
        indices[distribution.sample(rng)]
    };

    Ok(decode_index(legal_moves, chosen))
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use crate::rules::{ChessRules, RulesEngine, KNIGHT, QUEEN, ROOK};
    use super::*;

    fn patterned_logits() -> Tensor {
        let values: Vec<f32> = (0..4096).map(|i| ((i * 37) % 101) as f32 / 10.).collect();
        Tensor::from_slice(&values).view([1, 4096])
    }

    fn logits_favoring(index: usize, score: f32) -> Tensor {
        let mut values = vec![0f32; 4096];
        values[index] = score;
        Tensor::from_slice(&values)
    }

    #[test]
    fn test_no_legal_moves() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(select_move(&patterned_logits(), &[], 0., &mut rng).unwrap(), None);
        assert_eq!(select_move(&patterned_logits(), &[], 1., &mut rng).unwrap(), None);
    }

    #[test]
    fn test_mask_logits() {
        let legal_moves = [Move::new(12, 28), Move::new(6, 21)];
        let masked = mask_logits(&patterned_logits(), &legal_moves).unwrap();
        assert_eq!(masked.len(), 4096);
        assert_eq!(masked.iter().filter(|v| v.is_finite()).count(), 2);
        assert_eq!(masked[12 * 64 + 28], ((12 * 64 + 28) * 37 % 101) as f32 / 10.);
        assert_eq!(masked[0], f32::NEG_INFINITY);
    }

    #[test]
    fn test_greedy_ignores_better_illegal_moves() {
        let rules = ChessRules;
        let legal_moves = rules.legal_moves(&rules.initial_state());
        // e2e5 is illegal and scores highest
        let mut values = vec![0f32; 4096];
        values[12 * 64 + 36] = 100.;
        values[6 * 64 + 21] = 5.;
        let logits = Tensor::from_slice(&values);

        let mut rng = StdRng::seed_from_u64(0);
        let mv = select_move(&logits, &legal_moves, 0., &mut rng).unwrap();
        assert_eq!(mv, Some(Move::new(6, 21)));
    }

    #[test]
    fn test_greedy_breaks_ties_by_enumeration_order() {
        let legal_moves = [Move::new(1, 18), Move::new(12, 28), Move::new(6, 21)];
        let logits = Tensor::zeros([4096], (Kind::Float, Device::Cpu));
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(select_move(&logits, &legal_moves, 0., &mut rng).unwrap(), Some(Move::new(1, 18)));
        assert_eq!(select_move(&logits, &legal_moves, -2., &mut rng).unwrap(), Some(Move::new(1, 18)));
    }

    #[test]
    fn test_greedy_consumes_no_randomness() {
        let rules = ChessRules;
        let legal_moves = rules.legal_moves(&rules.initial_state());
        let mut used = StdRng::seed_from_u64(9);
        let mut fresh = StdRng::seed_from_u64(9);

        let first = select_move(&patterned_logits(), &legal_moves, 0., &mut used).unwrap();
        let second = select_move(&patterned_logits(), &legal_moves, 0., &mut used).unwrap();
        assert_eq!(first, second);
        assert_eq!(used.gen::<u64>(), fresh.gen::<u64>());
    }

    #[test]
    fn test_sampling_is_reproducible_with_seed() {
        let rules = ChessRules;
        let legal_moves = rules.legal_moves(&rules.initial_state());
        for seed in 0..10 {
            let a = select_move(&patterned_logits(), &legal_moves, 1., &mut StdRng::seed_from_u64(seed)).unwrap();
            let b = select_move(&patterned_logits(), &legal_moves, 1., &mut StdRng::seed_from_u64(seed)).unwrap();
            assert_eq!(a, b);
            assert!(legal_moves.contains(&a.unwrap()));
        }
    }

    #[test]
    fn test_sampling_only_returns_legal_moves() {
        let rules = ChessRules;
        let state = rules
            .state_from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
            .unwrap();
        let legal_moves = rules.legal_moves(&state);
        let mut rng = StdRng::seed_from_u64(3);
        let logits = Tensor::randn([4096], (Kind::Float, Device::Cpu)) * 3.;
        for _ in 0..200 {
            let mv = select_move(&logits, &legal_moves, 0.8, &mut rng).unwrap().unwrap();
            assert!(legal_moves.contains(&mv), "{} is not legal", mv);
        }
    }

    #[test]
    fn test_tiny_temperature_is_clamped() {
        let legal_moves = [Move::new(1, 18), Move::new(12, 28)];
        let logits = logits_favoring(12 * 64 + 28, 1.);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let mv = select_move(&logits, &legal_moves, 1e-12, &mut rng).unwrap();
            assert_eq!(mv, Some(Move::new(12, 28)));
        }
    }

    #[test]
    fn test_single_legal_move_at_any_temperature() {
        let rules = ChessRules;
        let state = rules.state_from_fen("1r6/8/8/8/8/2k5/8/K7 w - - 0 1").unwrap();
        let legal_moves = rules.legal_moves(&state);
        assert_eq!(legal_moves, vec![Move::new(0, 8)]);

        let mut rng = StdRng::seed_from_u64(11);
        for temperature in [-1., 0., 1e-9, 0.2, 1., 50.] {
            let mv = select_move(&patterned_logits(), &legal_moves, temperature, &mut rng).unwrap();
            assert_eq!(mv, Some(Move::new(0, 8)), "temperature {}", temperature);
        }
    }

    #[test]
    fn test_promotion_decodes_to_queen() {
        let legal_moves = [
            Move::with_promotion(48, 56, KNIGHT),
            Move::with_promotion(48, 56, ROOK),
            Move::with_promotion(48, 56, QUEEN),
            Move::new(7, 15),
        ];
        let logits = logits_favoring(48 * 64 + 56, 10.);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            select_move(&logits, &legal_moves, 0., &mut rng).unwrap(),
            Some(Move::with_promotion(48, 56, QUEEN))
        );
        assert_eq!(
            select_move(&logits, &legal_moves, 0.01, &mut rng).unwrap(),
            Some(Move::with_promotion(48, 56, QUEEN))
        );
    }
}
