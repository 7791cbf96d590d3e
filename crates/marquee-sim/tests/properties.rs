//! Property tests driving the engine through the oracle.

use proptest::prelude::*;

use marquee_core::{Coord, EngineConfig, Event, Recommender, User};
use marquee_sim::{CATEGORY_POOL, CampaignConfig, DeterministicRng, MatchOracle, run_single_seed};

/// Strategy for one entity's raw fields: pool-label indices, coordinate
/// components, and a day, all within the default engine dimensions.
fn entity_fields() -> impl Strategy<Value = (Vec<usize>, u32, u32, u32)> {
    (
        prop::collection::vec(0..CATEGORY_POOL.len(), 0..4),
        0u32..10,
        0u32..10,
        0u32..365,
    )
}

fn labels(indices: &[usize]) -> Vec<String> {
    indices.iter().map(|&i| CATEGORY_POOL[i].to_string()).collect()
}

proptest! {
    #[test]
    fn random_seed_campaigns_hold_every_invariant(seed in 0u64..256) {
        let config = CampaignConfig {
            seed_range: seed..seed + 1,
            steps: 30,
            ..CampaignConfig::default()
        };
        let outcome = run_single_seed(seed, &config).expect("engine error");
        prop_assert!(outcome.is_ok(), "violations: {:?}", outcome.err());
    }

    #[test]
    fn incremental_match_set_equals_full_recompute(
        raw_events in prop::collection::vec(entity_fields(), 0..12),
        raw_users in prop::collection::vec(entity_fields(), 0..12),
    ) {
        let mut engine = Recommender::new(EngineConfig::default()).expect("config");
        for (indices, x, y, day) in &raw_events {
            engine
                .insert_event(Event::new(labels(indices), Coord::new(*x, *y), *day))
                .expect("valid event");
        }
        for (indices, x, y, birthday) in &raw_users {
            engine
                .insert_user(User::new(labels(indices), Coord::new(*x, *y), *birthday))
                .expect("valid user");
        }

        let result = MatchOracle::check_rederivability(&engine);
        prop_assert!(result.passed, "violations: {:?}", result.violations);
    }

    #[test]
    fn insertion_order_never_changes_the_match_set(
        raw_events in prop::collection::vec(entity_fields(), 1..8),
        raw_users in prop::collection::vec(entity_fields(), 1..8),
        shuffle_seed in 0u64..64,
    ) {
        let mut engine = Recommender::new(EngineConfig::default()).expect("config");
        for (indices, x, y, day) in &raw_events {
            engine
                .insert_event(Event::new(labels(indices), Coord::new(*x, *y), *day))
                .expect("valid event");
        }
        for (indices, x, y, birthday) in &raw_users {
            engine
                .insert_user(User::new(labels(indices), Coord::new(*x, *y), *birthday))
                .expect("valid user");
        }

        let mut rng = DeterministicRng::new(shuffle_seed);
        let result = MatchOracle::check_commutativity(&engine, &mut rng, 3);
        prop_assert!(result.passed, "violations: {:?}", result.violations);
    }
}
