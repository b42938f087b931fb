use lik_core::{to_canonical_json_bytes, RunConfig};
use lik_exp::{expand, sweep_hash, SweepPlan};
use proptest::prelude::*;

fn plan() -> SweepPlan {
    SweepPlan {
        program: vec!["python".to_string(), "experiments/train_lik.py".to_string()],
        likelihood_temps: vec![2.0, 1.0, 0.75, 0.5, 0.3, 0.1],
        seeds: vec![1, 2, 3],
    }
}

#[test]
fn expansion_repeats_byte_identically() {
    let template = RunConfig::default();
    let groups_a = expand(&plan(), &template).expect("expand");
    let groups_b = expand(&plan(), &template).expect("expand");
    assert_eq!(groups_a, groups_b);

    let json_a = to_canonical_json_bytes(&groups_a).expect("json");
    let json_b = to_canonical_json_bytes(&groups_b).expect("json");
    assert_eq!(json_a, json_b);

    let hash_a = sweep_hash(&plan(), &template).expect("hash");
    let hash_b = sweep_hash(&plan(), &template).expect("hash");
    assert_eq!(hash_a, hash_b);
}

#[test]
fn every_temperature_gets_one_run_per_seed() {
    let template = RunConfig::default();
    let groups = expand(&plan(), &template).expect("expand");
    assert_eq!(groups.len(), 6);
    for (group, &temp) in groups.iter().zip(&plan().likelihood_temps) {
        assert_eq!(group.likelihood_temp, temp);
        let seeds: Vec<u64> = group.runs.iter().map(|run| run.seed).collect();
        assert_eq!(seeds, vec![1, 2, 3]);
        for run in &group.runs {
            assert_eq!(run.config.likelihood_temp, temp);
            // the fixed sampling temperature is untouched by the sweep
            assert_eq!(run.config.temperature, template.temperature);
        }
    }
}

proptest! {
    #[test]
    fn expansion_shape_holds_for_arbitrary_plans(
        temps in prop::collection::vec(0.01f64..8.0, 1..6),
        seeds in prop::collection::vec(1u64..64, 1..5),
    ) {
        let plan = SweepPlan {
            program: vec!["trainer".to_string()],
            likelihood_temps: temps.clone(),
            seeds: seeds.clone(),
        };
        let template = RunConfig::default();
        let groups = expand(&plan, &template).expect("expand");
        prop_assert_eq!(groups.len(), temps.len());
        for (group, temp) in groups.iter().zip(&temps) {
            prop_assert_eq!(group.runs.len(), seeds.len());
            for (run, seed) in group.runs.iter().zip(&seeds) {
                prop_assert_eq!(run.seed, *seed);
                prop_assert_eq!(run.config.likelihood_temp, *temp);
            }
        }
    }
}
