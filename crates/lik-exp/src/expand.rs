//! Deterministic expansion of a sweep plan into launchable run specs.

use lik_core::{LikError, RunConfig};
use serde::{Deserialize, Serialize};

use crate::plan::SweepPlan;

/// One launchable (temperature, seed) job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSpec {
    /// Seed assigned to this run.
    pub seed: u64,
    /// Likelihood temperature of the enclosing group.
    pub likelihood_temp: f64,
    /// Run name the trainer will report under.
    pub label: String,
    /// Full command line: program prefix followed by rendered options.
    pub command: Vec<String>,
    /// The configuration forwarded to the trainer.
    pub config: RunConfig,
}

/// All runs sharing one likelihood temperature; launched together and joined
/// at a single barrier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempGroup {
    pub likelihood_temp: f64,
    pub runs: Vec<RunSpec>,
}

/// Expands a plan and template into temperature groups.
///
/// Pure function of its inputs: the same plan and template always expand to
/// the same groups, in the same order. Per temperature there is exactly one
/// spec per seed; the specs differ only in their seed.
pub fn expand(plan: &SweepPlan, template: &RunConfig) -> Result<Vec<TempGroup>, LikError> {
    plan.validate()?;
    let mut groups = Vec::with_capacity(plan.likelihood_temps.len());
    for &likelihood_temp in &plan.likelihood_temps {
        let mut runs = Vec::with_capacity(plan.seeds.len());
        for &seed in &plan.seeds {
            let mut config = template.clone();
            config.seed = seed;
            config.likelihood_temp = likelihood_temp;

            let mut command = plan.program.clone();
            command.extend(config.to_args());

            runs.push(RunSpec {
                seed,
                likelihood_temp,
                label: config.run_label(),
                command,
                config,
            });
        }
        groups.push(TempGroup {
            likelihood_temp,
            runs,
        });
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> SweepPlan {
        SweepPlan {
            program: vec!["python".to_string(), "experiments/train_lik.py".to_string()],
            likelihood_temps: vec![2.0, 1.0, 0.5],
            seeds: vec![1, 2, 3],
        }
    }

    #[test]
    fn groups_differ_only_in_seed() {
        let template = RunConfig::default();
        let groups = expand(&plan(), &template).expect("expand");
        assert_eq!(groups.len(), 3);
        for (group, &temp) in groups.iter().zip(&plan().likelihood_temps) {
            assert_eq!(group.likelihood_temp, temp);
            assert_eq!(group.runs.len(), 3);
            for (run, &seed) in group.runs.iter().zip(&[1u64, 2, 3]) {
                assert_eq!(run.seed, seed);
                assert_eq!(run.config.seed, seed);
                assert_eq!(run.config.likelihood_temp, temp);

                // every other field matches the template
                let mut neutral = run.config.clone();
                neutral.seed = template.seed;
                neutral.likelihood_temp = template.likelihood_temp;
                assert_eq!(neutral, template);
            }
        }
    }

    #[test]
    fn command_starts_with_program_prefix() {
        let groups = expand(&plan(), &RunConfig::default()).expect("expand");
        let run = &groups[0].runs[0];
        assert_eq!(run.command[0], "python");
        assert_eq!(run.command[1], "experiments/train_lik.py");
        assert!(run.command.contains(&"--likelihood_temp=2".to_string()));
        assert!(run.command.contains(&"--seed=1".to_string()));
    }
}
