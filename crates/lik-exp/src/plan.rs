use lik_core::errors::{ErrorInfo, LikError};
use lik_core::{stable_hash_string, RunConfig};
use serde::{Deserialize, Serialize};

/// YAML-configurable sweep description.
///
/// The driver iterates `likelihood_temps` in order; for each value it launches
/// one trainer process per seed and waits for the whole group before moving
/// on. Temperatures and seeds are fixed at load time and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPlan {
    /// Trainer invocation prefix, e.g. `["python", "experiments/train_lik.py"]`.
    pub program: Vec<String>,
    /// Ordered likelihood temperatures to sweep over.
    pub likelihood_temps: Vec<f64>,
    /// Seeds launched concurrently at each temperature.
    #[serde(default = "default_seeds")]
    pub seeds: Vec<u64>,
}

fn default_seeds() -> Vec<u64> {
    vec![1, 2, 3]
}

impl SweepPlan {
    /// Checks the plan is runnable before any process is spawned.
    pub fn validate(&self) -> Result<(), LikError> {
        if self.program.is_empty() {
            return Err(LikError::Plan(ErrorInfo::new(
                "plan-no-program",
                "plan does not name a trainer executable",
            )));
        }
        if self.likelihood_temps.is_empty() {
            return Err(LikError::Plan(ErrorInfo::new(
                "plan-empty",
                "plan contains no likelihood temperatures",
            )));
        }
        if self.seeds.is_empty() {
            return Err(LikError::Plan(ErrorInfo::new(
                "plan-empty",
                "plan contains no seeds",
            )));
        }
        Ok(())
    }
}

/// Computes the stable hash identifying a (plan, template) pair.
pub fn sweep_hash(plan: &SweepPlan, template: &RunConfig) -> Result<String, LikError> {
    stable_hash_string(&(plan, template))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_default_to_one_two_three() {
        let yaml = r#"
program: ["python", "experiments/train_lik.py"]
likelihood_temps: [2.0, 1.0, 0.5]
"#;
        let plan: SweepPlan = serde_yaml::from_str(yaml).expect("plan");
        assert_eq!(plan.seeds, vec![1, 2, 3]);
        plan.validate().expect("valid");
    }

    #[test]
    fn empty_temperatures_rejected() {
        let plan = SweepPlan {
            program: vec!["python".to_string()],
            likelihood_temps: Vec::new(),
            seeds: vec![1],
        };
        let err = plan.validate().expect_err("must fail");
        assert_eq!(err.info().code, "plan-empty");
    }

    #[test]
    fn hash_distinguishes_plans() {
        let template = RunConfig::default();
        let base = SweepPlan {
            program: vec!["python".to_string(), "train.py".to_string()],
            likelihood_temps: vec![1.0],
            seeds: vec![1, 2, 3],
        };
        let other = SweepPlan {
            likelihood_temps: vec![2.0],
            ..base.clone()
        };
        let a = sweep_hash(&base, &template).expect("hash");
        let b = sweep_hash(&other, &template).expect("hash");
        assert_ne!(a, b);
    }
}
