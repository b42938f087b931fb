//! Run-configuration template forwarded to the external trainer.

use std::fmt::{self, Display};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Connectivity mode for the experiment-tracking backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WandbMode {
    /// Stream metrics to the tracking service as the run progresses.
    Online,
    /// Record locally and sync later.
    Offline,
    /// No tracking at all.
    Disabled,
}

impl Display for WandbMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            WandbMode::Online => "online",
            WandbMode::Offline => "offline",
            WandbMode::Disabled => "disabled",
        };
        f.write_str(text)
    }
}

/// Likelihood-function family used by the trainer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Likelihood {
    /// Gaussian-prior augmented cross-entropy.
    Softmax,
    /// Noisy Dirichlet likelihood.
    Dirichlet,
}

impl Display for Likelihood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Likelihood::Softmax => "softmax",
            Likelihood::Dirichlet => "dirichlet",
        };
        f.write_str(text)
    }
}

/// Model/architecture identifier used for the likelihood network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirtyLik {
    /// Standard ResNet-18 with batch norm.
    Std,
    /// ResNet-18 with filter response normalization.
    Frn,
    /// ResNet-18 with fixup initialization.
    Fixup,
    /// Large LeNet variant.
    LenetBig,
    /// Small LeNet variant.
    LenetSmall,
}

impl Display for DirtyLik {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DirtyLik::Std => "std",
            DirtyLik::Frn => "frn",
            DirtyLik::Fixup => "fixup",
            DirtyLik::LenetBig => "lenetbig",
            DirtyLik::LenetSmall => "lenetsmall",
        };
        f.write_str(text)
    }
}

/// Template of options forwarded verbatim to each trainer invocation.
///
/// Field defaults mirror the trainer's own argument defaults, so a YAML
/// template only needs to spell the options a sweep actually overrides.
/// `likelihood_temp` and `temperature` are distinct knobs: the former tempers
/// the likelihood and is the sweep variable, the latter is the SGLD sampling
/// temperature and stays fixed across a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Logical grouping for experiment tracking; derived from the dataset and
    /// model identifier when absent.
    #[serde(default)]
    pub project_name: Option<String>,
    /// Tracking-backend connectivity mode.
    #[serde(default = "default_wandb_mode")]
    pub wandb_mode: WandbMode,
    /// Random seed for the run.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// CUDA device ordinal; negative selects the CPU.
    #[serde(default)]
    pub device: i64,
    /// Dataset identifier (cifar10, fmnist, tiny-imagenet).
    #[serde(default = "default_dataset")]
    pub dataset: String,
    /// Dataset storage location; the trainer falls back to its DATADIR
    /// environment variable when absent.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Optional checkpoint to warm-start from.
    #[serde(default)]
    pub ckpt_path: Option<PathBuf>,
    /// Fraction of training labels to corrupt.
    #[serde(default)]
    pub label_noise: f64,
    /// Mini-batch size.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Model identifier used for the likelihood network.
    #[serde(default = "default_dirty_lik")]
    pub dirty_lik: DirtyLik,
    /// Prior variance/scale hyperparameter.
    #[serde(default = "default_prior_scale")]
    pub prior_scale: f64,
    /// Data-augmentation toggle.
    #[serde(default = "default_augment")]
    pub augment: bool,
    /// Dirichlet noise parameter.
    #[serde(default)]
    pub noise: f64,
    /// Likelihood-function family.
    #[serde(default = "default_likelihood")]
    pub likelihood: Likelihood,
    /// Temperature applied to the likelihood (the sweep variable).
    #[serde(default = "default_unit")]
    pub likelihood_temp: f64,
    /// Temperature applied to the logits.
    #[serde(default = "default_unit")]
    pub logits_temp: f64,
    /// SGD warm-up epochs (0 disables the SGD phase).
    #[serde(default)]
    pub epochs: usize,
    /// SGD learning rate.
    #[serde(default = "default_lr")]
    pub lr: f64,
    /// Number of SGLD epochs.
    #[serde(default)]
    pub sgld_epochs: usize,
    /// SGLD step size.
    #[serde(default = "default_lr")]
    pub sgld_lr: f64,
    /// SGLD momentum coefficient.
    #[serde(default = "default_momentum")]
    pub momentum: f64,
    /// SGLD sampling temperature (distinct from `likelihood_temp`).
    #[serde(default = "default_unit")]
    pub temperature: f64,
    /// Epochs discarded before posterior sampling begins.
    #[serde(default)]
    pub burn_in: usize,
    /// Number of cosine sampling cycles (0 selects plain SGLD).
    #[serde(default)]
    pub n_cycles: usize,
    /// Posterior samples drawn per cycle.
    #[serde(default = "default_n_samples")]
    pub n_samples: usize,
}

fn python_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

fn default_wandb_mode() -> WandbMode {
    WandbMode::Offline
}

fn default_seed() -> u64 {
    1
}

fn default_dataset() -> String {
    "cifar10".to_string()
}

fn default_batch_size() -> usize {
    128
}

fn default_dirty_lik() -> DirtyLik {
    DirtyLik::Std
}

fn default_prior_scale() -> f64 {
    1.0
}

fn default_augment() -> bool {
    true
}

fn default_likelihood() -> Likelihood {
    Likelihood::Softmax
}

fn default_unit() -> f64 {
    1.0
}

fn default_lr() -> f64 {
    1e-7
}

fn default_momentum() -> f64 {
    0.9
}

fn default_n_samples() -> usize {
    20
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            project_name: None,
            wandb_mode: default_wandb_mode(),
            seed: default_seed(),
            device: 0,
            dataset: default_dataset(),
            data_dir: None,
            ckpt_path: None,
            label_noise: 0.0,
            batch_size: default_batch_size(),
            dirty_lik: default_dirty_lik(),
            prior_scale: default_prior_scale(),
            augment: default_augment(),
            noise: 0.0,
            likelihood: default_likelihood(),
            likelihood_temp: default_unit(),
            logits_temp: default_unit(),
            epochs: 0,
            lr: default_lr(),
            sgld_epochs: 0,
            sgld_lr: default_lr(),
            momentum: default_momentum(),
            temperature: default_unit(),
            burn_in: 0,
            n_cycles: 0,
            n_samples: default_n_samples(),
        }
    }
}

impl RunConfig {
    /// Returns the tracking project this run reports into.
    pub fn project(&self) -> String {
        match &self.project_name {
            Some(name) => name.clone(),
            None => format!("{}_{}", self.dataset, self.dirty_lik),
        }
    }

    /// Returns the run name the trainer derives from its options.
    ///
    /// Booleans render in the trainer's own style (`True`/`False`) so the
    /// label matches the name the run reports under.
    pub fn run_label(&self) -> String {
        format!(
            "{}_{}_{}_{}_{}_{}_{}_{}_{}_{}",
            self.dataset,
            self.dirty_lik,
            self.temperature,
            self.likelihood_temp,
            python_bool(self.augment),
            self.prior_scale,
            self.logits_temp,
            self.label_noise,
            self.likelihood,
            self.seed,
        )
    }

    /// Renders the trainer option list for this configuration.
    ///
    /// Spellings follow the trainer's argument parser: snake_case for the
    /// identity options, dashed for the SGLD hyperparameters.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--project_name={}", self.project()),
            format!("--wandb_mode={}", self.wandb_mode),
            format!("--seed={}", self.seed),
            format!("--dataset={}", self.dataset),
        ];
        if let Some(dir) = &self.data_dir {
            args.push(format!("--data_dir={}", dir.display()));
        }
        args.push(format!("--dirty_lik={}", self.dirty_lik));
        args.push(format!("--likelihood={}", self.likelihood));
        args.push(format!("--augment={}", self.augment));
        args.push(format!("--likelihood_temp={}", self.likelihood_temp));
        args.push(format!("--temperature={}", self.temperature));
        args.push(format!("--prior-scale={}", self.prior_scale));
        args.push(format!("--sgld-epochs={}", self.sgld_epochs));
        args.push(format!("--sgld-lr={}", self.sgld_lr));
        args.push(format!("--momentum={}", self.momentum));
        args.push(format!("--n-cycles={}", self.n_cycles));
        args.push(format!("--n-samples={}", self.n_samples));

        // Options a sweep usually leaves at trainer defaults are only
        // emitted when the template overrides them.
        if self.device != 0 {
            args.push(format!("--device={}", self.device));
        }
        if let Some(path) = &self.ckpt_path {
            args.push(format!("--ckpt_path={}", path.display()));
        }
        if self.label_noise != 0.0 {
            args.push(format!("--label_noise={}", self.label_noise));
        }
        if self.batch_size != default_batch_size() {
            args.push(format!("--batch_size={}", self.batch_size));
        }
        if self.noise != 0.0 {
            args.push(format!("--noise={}", self.noise));
        }
        if self.logits_temp != default_unit() {
            args.push(format!("--logits_temp={}", self.logits_temp));
        }
        if self.epochs != 0 {
            args.push(format!("--epochs={}", self.epochs));
            args.push(format!("--lr={}", self.lr));
        }
        if self.burn_in != 0 {
            args.push(format!("--burn-in={}", self.burn_in));
        }
        args
    }
}
