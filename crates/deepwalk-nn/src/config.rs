//! Validated run configuration.
//!
//! Mirrors the options of the `deepwalk` command line. Every field has a
//! default, so a TOML file only needs the keys it overrides:
//!
//! ```toml
//! walks_per_node = 10
//! steps_per_walk = 40
//! n_dims = 64
//! skipgram_window_size = 5
//! lr = 0.025
//! lr_schedule = "linear"
//! tree_shape = "huffman"
//! seed = 7
//! ```

use crate::skipgram::{LrSchedule, SkipGramConfig};
use crate::{Error, Result};
use deepwalk_core::algo::random_walk::WalkConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Hierarchical-softmax tree construction policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeShapeKind {
    /// Heap-ordered balanced tree over node indices.
    #[default]
    Balanced,
    /// Huffman tree weighted by node visit counts in the walk corpus.
    Huffman,
}

/// Full DeepWalk run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeepWalkConfig {
    pub walks_per_node: usize,
    pub steps_per_walk: usize,
    /// Embedding dimension.
    pub n_dims: usize,
    pub skipgram_window_size: usize,
    pub lr: f32,
    /// Floor for the linear schedule.
    pub min_lr: f32,
    pub lr_schedule: LrSchedule,
    pub epochs: usize,
    /// Follow edges in one direction only when loading the graph.
    pub directed: bool,
    pub tree_shape: TreeShapeKind,
    /// Seed for walks and initialization; `None` picks one at startup.
    pub seed: Option<u64>,
    pub parallel_walks: bool,
    pub hogwild: bool,
    pub threads: Option<usize>,
    pub clip_warn_ratio: f64,
}

impl Default for DeepWalkConfig {
    fn default() -> Self {
        let walk = WalkConfig::default();
        let sg = SkipGramConfig::default();
        Self {
            walks_per_node: walk.walks_per_node,
            steps_per_walk: walk.steps_per_walk,
            n_dims: 16,
            skipgram_window_size: sg.window_size,
            lr: sg.learning_rate,
            min_lr: sg.min_learning_rate,
            lr_schedule: sg.schedule,
            epochs: sg.epochs,
            directed: false,
            tree_shape: TreeShapeKind::Balanced,
            seed: None,
            parallel_walks: false,
            hogwild: false,
            threads: None,
            clip_warn_ratio: sg.clip_warn_ratio,
        }
    }
}

impl DeepWalkConfig {
    /// Check every bound once; later stages assume a valid config.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("walks_per_node", self.walks_per_node),
            ("steps_per_walk", self.steps_per_walk),
            ("n_dims", self.n_dims),
            ("skipgram_window_size", self.skipgram_window_size),
            ("epochs", self.epochs),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(Error::InvalidConfig(format!("{name} must be > 0")));
            }
        }
        if !self.lr.is_finite() || self.lr <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "lr must be finite and > 0, got {}",
                self.lr
            )));
        }
        self.skipgram_config().validate()
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    pub fn walk_config(&self) -> WalkConfig {
        WalkConfig {
            walks_per_node: self.walks_per_node,
            steps_per_walk: self.steps_per_walk,
            seed: self.seed,
            parallel: self.parallel_walks,
        }
    }

    pub fn skipgram_config(&self) -> SkipGramConfig {
        SkipGramConfig {
            window_size: self.skipgram_window_size,
            learning_rate: self.lr,
            min_learning_rate: self.min_lr,
            epochs: self.epochs,
            schedule: self.lr_schedule,
            clip_warn_ratio: self.clip_warn_ratio,
            hogwild: self.hogwild,
            threads: self.threads,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_cli() {
        let c = DeepWalkConfig::default();
        assert_eq!(c.walks_per_node, 5);
        assert_eq!(c.steps_per_walk, 10);
        assert_eq!(c.n_dims, 16);
        assert_eq!(c.skipgram_window_size, 2);
        assert_eq!(c.lr, 0.025);
        assert!(!c.directed);
        c.validate().unwrap();
    }

    #[test]
    fn test_toml_partial_override() {
        let c = DeepWalkConfig::from_toml_str(
            "n_dims = 64\nlr_schedule = \"linear\"\ntree_shape = \"huffman\"\nseed = 3\n",
        )
        .unwrap();
        assert_eq!(c.n_dims, 64);
        assert_eq!(c.lr_schedule, LrSchedule::Linear);
        assert_eq!(c.tree_shape, TreeShapeKind::Huffman);
        assert_eq!(c.seed, Some(3));
        assert_eq!(c.walks_per_node, 5);
    }

    #[test]
    fn test_toml_unknown_key_rejected() {
        assert!(matches!(
            DeepWalkConfig::from_toml_str("n_dimz = 3\n"),
            Err(Error::Toml(_))
        ));
    }

    #[test]
    fn test_invalid_values_rejected() {
        for bad in [
            DeepWalkConfig { n_dims: 0, ..Default::default() },
            DeepWalkConfig { walks_per_node: 0, ..Default::default() },
            DeepWalkConfig { steps_per_walk: 0, ..Default::default() },
            DeepWalkConfig { skipgram_window_size: 0, ..Default::default() },
            DeepWalkConfig { lr: 0.0, ..Default::default() },
            DeepWalkConfig { lr: f32::INFINITY, ..Default::default() },
            DeepWalkConfig { clip_warn_ratio: 2.0, ..Default::default() },
        ] {
            assert!(matches!(bad.validate(), Err(Error::InvalidConfig(_))), "{bad:?}");
        }
    }

    #[test]
    fn test_sub_configs() {
        let c = DeepWalkConfig {
            seed: Some(9),
            parallel_walks: true,
            hogwild: true,
            threads: Some(2),
            ..Default::default()
        };
        let w = c.walk_config();
        assert_eq!(w.seed, Some(9));
        assert!(w.parallel);
        let s = c.skipgram_config();
        assert!(s.hogwild);
        assert_eq!(s.threads, Some(2));
        assert_eq!(s.window_size, 2);
    }
}
