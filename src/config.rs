use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    alphabet::Alphabet,
    error::{Error, Result},
    kasiski::DEFAULT_MIN_SUBSTRING_LENGTH,
};

/// Limits on the local search of a single key length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchBudget {
    /// Full hill-climbing passes allowed per climb; `None` climbs until no
    /// single move improves.
    pub max_passes: Option<usize>,
    /// Random single-position perturbations tried after convergence. Each
    /// one is climbed again and kept only if it ends strictly lower.
    pub restarts: usize,
    pub seed: u64,
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self {
            max_passes: None,
            restarts: 0,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrackConfig {
    /// Ordered symbols; the built-in Russian alphabet when absent.
    pub alphabet: Option<String>,
    pub corpus: Vec<PathBuf>,
    pub min_substring_length: usize,
    #[serde(flatten)]
    pub budget: SearchBudget,
    /// Evaluate candidate key lengths on the rayon pool.
    pub parallel: bool,
}

impl Default for CrackConfig {
    fn default() -> Self {
        Self {
            alphabet: None,
            corpus: vec![PathBuf::from("war.txt"), PathBuf::from("anna.txt")],
            min_substring_length: DEFAULT_MIN_SUBSTRING_LENGTH,
            budget: SearchBudget::default(),
            parallel: true,
        }
    }
}

impl CrackConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn alphabet(&self) -> Result<Alphabet> {
        match &self.alphabet {
            Some(symbols) => symbols.parse(),
            None => Ok(Alphabet::russian()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_run() {
        let config = CrackConfig::default();
        assert_eq!(config.min_substring_length, 3);
        assert_eq!(config.budget.restarts, 0);
        assert_eq!(config.budget.max_passes, None);
        assert_eq!(config.alphabet().unwrap().len(), 36);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = CrackConfig::from_json(
            r#"{ "alphabet": "абв", "corpus": ["a.txt"], "restarts": 4, "seed": 9 }"#,
        )
        .unwrap();
        assert_eq!(config.alphabet().unwrap().symbols(), &['а', 'б', 'в']);
        assert_eq!(config.corpus, vec![PathBuf::from("a.txt")]);
        assert_eq!(config.budget.restarts, 4);
        assert_eq!(config.budget.seed, 9);
        assert_eq!(config.budget.max_passes, None);
        assert_eq!(config.min_substring_length, 3);
        assert!(config.parallel);
    }

    #[test]
    fn bad_json_is_a_config_error() {
        assert!(matches!(
            CrackConfig::from_json(r#"{ "restarts": "many" }"#),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn round_trips_through_json() {
        let config = CrackConfig {
            budget: SearchBudget {
                max_passes: Some(10),
                ..Default::default()
            },
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(CrackConfig::from_json(&json).unwrap(), config);
    }
}
