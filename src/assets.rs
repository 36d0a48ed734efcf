//! Load-once session assets.
//!
//! The dataset, model, and project config are read exactly once per
//! session and shared read-only afterwards. Every recomputation pass
//! receives the same context object; nothing downstream mutates it.

use crate::data::{self, Observation};
use crate::logging::{json_log, obj, v_num, v_str};
use crate::model::{Classifier, LogisticModel};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Paths {
    pub dataset: PathBuf,
    pub model: PathBuf,
    pub config: PathBuf,
}

/// Key-value project parameters. Keys are the wire format of the
/// config file and are never mutated after load.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    /// Last known USD exchange rate.
    pub ultima_cotacao: f64,
    /// Display string; shown as-is, never parsed as a date.
    pub data_atualizacao: String,
}

pub struct SessionAssets {
    pub dataset: Vec<Observation>,
    pub model: Box<dyn Classifier>,
    pub config: ProjectConfig,
}

impl std::fmt::Debug for SessionAssets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionAssets")
            .field("dataset", &self.dataset)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

static ASSETS: OnceLock<SessionAssets> = OnceLock::new();

impl SessionAssets {
    /// One full read of all three resources. Any failure is fatal for the
    /// session and names the offending resource.
    pub fn load(paths: &Paths) -> Result<Self> {
        let dataset = data::load_dataset(&paths.dataset)
            .map_err(|e| anyhow!("dataset {}: {}", paths.dataset.display(), e))?;
        let hash = data::file_sha256(&paths.dataset)
            .map_err(|e| anyhow!("dataset {}: {}", paths.dataset.display(), e))?;
        json_log(
            "assets",
            obj(&[
                ("resource", v_str("dataset")),
                ("path", v_str(&paths.dataset.display().to_string())),
                ("rows", v_num(dataset.len() as f64)),
                ("hash_sha256", v_str(&hash)),
            ]),
        );

        let model = LogisticModel::load(&paths.model)
            .map_err(|e| anyhow!("model {}: {}", paths.model.display(), e))?;
        json_log(
            "assets",
            obj(&[
                ("resource", v_str("model")),
                ("path", v_str(&paths.model.display().to_string())),
                ("features", v_num(model.feature_names.len() as f64)),
            ]),
        );

        let file = File::open(&paths.config)
            .with_context(|| format!("config {}", paths.config.display()))?;
        let config: ProjectConfig = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("config {}", paths.config.display()))?;
        json_log(
            "assets",
            obj(&[
                ("resource", v_str("config")),
                ("path", v_str(&paths.config.display().to_string())),
                ("ultima_cotacao", v_num(config.ultima_cotacao)),
            ]),
        );

        Ok(Self {
            dataset,
            model: Box::new(model),
            config,
        })
    }

    /// Process-wide cached triple. The first call loads from storage;
    /// later calls return the identical object without touching disk.
    /// Read-only after init, so concurrent readers need no locking.
    pub fn cached(paths: &Paths) -> Result<&'static SessionAssets> {
        if let Some(assets) = ASSETS.get() {
            return Ok(assets);
        }
        let loaded = Self::load(paths)?;
        Ok(ASSETS.get_or_init(|| loaded))
    }
}
