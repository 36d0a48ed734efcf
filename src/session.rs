//! Session configuration from the environment.
//!
//! The environment plays the role of the dashboard's input controls: one
//! numeric input for the exchange rate, four for the weather sliders, and
//! a discrete trigger for the diagnosis.

use crate::assets::Paths;
use std::path::PathBuf;

#[derive(Clone)]
pub struct Config {
    pub dataset_path: String,
    pub model_path: String,
    pub config_path: String,
    /// Overrides the config file's last known rate when set.
    pub exchange_rate: Option<f64>,
    pub rate_min: f64,
    pub rate_max: f64,
    pub humidity: f64,
    pub rain: f64,
    /// Default to today's values, matching the input widgets.
    pub humidity_yesterday: Option<f64>,
    pub rain_yesterday: Option<f64>,
    /// Inference runs only when explicitly requested.
    pub run_diagnosis: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            dataset_path: std::env::var("DATASET_PATH")
                .unwrap_or_else(|_| "data/final_santos_data_lake.csv".to_string()),
            model_path: std::env::var("MODEL_PATH")
                .unwrap_or_else(|_| "data/modelo_porto.json".to_string()),
            config_path: std::env::var("CONFIG_PATH")
                .unwrap_or_else(|_| "data/config_projeto.json".to_string()),
            exchange_rate: std::env::var("EXCHANGE_RATE").ok().and_then(|v| v.parse().ok()),
            rate_min: std::env::var("RATE_MIN").ok().and_then(|v| v.parse().ok()).unwrap_or(4.0),
            rate_max: std::env::var("RATE_MAX").ok().and_then(|v| v.parse().ok()).unwrap_or(7.0),
            humidity: std::env::var("HUMIDITY").ok().and_then(|v| v.parse().ok()).unwrap_or(70.0),
            rain: std::env::var("RAIN").ok().and_then(|v| v.parse().ok()).unwrap_or(5.0),
            humidity_yesterday: std::env::var("HUMIDITY_YESTERDAY").ok().and_then(|v| v.parse().ok()),
            rain_yesterday: std::env::var("RAIN_YESTERDAY").ok().and_then(|v| v.parse().ok()),
            run_diagnosis: std::env::var("RUN_DIAGNOSIS")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }

    pub fn paths(&self) -> Paths {
        Paths {
            dataset: PathBuf::from(&self.dataset_path),
            model: PathBuf::from(&self.model_path),
            config: PathBuf::from(&self.config_path),
        }
    }

    pub fn rate_in_band(&self, rate: f64) -> bool {
        rate.is_finite() && rate >= self.rate_min && rate <= self.rate_max
    }
}
