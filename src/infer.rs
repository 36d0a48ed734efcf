//! Risk inference adapter.
//!
//! Runs only on an explicit trigger, never on every slider movement. The
//! label-to-verdict mapping mirrors the model's training encoding: 1 is
//! the adverse class.

use crate::model::{Classifier, FeatureRow, ModelError};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskVerdict {
    NormalOperation,
    HighInefficiencyRisk,
}

impl RiskVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskVerdict::NormalOperation => "normal operation",
            RiskVerdict::HighInefficiencyRisk => "high inefficiency risk",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            RiskVerdict::NormalOperation => {
                "favorable weather for grain loading and yard operations"
            }
            RiskVerdict::HighInefficiencyRisk => {
                "hold interior-to-port flow to avoid extra demurrage costs"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnosis {
    pub verdict: RiskVerdict,
    /// Max class probability, 0..=100.
    pub confidence_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InferError {
    InvalidInput(String),
    Model(ModelError),
}

impl fmt::Display for InferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferError::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
            InferError::Model(err) => write!(f, "model invocation failed: {}", err),
        }
    }
}

impl std::error::Error for InferError {}

impl From<ModelError> for InferError {
    fn from(err: ModelError) -> Self {
        InferError::Model(err)
    }
}

fn check_humidity(name: &str, value: f64) -> Result<(), InferError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(InferError::InvalidInput(format!(
            "{} must be within 0..=100, got {}",
            name, value
        )));
    }
    Ok(())
}

fn check_rain(name: &str, value: f64) -> Result<(), InferError> {
    // The UI caps the rain slider at 100 mm for display; the adapter only
    // rejects negatives and non-finite values.
    if !value.is_finite() || value < 0.0 {
        return Err(InferError::InvalidInput(format!(
            "{} must be non-negative, got {}",
            name, value
        )));
    }
    Ok(())
}

pub fn infer(
    humidity_today: f64,
    rain_today: f64,
    humidity_yesterday: f64,
    rain_yesterday: f64,
    model: &dyn Classifier,
) -> Result<Diagnosis, InferError> {
    check_humidity("umidade_relativa", humidity_today)?;
    check_rain("chuva", rain_today)?;
    check_humidity("umidade_ontem", humidity_yesterday)?;
    check_rain("chuva_ontem", rain_yesterday)?;

    let row = FeatureRow::assemble(
        humidity_today,
        rain_today,
        humidity_yesterday,
        rain_yesterday,
    );
    let label = model.classify(&row)?;
    let probs = model.score(&row)?;
    let confidence_pct = probs[0].max(probs[1]) * 100.0;

    let verdict = if label == 1 {
        RiskVerdict::HighInefficiencyRisk
    } else {
        RiskVerdict::NormalOperation
    };

    Ok(Diagnosis {
        verdict,
        confidence_pct,
    })
}
