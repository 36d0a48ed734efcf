//! Classifier capability boundary.
//!
//! The rest of the crate sees only the two-operation `Classifier` trait;
//! the concrete artifact format stays behind the loader. The feature
//! column order is the model's training-time schema and is enforced
//! positionally, not by convention.

use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Training-time feature schema, in order.
pub const FEATURE_COLUMNS: [&str; 4] =
    ["umidade_relativa", "chuva", "umidade_ontem", "chuva_ontem"];

/// Single-row, order-sensitive feature record.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub columns: [&'static str; 4],
    pub values: [f64; 4],
}

impl FeatureRow {
    /// The only sanctioned constructor: pins the column order to the
    /// training schema {humidity_today, rain_today, humidity_yesterday,
    /// rain_yesterday}.
    pub fn assemble(
        humidity_today: f64,
        rain_today: f64,
        humidity_yesterday: f64,
        rain_yesterday: f64,
    ) -> Self {
        Self {
            columns: FEATURE_COLUMNS,
            values: [humidity_today, rain_today, humidity_yesterday, rain_yesterday],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Feature record does not match the training schema at `position`.
    SchemaMismatch {
        position: usize,
        expected: String,
        got: String,
    },
    BadArtifact(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::SchemaMismatch {
                position,
                expected,
                got,
            } => write!(
                f,
                "feature schema mismatch at position {}: expected {:?}, got {:?}",
                position, expected, got
            ),
            ModelError::BadArtifact(msg) => write!(f, "bad model artifact: {}", msg),
        }
    }
}

impl std::error::Error for ModelError {}

/// The narrow capability set the dashboard consumes: a binary label and a
/// probability vector over {0, 1}. Implementations own nothing else.
pub trait Classifier: Send + Sync {
    fn classify(&self, row: &FeatureRow) -> Result<u8, ModelError>;
    fn score(&self, row: &FeatureRow) -> Result<[f64; 2], ModelError>;
}

/// Pre-trained logistic classifier deserialized from a JSON artifact.
#[derive(Debug, Clone, Deserialize)]
pub struct LogisticModel {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticModel {
    pub fn load(path: &Path) -> Result<Self, String> {
        let file = File::open(path).map_err(|e| e.to_string())?;
        let model: LogisticModel =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| e.to_string())?;
        if model.feature_names.len() != model.coefficients.len() {
            return Err(format!(
                "artifact has {} feature names but {} coefficients",
                model.feature_names.len(),
                model.coefficients.len()
            ));
        }
        Ok(model)
    }

    fn check_schema(&self, row: &FeatureRow) -> Result<(), ModelError> {
        if row.columns.len() != self.feature_names.len() {
            return Err(ModelError::BadArtifact(format!(
                "model expects {} features, row has {}",
                self.feature_names.len(),
                row.columns.len()
            )));
        }
        for (position, (expected, got)) in
            self.feature_names.iter().zip(row.columns.iter()).enumerate()
        {
            if expected != got {
                return Err(ModelError::SchemaMismatch {
                    position,
                    expected: expected.clone(),
                    got: got.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Classifier for LogisticModel {
    fn classify(&self, row: &FeatureRow) -> Result<u8, ModelError> {
        let [_, p1] = self.score(row)?;
        Ok(if p1 >= 0.5 { 1 } else { 0 })
    }

    fn score(&self, row: &FeatureRow) -> Result<[f64; 2], ModelError> {
        self.check_schema(row)?;
        let z: f64 = self.intercept
            + self
                .coefficients
                .iter()
                .zip(row.values.iter())
                .map(|(c, v)| c * v)
                .sum::<f64>();
        let p1 = 1.0 / (1.0 + (-z).exp());
        Ok([1.0 - p1, p1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rain_model() -> LogisticModel {
        // Heavy rain today or yesterday pushes toward label 1.
        LogisticModel {
            feature_names: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            coefficients: vec![0.02, 0.3, 0.01, 0.15],
            intercept: -6.0,
        }
    }

    #[test]
    fn score_is_a_probability_vector() {
        let model = rain_model();
        let row = FeatureRow::assemble(70.0, 5.0, 70.0, 5.0);
        let [p0, p1] = model.score(&row).unwrap();
        assert!((p0 + p1 - 1.0).abs() < 1e-12);
        assert!((0.0..=1.0).contains(&p1));
    }

    #[test]
    fn heavy_rain_classifies_high_risk() {
        let model = rain_model();
        let wet = FeatureRow::assemble(95.0, 40.0, 90.0, 30.0);
        let dry = FeatureRow::assemble(50.0, 0.0, 55.0, 0.0);
        assert_eq!(model.classify(&wet).unwrap(), 1);
        assert_eq!(model.classify(&dry).unwrap(), 0);
    }

    #[test]
    fn swapped_columns_are_rejected() {
        let model = rain_model();
        let mut row = FeatureRow::assemble(70.0, 5.0, 70.0, 5.0);
        row.columns.swap(0, 1);
        row.values.swap(0, 1);
        let err = model.score(&row).unwrap_err();
        assert!(matches!(err, ModelError::SchemaMismatch { position: 0, .. }));
    }

    #[test]
    fn order_changes_the_score_for_order_sensitive_inputs() {
        // Same four numbers, different positions: must not produce the
        // same probability once the schema check is bypassed by renaming.
        let model = rain_model();
        let canonical = FeatureRow::assemble(70.0, 5.0, 60.0, 2.0);
        let shuffled = FeatureRow {
            columns: FEATURE_COLUMNS,
            values: [5.0, 70.0, 2.0, 60.0],
        };
        let [_, p_canonical] = model.score(&canonical).unwrap();
        let [_, p_shuffled] = model.score(&shuffled).unwrap();
        assert!((p_canonical - p_shuffled).abs() > 1e-9);
    }

    #[test]
    fn load_rejects_coefficient_count_mismatch() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(
            &path,
            r#"{"feature_names":["umidade_relativa","chuva"],"coefficients":[0.1],"intercept":0.0}"#,
        )
        .unwrap();
        let err = LogisticModel::load(&path).unwrap_err();
        assert!(err.contains("coefficients"), "{}", err);
    }
}
