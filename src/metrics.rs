//! Derived financial metrics.
//!
//! One pass over the cached dataset per user interaction. The dataset is
//! never mutated; the derived local-currency column lives on the output.

use crate::data::Observation;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyLoss {
    /// First day of the calendar month.
    pub month: NaiveDate,
    pub loss_local: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedMetrics {
    /// Per-row `loss_usd * rate`, index-aligned with the input rows.
    pub loss_local: Vec<f64>,
    pub total_usd: f64,
    pub total_local: f64,
    pub total_tonnage: f64,
    /// Chronological, one entry per month with at least one observation.
    pub monthly: Vec<MonthlyLoss>,
}

/// Pure derivation at a single constant exchange rate. The per-row
/// multiply-then-sum keeps `total_local == total_usd * rate` exact as long
/// as the rate does not vary within a pass.
pub fn derive(rows: &[Observation], exchange_rate: f64) -> Result<DerivedMetrics, String> {
    if !exchange_rate.is_finite() || exchange_rate <= 0.0 {
        return Err(format!(
            "invalid exchange rate {}: must be positive and finite",
            exchange_rate
        ));
    }

    let mut loss_local = Vec::with_capacity(rows.len());
    let mut total_usd = 0.0;
    let mut total_local = 0.0;
    let mut total_tonnage = 0.0;
    let mut by_month: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for row in rows {
        let local = row.loss_usd * exchange_rate;
        loss_local.push(local);
        total_usd += row.loss_usd;
        total_local += local;
        total_tonnage += row.tonnage_lost;

        let month = row
            .date
            .with_day(1)
            .ok_or_else(|| format!("invalid date in dataset: {}", row.date))?;
        *by_month.entry(month).or_insert(0.0) += local;
    }

    let monthly = by_month
        .into_iter()
        .map(|(month, loss_local)| MonthlyLoss { month, loss_local })
        .collect();

    Ok(DerivedMetrics {
        loss_local,
        total_usd,
        total_local,
        total_tonnage,
        monthly,
    })
}
