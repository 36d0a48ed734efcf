//! Chart-ready series and KPI formatting.
//!
//! Rendering is external; this module only shapes the tabular inputs the
//! charting side consumes and formats the three KPI strings.

use crate::data::Observation;
use crate::metrics::DerivedMetrics;
use serde::Serialize;

/// One bar of the monthly loss chart.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyBar {
    /// First day of the month, `YYYY-MM-DD`.
    pub month: String,
    pub loss_local: f64,
}

/// One point of the humidity vs. cargo-weight scatter: colored by rain,
/// sized by loss.
#[derive(Debug, Clone, Serialize)]
pub struct ScatterPoint {
    pub humidity: f64,
    pub gross_cargo_weight: f64,
    pub rain: f64,
    pub loss_usd: f64,
}

pub fn monthly_bars(metrics: &DerivedMetrics) -> Vec<MonthlyBar> {
    metrics
        .monthly
        .iter()
        .map(|m| MonthlyBar {
            month: m.month.to_string(),
            loss_local: m.loss_local,
        })
        .collect()
}

pub fn scatter_points(rows: &[Observation]) -> Vec<ScatterPoint> {
    rows.iter()
        .map(|obs| ScatterPoint {
            humidity: obs.humidity,
            gross_cargo_weight: obs.gross_cargo_weight,
            rain: obs.rain,
            loss_usd: obs.loss_usd,
        })
        .collect()
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let offset = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - offset) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn format_amount(value: f64, decimals: usize) -> String {
    let negative = value < 0.0;
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (fixed, None),
    };
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(&int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(&frac);
    }
    out
}

pub fn format_usd(value: f64) -> String {
    format!("US$ {}", format_amount(value, 2))
}

pub fn format_brl(value: f64) -> String {
    format!("R$ {}", format_amount(value, 2))
}

pub fn format_tonnage(value: f64) -> String {
    format!("{} t", format_amount(value, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::derive;
    use chrono::NaiveDate;

    fn obs(date: &str, loss_usd: f64) -> Observation {
        Observation {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            loss_usd,
            tonnage_lost: 10.0,
            humidity: 70.0,
            rain: 5.0,
            gross_cargo_weight: 12000.0,
            humidity_yesterday: 68.0,
            rain_yesterday: 3.0,
        }
    }

    #[test]
    fn formats_kpi_strings() {
        assert_eq!(format_usd(1234567.891), "US$ 1,234,567.89");
        assert_eq!(format_brl(0.5), "R$ 0.50");
        assert_eq!(format_tonnage(1234.4), "1,234 t");
        assert_eq!(format_usd(-42.0), "US$ -42.00");
        assert_eq!(format_tonnage(999.0), "999 t");
    }

    #[test]
    fn monthly_bars_follow_the_aggregation() {
        let rows = vec![obs("2024-01-05", 1000.0), obs("2024-02-10", 2000.0)];
        let metrics = derive(&rows, 5.0).unwrap();
        let bars = monthly_bars(&metrics);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].month, "2024-01-01");
        assert_eq!(bars[0].loss_local, 5000.0);
        assert_eq!(bars[1].month, "2024-02-01");
        assert_eq!(bars[1].loss_local, 10000.0);
    }

    #[test]
    fn scatter_takes_one_point_per_row() {
        let rows = vec![obs("2024-01-05", 1000.0), obs("2024-01-06", 500.0)];
        let points = scatter_points(&rows);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].humidity, 70.0);
        assert_eq!(points[1].loss_usd, 500.0);
    }
}
