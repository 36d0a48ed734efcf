use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

pub const EXPECTED_COLUMNS: [&str; 8] = [
    "data",
    "prejuizo_usd",
    "toneladas_perdidas",
    "umidade_relativa",
    "chuva",
    "VLPesoCargaBruta",
    "umidade_ontem",
    "chuva_ontem",
];

/// One calendar day of port/weather measurements.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub loss_usd: f64,
    pub tonnage_lost: f64,
    pub humidity: f64,
    pub rain: f64,
    pub gross_cargo_weight: f64,
    pub humidity_yesterday: f64,
    pub rain_yesterday: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaReport {
    pub columns: Vec<String>,
    pub expected: Vec<String>,
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetManifest {
    pub path: String,
    pub hash_sha256: String,
    pub row_count: u64,
    pub bad_rows: u64,
    pub date_min: Option<String>,
    pub date_max: Option<String>,
    pub months: Vec<String>,
    pub columns: Vec<String>,
    pub warnings: Vec<String>,
    pub generated_at_epoch: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataQualityReport {
    pub rows: u64,
    pub bad_rows: u64,
    pub out_of_band: u64,
    pub warnings: Vec<String>,
}

/// Strict date parsing: `YYYY-MM-DD` or epoch seconds, nothing coerced.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(secs) = trimmed.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| format!("epoch out of range: {}", trimmed));
    }
    Err(format!("unparsable date: {:?}", trimmed))
}

fn parse_field(parts: &[&str], idx: usize) -> Result<f64, String> {
    parts[idx]
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("bad {}: {}", EXPECTED_COLUMNS[idx], e))
}

pub fn parse_row(line: &str) -> Result<Observation, String> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() != EXPECTED_COLUMNS.len() {
        return Err(format!(
            "expected {} columns, got {}",
            EXPECTED_COLUMNS.len(),
            parts.len()
        ));
    }
    Ok(Observation {
        date: parse_date(parts[0])?,
        loss_usd: parse_field(&parts, 1)?,
        tonnage_lost: parse_field(&parts, 2)?,
        humidity: parse_field(&parts, 3)?,
        rain: parse_field(&parts, 4)?,
        gross_cargo_weight: parse_field(&parts, 5)?,
        humidity_yesterday: parse_field(&parts, 6)?,
        rain_yesterday: parse_field(&parts, 7)?,
    })
}

pub fn read_header(path: &Path) -> Result<Vec<String>, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    let reader = BufReader::new(file);
    for line in reader.lines() {
        let line = line.map_err(|e| e.to_string())?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        return Ok(trimmed.split(',').map(|s| s.trim().to_string()).collect());
    }
    Ok(Vec::new())
}

pub fn validate_schema(path: &Path) -> Result<SchemaReport, String> {
    let header = read_header(path)?;
    let expected = EXPECTED_COLUMNS
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>();
    let ok = header == expected;
    let message = if ok {
        "schema ok".to_string()
    } else if let Some(missing) = expected.iter().find(|c| !header.contains(c)) {
        format!("schema mismatch: missing column {:?}", missing)
    } else {
        format!("schema mismatch: got {:?} expected {:?}", header, expected)
    };
    Ok(SchemaReport {
        columns: header,
        expected,
        ok,
        message,
    })
}

/// Full strict read. Any malformed row aborts the load naming the line;
/// the dashboard cannot run on a partially parsed dataset.
pub fn load_dataset(path: &Path) -> Result<Vec<Observation>, String> {
    let schema = validate_schema(path)?;
    if !schema.ok {
        return Err(schema.message);
    }
    let file = File::open(path).map_err(|e| e.to_string())?;
    let reader = BufReader::new(file);

    let mut rows = Vec::new();
    let mut header_seen = false;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| e.to_string())?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if !header_seen {
            header_seen = true;
            continue;
        }
        let obs = parse_row(trimmed).map_err(|e| format!("line {}: {}", line_no + 1, e))?;
        rows.push(obs);
    }
    Ok(rows)
}

fn range_warnings(obs: &Observation) -> Vec<String> {
    let mut warnings = Vec::new();
    if !(0.0..=100.0).contains(&obs.humidity) {
        warnings.push(format!(
            "humidity_out_of_band: date={} value={}",
            obs.date, obs.humidity
        ));
    }
    if obs.rain < 0.0 {
        warnings.push(format!("negative_rain: date={} value={}", obs.date, obs.rain));
    }
    if obs.loss_usd < 0.0 {
        warnings.push(format!(
            "negative_loss_usd: date={} value={}",
            obs.date, obs.loss_usd
        ));
    }
    if obs.tonnage_lost < 0.0 {
        warnings.push(format!(
            "negative_tonnage: date={} value={}",
            obs.date, obs.tonnage_lost
        ));
    }
    warnings
}

/// Lenient pass over the raw file: counts bad rows instead of aborting,
/// collects out-of-band warnings, and fingerprints the file for audit.
pub fn analyze_dataset(
    path: &Path,
    now_ts: u64,
) -> Result<(DatasetManifest, DataQualityReport), String> {
    let hash = file_sha256(path)?;
    let file = File::open(path).map_err(|e| e.to_string())?;
    let reader = BufReader::new(file);

    let mut row_count = 0u64;
    let mut bad_rows = 0u64;
    let mut out_of_band = 0u64;
    let mut warnings = Vec::new();
    let mut date_min: Option<NaiveDate> = None;
    let mut date_max: Option<NaiveDate> = None;
    let mut prev_date: Option<NaiveDate> = None;
    let mut months: Vec<String> = Vec::new();
    let mut header: Vec<String> = Vec::new();
    let mut header_seen = false;

    for line in reader.lines() {
        let line = line.map_err(|e| e.to_string())?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if !header_seen {
            header_seen = true;
            header = trimmed.split(',').map(|s| s.trim().to_string()).collect();
            continue;
        }
        match parse_row(trimmed) {
            Ok(obs) => {
                row_count += 1;
                date_min = Some(date_min.map_or(obs.date, |d| d.min(obs.date)));
                date_max = Some(date_max.map_or(obs.date, |d| d.max(obs.date)));
                if let Some(prev) = prev_date {
                    if obs.date <= prev {
                        warnings.push(format!(
                            "non_monotonic_date: prev={} current={}",
                            prev, obs.date
                        ));
                    }
                }
                prev_date = Some(obs.date);
                let month = format!("{:04}-{:02}", obs.date.year(), obs.date.month());
                if !months.contains(&month) {
                    months.push(month);
                }
                let row_warnings = range_warnings(&obs);
                if !row_warnings.is_empty() {
                    out_of_band += 1;
                    warnings.extend(row_warnings);
                }
            }
            Err(err) => {
                bad_rows += 1;
                warnings.push(format!("bad_row: {}", err));
            }
        }
    }

    if header.is_empty() {
        warnings.push("missing_header".to_string());
    }

    let manifest = DatasetManifest {
        path: path.display().to_string(),
        hash_sha256: hash,
        row_count,
        bad_rows,
        date_min: date_min.map(|d| d.to_string()),
        date_max: date_max.map(|d| d.to_string()),
        months,
        columns: header,
        warnings: warnings.clone(),
        generated_at_epoch: now_ts,
    };

    let report = DataQualityReport {
        rows: row_count,
        bad_rows,
        out_of_band,
        warnings,
    };

    Ok((manifest, report))
}

pub fn file_sha256(path: &Path) -> Result<String, String> {
    let mut file = File::open(path).map_err(|e| e.to_string())?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf).map_err(|e| e.to_string())?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

pub fn default_manifest_path(dataset_path: &Path) -> PathBuf {
    let mut p = dataset_path.to_path_buf();
    let fname = dataset_path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset.csv");
    p.set_file_name(format!("{}.manifest.json", fname));
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_date() {
        assert_eq!(
            parse_date("2024-01-05").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
        );
    }

    #[test]
    fn parses_epoch_seconds() {
        // 2024-01-05T00:00:00Z
        assert_eq!(
            parse_date("1704412800").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
        );
    }

    #[test]
    fn rejects_garbage_date() {
        let err = parse_date("05/01/2024").unwrap_err();
        assert!(err.contains("unparsable date"), "{}", err);
    }

    #[test]
    fn parses_full_row() {
        let obs = parse_row("2024-01-05,1000.0,50,70,5.5,12000,68,3.2").unwrap();
        assert_eq!(obs.loss_usd, 1000.0);
        assert_eq!(obs.gross_cargo_weight, 12000.0);
        assert_eq!(obs.rain_yesterday, 3.2);
    }

    #[test]
    fn row_error_names_the_column() {
        let err = parse_row("2024-01-05,abc,50,70,5.5,12000,68,3.2").unwrap_err();
        assert!(err.contains("prejuizo_usd"), "{}", err);
    }

    #[test]
    fn row_rejects_wrong_width() {
        let err = parse_row("2024-01-05,1000.0,50").unwrap_err();
        assert!(err.contains("expected 8 columns"), "{}", err);
    }
}
