use portorisk::assets::{Paths, SessionAssets};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const MODEL_JSON: &str = r#"{
  "feature_names": ["umidade_relativa", "chuva", "umidade_ontem", "chuva_ontem"],
  "coefficients": [0.02, 0.3, 0.01, 0.15],
  "intercept": -6.0
}"#;

const CONFIG_JSON: &str = r#"{
  "ultima_cotacao": 5.25,
  "data_atualizacao": "2024-03-01 14:30"
}"#;

fn write_dataset(path: &Path) {
    let csv = "\
data,prejuizo_usd,toneladas_perdidas,umidade_relativa,chuva,VLPesoCargaBruta,umidade_ontem,chuva_ontem
2024-01-05,1000.0,50,70,5.5,12000,68,3.2
2024-02-10,2000.0,30,85,22.0,9500,80,18.0
";
    fs::write(path, csv).unwrap();
}

fn write_assets(dir: &Path) -> Paths {
    let paths = Paths {
        dataset: dir.join("final_santos_data_lake.csv"),
        model: dir.join("modelo_porto.json"),
        config: dir.join("config_projeto.json"),
    };
    write_dataset(&paths.dataset);
    fs::write(&paths.model, MODEL_JSON).unwrap();
    fs::write(&paths.config, CONFIG_JSON).unwrap();
    paths
}

#[test]
fn loads_all_three_assets() {
    let dir = TempDir::new().unwrap();
    let paths = write_assets(dir.path());
    let assets = SessionAssets::load(&paths).unwrap();
    assert_eq!(assets.dataset.len(), 2);
    assert_eq!(assets.config.ultima_cotacao, 5.25);
    assert_eq!(assets.config.data_atualizacao, "2024-03-01 14:30");
}

#[test]
fn missing_model_error_names_the_resource() {
    let dir = TempDir::new().unwrap();
    let mut paths = write_assets(dir.path());
    paths.model = dir.path().join("nonexistent_model.json");
    let err = SessionAssets::load(&paths).unwrap_err();
    assert!(
        format!("{:#}", err).contains("nonexistent_model.json"),
        "{:#}",
        err
    );
}

#[test]
fn malformed_config_error_names_the_resource() {
    let dir = TempDir::new().unwrap();
    let paths = write_assets(dir.path());
    fs::write(&paths.config, "{not json").unwrap();
    let err = SessionAssets::load(&paths).unwrap_err();
    assert!(
        format!("{:#}", err).contains("config_projeto.json"),
        "{:#}",
        err
    );
}

#[test]
fn malformed_dataset_error_names_the_resource() {
    let dir = TempDir::new().unwrap();
    let paths = write_assets(dir.path());
    fs::write(&paths.dataset, "data,prejuizo_usd\n2024-01-05,1\n").unwrap();
    let err = SessionAssets::load(&paths).unwrap_err();
    let msg = format!("{:#}", err);
    assert!(msg.contains("final_santos_data_lake.csv"), "{}", msg);
    assert!(msg.contains("schema mismatch"), "{}", msg);
}

#[test]
fn cached_returns_the_identical_triple() {
    // Touches the process-wide cache, so it stays in its own test binary
    // section; other tests here use load() directly.
    let dir = TempDir::new().unwrap();
    let paths = write_assets(dir.path());
    let first = SessionAssets::cached(&paths).unwrap();
    let second = SessionAssets::cached(&paths).unwrap();
    assert!(std::ptr::eq(first, second));
    assert_eq!(first.dataset.len(), 2);
}
