use anyhow::{anyhow, Result};
use portorisk::assets::SessionAssets;
use portorisk::charts;
use portorisk::infer::{self, InferError};
use portorisk::logging::{json_log, log, obj, v_bool, v_num, v_str, Domain, Level};
use portorisk::metrics;
use portorisk::session::Config;

fn main() -> Result<()> {
    let cfg = Config::from_env();
    let paths = cfg.paths();
    let assets = SessionAssets::cached(&paths)?;

    json_log(
        "session",
        obj(&[
            ("status", v_str("assets_ready")),
            ("rows", v_num(assets.dataset.len() as f64)),
            ("parametros_atualizados", v_str(&assets.config.data_atualizacao)),
        ]),
    );

    let rate = cfg.exchange_rate.unwrap_or(assets.config.ultima_cotacao);
    if !cfg.rate_in_band(rate) {
        // Inline invalid-input report; the financial pass is skipped, the
        // session keeps going.
        log(
            Level::Warn,
            Domain::Metrics,
            "invalid_input",
            obj(&[
                ("control", v_str("exchange_rate")),
                ("value", v_num(rate)),
                ("min", v_num(cfg.rate_min)),
                ("max", v_num(cfg.rate_max)),
            ]),
        );
    } else {
        let derived = metrics::derive(&assets.dataset, rate).map_err(anyhow::Error::msg)?;
        json_log(
            "kpi",
            obj(&[
                ("total_usd", v_num(derived.total_usd)),
                ("total_brl", v_num(derived.total_local)),
                ("total_tonnage", v_num(derived.total_tonnage)),
                ("exchange_rate", v_num(rate)),
                ("total_usd_display", v_str(&charts::format_usd(derived.total_usd))),
                ("total_brl_display", v_str(&charts::format_brl(derived.total_local))),
                ("tonnage_display", v_str(&charts::format_tonnage(derived.total_tonnage))),
            ]),
        );
        json_log(
            "chart",
            obj(&[
                ("kind", v_str("monthly_loss_bars")),
                ("series", serde_json::to_value(charts::monthly_bars(&derived))?),
            ]),
        );
        json_log(
            "chart",
            obj(&[
                ("kind", v_str("humidity_cargo_scatter")),
                ("series", serde_json::to_value(charts::scatter_points(&assets.dataset))?),
            ]),
        );
    }

    if cfg.run_diagnosis {
        let humidity_yesterday = cfg.humidity_yesterday.unwrap_or(cfg.humidity);
        let rain_yesterday = cfg.rain_yesterday.unwrap_or(cfg.rain);
        match infer::infer(
            cfg.humidity,
            cfg.rain,
            humidity_yesterday,
            rain_yesterday,
            assets.model.as_ref(),
        ) {
            Ok(diagnosis) => {
                json_log(
                    "diagnosis",
                    obj(&[
                        ("verdict", v_str(diagnosis.verdict.as_str())),
                        ("confidence_pct", v_num(diagnosis.confidence_pct)),
                        ("recommendation", v_str(diagnosis.verdict.recommendation())),
                        ("high_risk", v_bool(matches!(
                            diagnosis.verdict,
                            portorisk::infer::RiskVerdict::HighInefficiencyRisk
                        ))),
                    ]),
                );
            }
            Err(InferError::InvalidInput(msg)) => {
                log(
                    Level::Warn,
                    Domain::Inference,
                    "invalid_input",
                    obj(&[("detail", v_str(&msg))]),
                );
            }
            Err(err @ InferError::Model(_)) => {
                log(
                    Level::Error,
                    Domain::Inference,
                    "inference_failed",
                    obj(&[("detail", v_str(&err.to_string()))]),
                );
                return Err(anyhow!(err));
            }
        }
    }

    Ok(())
}
