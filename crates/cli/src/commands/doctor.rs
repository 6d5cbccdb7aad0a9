use std::path::PathBuf;

use eshop_deals_core::config::{AppConfig, LoadOptions};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Warn,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool, config_path: Option<PathBuf>) -> String {
    let report = build_report(config_path);

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report(config_path: Option<PathBuf>) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions { config_path, ..LoadOptions::default() }) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_webhook(&config));
            checks.push(check_watchlist(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["webhook_readiness", "watchlist"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let failed = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let warned = checks.iter().any(|check| check.status == CheckStatus::Warn);
    let (overall_status, summary) = if failed {
        (CheckStatus::Fail, "doctor: one or more readiness checks failed")
    } else if warned {
        (CheckStatus::Warn, "doctor: ready, with warnings")
    } else {
        (CheckStatus::Pass, "doctor: all readiness checks passed")
    };

    DoctorReport { overall_status, summary: summary.to_string(), checks }
}

fn check_webhook(config: &AppConfig) -> DoctorCheck {
    match config.require_webhook_url() {
        Ok(_) => DoctorCheck {
            name: "webhook_readiness",
            status: CheckStatus::Pass,
            details: "webhook URL configured (https)".to_string(),
        },
        Err(error) => DoctorCheck {
            name: "webhook_readiness",
            status: CheckStatus::Fail,
            details: format!("{error}; only `run --dry-run` will work"),
        },
    }
}

fn check_watchlist(config: &AppConfig) -> DoctorCheck {
    let titles = &config.query.watchlist;
    if titles.is_empty() {
        DoctorCheck {
            name: "watchlist",
            status: CheckStatus::Warn,
            details: "query.watchlist is empty; `run` without a mode flag sends nothing"
                .to_string(),
        }
    } else {
        DoctorCheck {
            name: "watchlist",
            status: CheckStatus::Pass,
            details: format!("{} title(s) watched", titles.len()),
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
