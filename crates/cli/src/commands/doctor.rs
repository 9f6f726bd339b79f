use faqbot_core::config::{AppConfig, LoadOptions};
use faqbot_db::{connect_with_settings, TRAINING_TABLE};
use serde::Serialize;

use crate::commands::{current_thread_runtime, CommandResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
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

const CHECK_NAMES: [&str; 2] = ["config_validation", "training_store"];

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: CHECK_NAMES[0],
                status: CheckStatus::Pass,
                details: format!(
                    "slack credentials set, replies via {}; llm model `{}` at {}",
                    config.slack.api_base_url, config.llm.model, config.llm.base_url
                ),
            });
            checks.push(check_training_store(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: CHECK_NAMES[0],
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in CHECK_NAMES.iter().skip(1).copied() {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_training_store(config: &AppConfig) -> DoctorCheck {
    let runtime = match current_thread_runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck { name: CHECK_NAMES[1], status: CheckStatus::Fail, details: error };
        }
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

        let (table_count,): (i64,) = training_table_count(&pool).await?;
        pool.close().await;
        Ok::<bool, String>(table_count == 1)
    });

    match result {
        Ok(true) => DoctorCheck {
            name: CHECK_NAMES[1],
            status: CheckStatus::Pass,
            details: format!("connected using `{}`; `{TRAINING_TABLE}` present", config.database.url),
        },
        Ok(false) => DoctorCheck {
            name: CHECK_NAMES[1],
            status: CheckStatus::Fail,
            details: format!("`{TRAINING_TABLE}` is missing; run `faqbot migrate`"),
        },
        Err(error) => DoctorCheck { name: CHECK_NAMES[1], status: CheckStatus::Fail, details: error },
    }
}

async fn training_table_count(pool: &faqbot_db::DbPool) -> Result<(i64,), String> {
    sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
        .bind(TRAINING_TABLE)
        .fetch_one(pool)
        .await
        .map_err(|error| format!("failed to inspect schema: {error}"))
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
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
