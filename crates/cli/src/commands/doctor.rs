use std::path::Path;

use bookworm_core::config::{AppConfig, LoadOptions};
use bookworm_feed::{BookFeed, FeedError};
use serde::Serialize;

use crate::commands::{build_loader, current_thread_runtime, CommandResult, EXIT_CONFIG, EXIT_FEED};

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

pub fn run(options: &LoadOptions, json_output: bool, feed_file: Option<&Path>) -> CommandResult {
    let (report, exit_code) = build_report(options, feed_file);

    if json_output {
        let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
        return CommandResult::raw(exit_code, output);
    }

    CommandResult::raw(exit_code, render_human(&report))
}

fn build_report(options: &LoadOptions, feed_file: Option<&Path>) -> (DoctorReport, u8) {
    let mut checks = Vec::new();
    let mut exit_code = 0;

    match AppConfig::load(options.clone()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            let credentials = check_credentials(&config, feed_file);
            if credentials.status == CheckStatus::Fail {
                exit_code = EXIT_CONFIG;
            }
            checks.push(credentials);

            let feed_check = check_feed(&config, feed_file);
            if feed_check.status == CheckStatus::Fail {
                exit_code = EXIT_FEED;
            }
            checks.push(feed_check);
        }
        Err(error) => {
            exit_code = EXIT_CONFIG;
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(skipped("feed_credentials"));
            checks.push(skipped("feed_reachability"));
        }
    }

    let all_pass = checks.iter().all(|check| check.status != CheckStatus::Fail);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    (DoctorReport { overall_status, summary, checks }, exit_code)
}

fn skipped(name: &'static str) -> DoctorCheck {
    DoctorCheck {
        name,
        status: CheckStatus::Skipped,
        details: "skipped because configuration did not load".to_string(),
    }
}

fn check_credentials(config: &AppConfig, feed_file: Option<&Path>) -> DoctorCheck {
    if feed_file.is_some() {
        return DoctorCheck {
            name: "feed_credentials",
            status: CheckStatus::Skipped,
            details: "reading a local feed file; no api key needed".to_string(),
        };
    }

    if config.feed.has_api_key() {
        DoctorCheck {
            name: "feed_credentials",
            status: CheckStatus::Pass,
            details: "api key configured".to_string(),
        }
    } else {
        DoctorCheck {
            name: "feed_credentials",
            status: CheckStatus::Fail,
            details: "feed.api_key is not set; export BOOKWORM_FEED_API_KEY or add it to bookworm.toml"
                .to_string(),
        }
    }
}

fn check_feed(config: &AppConfig, feed_file: Option<&Path>) -> DoctorCheck {
    let runtime = match current_thread_runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "feed_reachability",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    let result = runtime.block_on(async {
        match build_loader(config, feed_file).await {
            Ok(mut loader) => {
                let source = loader.feed().describe();
                loader.try_load().await.map(|catalog| (source, catalog.len()))
            }
            Err(error) => Err(FeedError::Unavailable(format!("{error:#}"))),
        }
    });

    match result {
        Ok((source, item_count)) => DoctorCheck {
            name: "feed_reachability",
            status: CheckStatus::Pass,
            details: format!("{item_count} book(s) from `{source}`"),
        },
        Err(error) => DoctorCheck {
            name: "feed_reachability",
            status: CheckStatus::Fail,
            details: format!("{} ({})", error, error.class()),
        },
    }
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
