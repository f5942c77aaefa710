use anyhow::Context;
use filesdk::BatchDeleteReport;
use serde::Serialize;

/// Initialize tracing for the CLI. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("filesdk=info,filesdk_cli=info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

/// Printable view of a batch delete.
#[derive(Debug, Serialize, PartialEq)]
pub struct DeleteSummary {
    pub deleted: Vec<String>,
    pub archived: Vec<String>,
    pub failed: Vec<FailedDelete>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct FailedDelete {
    pub id: String,
    pub code: &'static str,
    pub error: String,
}

impl From<BatchDeleteReport> for DeleteSummary {
    fn from(report: BatchDeleteReport) -> Self {
        Self {
            deleted: report.deleted,
            archived: report.archived,
            failed: report
                .failed
                .into_iter()
                .map(|f| FailedDelete {
                    code: f.error.error_code(),
                    error: f.error.to_string(),
                    id: f.id,
                })
                .collect(),
        }
    }
}
