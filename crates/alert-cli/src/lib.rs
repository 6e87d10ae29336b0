//! Alert Normalization CLI
//!
//! Reads a raw alert payload (one object, or an array of objects) from a file
//! or stdin and prints the canonical records as JSON.

use anyhow::Context;
use clap::Parser;
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use alert_model::{Normalizer, NormalizerConfig, TracingSink};

/// Parsed command line
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    name = "alert-normalize",
    version,
    about = "Normalize raw alert payloads into canonical records"
)]
pub struct CliArgs {
    #[arg(
        long,
        short = 'c',
        value_name = "PATH",
        help = "Config file (default: alert-normalize.* in the working directory)"
    )]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Single-line output instead of indented JSON")]
    pub compact: bool,

    #[arg(value_name = "PAYLOAD", help = "Payload file; stdin when absent or `-`")]
    pub input: Option<PathBuf>,
}

impl CliArgs {
    /// Payload file to read, `None` meaning stdin
    pub fn payload_path(&self) -> Option<&Path> {
        self.input.as_deref().filter(|path| *path != Path::new("-"))
    }
}

/// Initialize logging on stderr; stdout is reserved for records
pub fn init_logging(level: &str) -> anyhow::Result<()> {
    let level: Level = level
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid log level {level:?}"))?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Read and decode the payload
pub fn read_payload(input: Option<&Path>) -> anyhow::Result<Value> {
    let text = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            buf
        }
    };

    serde_json::from_str(&text).context("payload is not valid JSON")
}

/// Normalize one payload or a batch and render the result
pub fn render(normalizer: &Normalizer, payload: Value, compact: bool) -> anyhow::Result<String> {
    let output = match payload {
        Value::Array(items) => {
            let count = items.len();
            let records = items
                .into_iter()
                .enumerate()
                .map(|(idx, item)| {
                    normalizer
                        .normalize_value(item)
                        .with_context(|| format!("payload #{idx}"))?
                        .to_json()
                        .map_err(anyhow::Error::from)
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            info!("Normalized {} alerts", count);
            Value::Array(records)
        }
        single => {
            let record = normalizer.normalize_value(single)?;
            info!(fingerprint = %record.fingerprint, status = %record.status, "Normalized alert");
            record.to_json()?
        }
    };

    let rendered = if compact {
        serde_json::to_string(&output)?
    } else {
        serde_json::to_string_pretty(&output)?
    };
    Ok(rendered)
}

/// Load configuration, start logging, and normalize the requested payload
pub fn run(args: &CliArgs) -> anyhow::Result<String> {
    let config = NormalizerConfig::load(args.config.as_deref()).context("loading configuration")?;
    init_logging(&config.log_level)?;

    info!("=== Alert Normalizer v{} ===", env!("CARGO_PKG_VERSION"));

    let normalizer = Normalizer::new(config, Arc::new(TracingSink));
    let payload = read_payload(args.payload_path())?;
    render(&normalizer, payload, args.compact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(list: &[&str]) -> Result<CliArgs, clap::Error> {
        CliArgs::try_parse_from(std::iter::once("alert-normalize").chain(list.iter().copied()))
    }

    #[test]
    fn test_parse_args() {
        let parsed = args(&["--config", "norm.toml", "--compact", "alert.json"]).unwrap();
        assert_eq!(parsed.config, Some(PathBuf::from("norm.toml")));
        assert_eq!(parsed.payload_path(), Some(Path::new("alert.json")));
        assert!(parsed.compact);

        let short = args(&["-c", "norm.toml"]).unwrap();
        assert_eq!(short.config, Some(PathBuf::from("norm.toml")));
        assert!(!short.compact);

        assert_eq!(args(&["-"]).unwrap().payload_path(), None);
        assert_eq!(args(&[]).unwrap().payload_path(), None);
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(args(&["--config"]).is_err());
        assert!(args(&["--verbose"]).is_err());
        assert!(args(&["a.json", "b.json"]).is_err());

        let help = args(&["--help"]).unwrap_err();
        assert_eq!(help.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_render_single() {
        let normalizer = Normalizer::default();
        let out = render(
            &normalizer,
            json!({"id": "1", "name": "Disk full", "severity": 5}),
            true,
        )
        .unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["severity"], json!("critical"));
        assert_eq!(value["status"], json!("firing"));
        assert!(!out.contains('\n'));
    }

    #[test]
    fn test_render_batch_reports_failing_index() {
        let normalizer = Normalizer::default();
        let ok = render(
            &normalizer,
            json!([{"id": "1", "name": "a"}, {"id": "2", "name": "b"}]),
            false,
        )
        .unwrap();
        let value: Value = serde_json::from_str(&ok).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);

        let err = render(&normalizer, json!([{"id": "1", "name": "a"}, {"id": "2"}]), false)
            .unwrap_err();
        assert!(format!("{err:#}").contains("payload #1"));
    }

    #[test]
    fn test_read_payload_from_file() {
        let path = std::env::temp_dir().join(format!("alert-cli-test-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"id": "9", "name": "from file"}"#).unwrap();
        let payload = read_payload(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(payload["name"], json!("from file"));
    }

    #[test]
    fn test_bad_log_level_rejected() {
        assert!(init_logging("chatty").is_err());
    }
}
