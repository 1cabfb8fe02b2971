use crate::{
    api::{HttpApi, ValidateApi},
    config::Config,
    session::{Session, StderrNotifier},
    util::ensure_dir,
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "safedoc")]
#[command(about = "CLI client for the SafeDoc text validation and anonymization API")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./safedoc.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Health-check the remote API.
    Doctor {},
    /// Submit free text for validation.
    Text {
        /// Inline text to validate.
        #[arg(long, conflicts_with = "input")]
        text: Option<String>,
        /// Read the text to validate from a file.
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Submit a CSV file for batch validation.
    Csv {
        #[arg(long)]
        input: PathBuf,
    },
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg_path = resolve_config_path(args.config.as_deref())?;
    let cfg = Config::load(&cfg_path)?;
    let log_path = resolve_log_path(&cfg);
    let _guard = init_logging(&args, &cfg, log_path.as_deref())?;

    match &args.cmd {
        Command::Doctor {} => doctor(&cfg),
        Command::Text { text, input } => run_text(&cfg, text.as_deref(), input.as_deref()),
        Command::Csv { input } => run_csv(&cfg, input),
    }
}

fn resolve_config_path(user: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = user {
        return Ok(p.to_path_buf());
    }
    let default = PathBuf::from("safedoc.toml");
    if default.exists() {
        Ok(default)
    } else {
        Ok(PathBuf::from("safedoc.example.toml"))
    }
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }

    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }

    Some(PathBuf::from(&cfg.output.dir).join("safedoc.log"))
}

fn doctor(cfg: &Config) -> Result<()> {
    let api = HttpApi::new(cfg)?;
    let health = api.health()?;
    println!("{}", serde_json::to_string_pretty(&health)?);
    Ok(())
}

fn run_text(cfg: &Config, text: Option<&str>, input: Option<&Path>) -> Result<()> {
    let text = match (text, input) {
        (Some(t), _) => t.to_string(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        (None, None) => return Err(anyhow!("provide --text or --input")),
    };

    if text.trim().is_empty() {
        info!("empty text; nothing submitted");
        return Ok(());
    }

    let api = HttpApi::new(cfg)?;
    let mut session = Session::new(cfg, api, StderrNotifier);
    session.submit_text(&text);

    let Some(res) = session.text.populated() else {
        return Err(anyhow!("text validation did not complete"));
    };
    println!("{}", serde_json::to_string_pretty(res)?);

    if cfg.output.latest_only {
        report_saved(session.download_latest()?);
        return Ok(());
    }
    if cfg.output.save_plain_text {
        report_saved(session.download_text_plain()?);
    }
    if cfg.output.save_json {
        report_saved(session.download_text_json()?);
    }
    Ok(())
}

fn run_csv(cfg: &Config, input: &Path) -> Result<()> {
    let api = HttpApi::new(cfg)?;
    let mut session = Session::new(cfg, api, StderrNotifier);
    session.select_file(&[input.to_path_buf()]);
    session.submit_file();

    let Some(res) = session.batch.populated() else {
        return Err(anyhow!("csv validation did not complete"));
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "total": res.total,
            "rows": res.rows.len(),
        }))?
    );

    if cfg.output.latest_only {
        report_saved(session.download_latest()?);
        return Ok(());
    }
    if cfg.output.save_csv {
        report_saved(session.download_batch_csv()?);
    }
    if cfg.output.save_json {
        report_saved(session.download_batch_json()?);
    }
    Ok(())
}

fn report_saved(path: Option<PathBuf>) {
    if let Some(p) = path {
        println!("saved {}", p.display());
    }
}
