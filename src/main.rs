use anyhow::Context;
use clap::Parser;
use coderunner_lib::config::ConfigError;
use coderunner_lib::{
    detect, execute, Controller, Judge0Client, Language, LineKind, Phase, RunnerConfig, Transcript,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "coderunner",
    version,
    about = "Run a program on a Judge0 sandbox, asking for its input like a terminal would"
)]
struct Args {
    /// Source file to run
    file: PathBuf,

    /// Language (c, cpp, java, python, js); inferred from the file extension if omitted
    #[arg(short, long)]
    language: Option<String>,

    /// Judge0 language id, overriding the language's default id
    #[arg(long)]
    language_id: Option<u32>,

    /// TOML config file; the CODERUNNER_* environment is used otherwise
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sandbox base URL
    #[arg(long)]
    sandbox_url: Option<String>,

    /// API key sent with every request
    #[arg(long)]
    api_key: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Print the detected input groups as JSON and exit
    #[arg(long)]
    detect_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let filter = EnvFilter::try_from_env("CODERUNNER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let source = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let language_id = resolve_language_id(&args, &args.file)?;
    debug!(language_id, "resolved language");

    if args.detect_only {
        let groups = detect(&source, language_id);
        println!("{}", serde_json::to_string_pretty(&groups)?);
        return Ok(ExitCode::SUCCESS);
    }

    let client = Judge0Client::new(load_config(&args)?)?;
    let mut controller = Controller::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let mut job = controller.run(&source, language_id);
    let mut shown = render(controller.transcript(), 0);

    while job.is_none() && matches!(controller.phase(), Phase::Collecting(_)) {
        match lines.next_line().await? {
            Some(line) => job = controller.submit_line(&line),
            None => {
                info!("stdin closed before every value was given");
                controller.stop();
            }
        }
        shown = render(controller.transcript(), shown);
    }

    if let Some(job) = job {
        let cancel = job.cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });

        let (run_id, outcome) = execute(&job, &client).await;
        controller.finish(run_id, outcome);
        render(controller.transcript(), shown);
    }

    let failed = controller.phase() != Phase::Done
        || controller
            .transcript()
            .lines()
            .iter()
            .any(|line| line.kind == LineKind::Error);
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn resolve_language_id(args: &Args, path: &Path) -> anyhow::Result<u32> {
    if let Some(id) = args.language_id {
        return Ok(id);
    }
    let language = match &args.language {
        Some(name) => Language::from_name(name).with_context(|| format!("unknown language: {}", name))?,
        None => path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Language::from_extension)
            .with_context(|| {
                format!("cannot infer the language of {}; pass --language", path.display())
            })?,
    };
    Ok(language.default_judge0_id())
}

fn load_config(args: &Args) -> anyhow::Result<RunnerConfig> {
    let mut config = match (&args.config, &args.sandbox_url) {
        (Some(path), _) => RunnerConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        (None, Some(url)) => match RunnerConfig::from_env() {
            Err(ConfigError::MissingVar(_)) => RunnerConfig::new(url.clone()),
            other => other?,
        },
        (None, None) => RunnerConfig::from_env()?,
    };

    if let Some(url) = &args.sandbox_url {
        config.sandbox_url = url.clone();
    }
    if let Some(key) = &args.api_key {
        config.api_key = Some(key.clone());
    }
    if let Some(timeout) = args.timeout {
        config.request_timeout_secs = Some(timeout);
    }
    config.validate()?;
    Ok(config)
}

/// Prints transcript lines from `from` on and returns the new count. Input
/// lines are skipped since the terminal already echoed them.
fn render(transcript: &Transcript, from: usize) -> usize {
    render_to(&mut std::io::stdout().lock(), &mut std::io::stderr(), transcript, from)
}

fn render_to(out: &mut impl Write, err: &mut impl Write, transcript: &Transcript, from: usize) -> usize {
    for line in transcript.since(from) {
        let written = match line.kind {
            LineKind::Input => Ok(()),
            LineKind::Prompt => write!(out, "{}", line.text),
            LineKind::Output => writeln!(out, "{}", line.text),
            LineKind::Error => writeln!(err, "{}", line.text),
            LineKind::Notice => writeln!(out, "! {}", line.text),
            LineKind::Meta => writeln!(out, "[{}]", line.text),
        };
        if let Err(e) = written {
            warn!(error = %e, kind = ?line.kind, "failed to write transcript line");
        }
    }
    if let Err(e) = out.flush() {
        warn!(error = %e, "failed to flush stdout");
    }
    transcript.len()
}
