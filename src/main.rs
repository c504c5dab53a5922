use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use mirror_translator::core::{CorruptDisposition, MirrorOptions};
use mirror_translator::orchestrator::Orchestrator;
use mirror_translator::translation::config::TranslationConfig;
use mirror_translator::translation::gateway::{DeeplxBackend, Gateway, RetryPolicy};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DispositionArg {
    /// Leave corrupt pages in place
    Skip,
    /// Rename corrupt pages to <name>.html.corrupt
    MoveAside,
    /// Delete corrupt pages from the mirror
    Delete,
}

impl From<DispositionArg> for CorruptDisposition {
    fn from(arg: DispositionArg) -> Self {
        match arg {
            DispositionArg::Skip => CorruptDisposition::Skip,
            DispositionArg::MoveAside => CorruptDisposition::MoveAside,
            DispositionArg::Delete => CorruptDisposition::Delete,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "mirror-translator",
    version,
    about = "Translate a locally mirrored website tree from one language to another"
)]
struct Cli {
    /// Root directory of the mirrored site
    input_root: PathBuf,

    /// Write translated pages under this directory instead of in place
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Source language code
    #[arg(long, default_value = "en")]
    from: String,

    /// Target language code
    #[arg(long, default_value = "hi")]
    to: String,

    /// Translation API endpoint
    #[arg(long)]
    api_url: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum translation attempts before the run is aborted
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Fixed wait between attempts, in milliseconds
    #[arg(long)]
    retry_backoff_ms: Option<u64>,

    /// Number of files processed in parallel
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// What to do with corrupt source pages
    #[arg(long, value_enum, default_value = "skip")]
    corrupt: DispositionArg,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut translation = match TranslationConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            process::exit(1);
        }
    };

    translation.source_lang = cli.from;
    translation.target_lang = cli.to;
    if let Some(api_url) = cli.api_url {
        translation.api_url = api_url;
    }
    if let Some(max_attempts) = cli.max_attempts {
        translation.max_attempts = max_attempts;
    }
    if let Some(backoff) = cli.retry_backoff_ms {
        translation.retry_backoff_ms = backoff;
    }

    let backend = match DeeplxBackend::new(&translation.api_url) {
        Ok(backend) => backend,
        Err(e) => {
            tracing::error!(error = %e, "failed to set up translation backend");
            process::exit(1);
        }
    };

    let gateway = Gateway::new(
        Box::new(backend),
        translation.pair(),
        RetryPolicy::from(&translation),
    );

    let mut options = MirrorOptions::new(cli.input_root);
    options.output_root = cli.output;
    options.corrupt = cli.corrupt.into();
    options.jobs = cli.jobs.max(1);
    options.translation = translation;

    let orchestrator = Orchestrator::new(options, gateway);

    if let Err(e) = orchestrator.run() {
        tracing::error!(error = %e, "run aborted");
        process::exit(1);
    }
}
