use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::io::Write;
use tracing_subscriber::EnvFilter;
use tubescribe::cli::{Cli, Commands};
use tubescribe::config::{Config, Strategy};
use tubescribe::pipeline::{Pipeline, StderrProgress};
use tubescribe::transcribe::rest::{HttpTranscriptApi, PollingTranscriber};
use tubescribe::transcribe::streaming::StreamingTranscriber;
use tubescribe::transcribe::ws::WsSpeechService;
use tubescribe::{CancelToken, SubtitleTrack, YtDlpDownloader, subtitle};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::Check) => {
            let config = load_config(&cli)?;
            if !tubescribe::diagnostics::run_checks(&config) {
                std::process::exit(1);
            }
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "tubescribe",
                &mut std::io::stdout(),
            );
        }
        None => {
            let Some(url) = cli.url.clone() else {
                Cli::command().print_help()?;
                std::process::exit(2);
            };
            let track = run_pipeline(&cli, &url).await?;
            emit(&cli, &track)?;
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load_or_default(cli.config.as_deref())?.with_env_overrides();
    if let Some(strategy) = cli.strategy.as_deref() {
        config.speech.strategy = strategy.parse()?;
    }
    Ok(config)
}

async fn run_pipeline(cli: &Cli, url: &str) -> Result<SubtitleTrack> {
    let config = load_config(cli)?;
    config.validate()?;

    let cancel = CancelToken::new();
    spawn_ctrl_c_handler(cancel.clone());

    let provider = YtDlpDownloader::new(config.download.binary.clone());
    let progress = StderrProgress::new(cli.quiet);

    let track = match config.speech.strategy {
        Strategy::Streaming => {
            let service = WsSpeechService::new(
                config.streaming_endpoint(),
                config.speech.api_key.clone(),
            );
            let transcriber = StreamingTranscriber::new(service);
            Pipeline::new(provider, transcriber, progress)
                .run(url, &cancel)
                .await?
        }
        Strategy::Polling => {
            let api = HttpTranscriptApi::new(
                &config.speech.base_url,
                &config.speech.api_key,
                &config.speech.speech_model,
            )?;
            let interval = cli
                .poll_interval
                .unwrap_or(tubescribe::defaults::POLL_INTERVAL);
            let timeout = cli
                .poll_timeout
                .unwrap_or(tubescribe::defaults::POLL_TIMEOUT);
            let transcriber = PollingTranscriber::new(api).with_timing(interval, timeout);
            Pipeline::new(provider, transcriber, progress)
                .run(url, &cancel)
                .await?
        }
    };

    Ok(track)
}

/// Ctrl-C requests cooperative cancellation.
fn spawn_ctrl_c_handler(cancel: CancelToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("cancellation requested, finishing up...");
            cancel.cancel();
        }
    });
}

/// Print the JSON result (and optionally an SRT file). Nothing is written
/// unless the whole track is available.
fn emit(cli: &Cli, track: &SubtitleTrack) -> Result<()> {
    if let Some(srt_path) = &cli.srt {
        let content = subtitle::display_subtitles(&subtitle::to_subtitles(track));
        std::fs::write(srt_path, content)?;
        if !cli.quiet {
            eprintln!("SRT written to {}", srt_path.display());
        }
    }

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", subtitle::to_json(track)?)?;
    Ok(())
}

fn init_tracing(verbosity: u8) {
    let default_filter = match verbosity {
        0 => "warn",
        1 => "tubescribe=debug,info",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}
