use anyhow::Result;
use clap::Parser;
use owo_colors::OwoColorize;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tolmach::audio::{decode_wav_bytes, read_wav_file, write_wav_file};
use tolmach::cli::{Cli, Commands};
use tolmach::config::Config;
use tolmach::defaults;
use tolmach::engine::{DiscardSink, PlaybackSink, StageServices, WavFileSink};
use tolmach::pipeline::{AudioChunk, Pipeline, StatusMonitor};
use tolmach::session::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        None => {
            run_serve(config, None, cli.quiet).await?;
        }
        Some(Commands::Serve { bind }) => {
            run_serve(config, bind, cli.quiet).await?;
        }
        Some(Commands::File { input, output }) => {
            run_file(config, &input, output.as_deref(), cli.quiet)?;
        }
        Some(Commands::Stream {
            input,
            output,
            chunk,
        }) => {
            run_stream(config, input.as_deref(), output.as_deref(), chunk, cli.quiet)?;
        }
    }

    Ok(())
}

/// Route log output through the TOLMACH_LOG filter when set, otherwise
/// derive the level from --quiet/--verbose.
fn init_logging(quiet: bool, verbose: u8) {
    let filter = tracing_subscriber::EnvFilter::try_from_env("TOLMACH_LOG").unwrap_or_else(|_| {
        let level = if quiet {
            "error"
        } else {
            match verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        };
        tracing_subscriber::EnvFilter::new(level)
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/tolmach/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        // Load from custom path
        Config::load(path)?
    } else {
        // Try default path, fall back to defaults
        let default_path = Config::default_path();
        Config::load_or_default(&default_path)
    };

    // Apply environment variable overrides
    Ok(config.with_env_overrides())
}

/// Run the realtime session server until SIGINT or SIGTERM.
async fn run_serve(mut config: Config, bind_override: Option<String>, quiet: bool) -> Result<()> {
    if let Some(bind) = bind_override {
        config.server.bind = bind;
    }

    let services = StageServices::from_config(&config.engines)?;
    let pipeline = Arc::new(Pipeline::new(services, config.pipeline.clone()));

    let monitor = (config.pipeline.monitor_interval_secs > 0).then(|| {
        StatusMonitor::spawn(
            Arc::clone(&pipeline),
            Duration::from_secs(config.pipeline.monitor_interval_secs),
        )
    });

    if !quiet {
        eprintln!(
            "tolmach {} listening on {}",
            tolmach::version_string(),
            config.server.bind
        );
        if config.server.api_key.is_some() {
            eprintln!("Sessions require a matching api_key query parameter.");
        }
    }

    let state = Arc::new(AppState {
        pipeline,
        api_key: config.server.api_key.clone(),
    });
    let served = tolmach::session::serve(&config.server.bind, state).await;

    if let Some(monitor) = monitor {
        monitor.stop();
    }

    served?;
    Ok(())
}

/// Translate a single WAV file and print the result.
fn run_file(config: Config, input: &Path, output: Option<&Path>, quiet: bool) -> Result<()> {
    let services = StageServices::from_config(&config.engines)?;
    let pipeline = Pipeline::new(services, config.pipeline.clone());

    let chunk = read_wav_file(input, defaults::SAMPLE_RATE)?;
    let outcome = pipeline.process_chunk(&chunk)?;

    if quiet {
        println!("{}", outcome.russian_text);
    } else {
        println!("{}  {}", "English:".dimmed(), outcome.english_text);
        println!("{}  {}", "Russian:".dimmed(), outcome.russian_text);
        println!("{}  {}", "Samples:".dimmed(), outcome.samples.len());
    }

    if let Some(path) = output {
        write_wav_file(path, &outcome.samples, defaults::SYNTHESIS_SAMPLE_RATE)?;
        if !quiet {
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}

/// Stream a WAV file through the staged pipeline chunk by chunk.
fn run_stream(
    config: Config,
    input: Option<&Path>,
    output: Option<&Path>,
    chunk: Duration,
    quiet: bool,
) -> Result<()> {
    let samples_per_chunk = (f64::from(defaults::SAMPLE_RATE) * chunk.as_secs_f64()) as usize;
    if samples_per_chunk == 0 {
        anyhow::bail!("chunk duration too short: {:?}", chunk);
    }

    let services = StageServices::from_config(&config.engines)?;
    let pipeline = Pipeline::new(services, config.pipeline.clone());

    let sink: Box<dyn PlaybackSink> = match output {
        Some(path) => Box::new(WavFileSink::create(path, defaults::SYNTHESIS_SAMPLE_RATE)?),
        None => Box::new(DiscardSink),
    };
    pipeline.start(sink)?;

    let audio = match input {
        Some(path) => read_wav_file(path, defaults::SAMPLE_RATE)?,
        None => {
            // Pipe mode: stdin has WAV data
            let mut bytes = Vec::new();
            std::io::stdin().read_to_end(&mut bytes)?;
            decode_wav_bytes(&bytes, defaults::SAMPLE_RATE)?
        }
    };

    let mut submitted = 0usize;
    for window in audio.samples.chunks(samples_per_chunk) {
        pipeline.submit_audio(AudioChunk::new(window.to_vec(), defaults::SAMPLE_RATE))?;
        submitted += 1;
    }

    if !quiet {
        eprintln!("tolmach: submitted {submitted} chunks, draining pipeline");
    }

    wait_for_drain(&pipeline);
    pipeline.stop();

    if !quiet {
        let status = pipeline.status();
        eprintln!(
            "tolmach: accepted {} of {submitted} chunks",
            status.requests
        );
        if let Some(path) = output {
            eprintln!("tolmach: wrote {}", path.display());
        }
    }

    Ok(())
}

/// Block until every stage queue is empty.
///
/// Queue depths drop before the last item finishes its stage, so an
/// empty reading is confirmed once more after a short settle.
fn wait_for_drain(pipeline: &Pipeline) {
    let drained = |p: &Pipeline| {
        let status = p.status();
        status.recognition_queue == 0
            && status.translation_queue == 0
            && status.synthesis_queue == 0
    };

    loop {
        if drained(pipeline) {
            std::thread::sleep(Duration::from_millis(100));
            if drained(pipeline) {
                return;
            }
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}
