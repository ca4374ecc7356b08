use anyhow::Result;
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use std::path::Path;
use trainvox::cli::{Cli, Commands};
use trainvox::config::Config;
use trainvox::output;
use trainvox::query::QueryResult;
use trainvox::solver::{SolverClient, SolverConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(url) = cli.solver_url.clone() {
        config.solver.url = url;
    }
    if let Some(device) = cli.device.clone() {
        config.audio.device = Some(device);
    }
    config.validate()?;

    match cli.command {
        None => {
            println!(
                "{} {} — speak or type a journey, get an itinerary",
                "trainvox".bold(),
                trainvox::version_string()
            );
            println!();
            output::print_examples();
        }
        Some(Commands::Query { text }) => {
            let text = Commands::query_text(&text);
            run_text_query(&config, &text, cli.verbose).await?;
        }
        Some(Commands::Route {
            origin,
            destination,
        }) => {
            run_route_query(&config, &origin, &destination, cli.verbose).await?;
        }
        Some(Commands::Listen) => {
            run_voice_query(&config, cli.quiet, cli.verbose, false).await?;
        }
        Some(Commands::Transcribe) => {
            run_voice_query(&config, cli.quiet, cli.verbose, true).await?;
        }
        Some(Commands::Devices) => {
            list_audio_devices()?;
        }
        Some(Commands::Health) => {
            let client = solver_client(&config)?;
            let health = client.health().await?;
            output::print_health(&health);
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "trainvox",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Load configuration from an explicit path, or the default location.
fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(p) => Config::load(p)?,
        None => match Config::default_path() {
            Some(p) => Config::load_or_default(&p)?,
            None => Config::default(),
        },
    };
    Ok(config.with_env_overrides())
}

fn solver_client(config: &Config) -> Result<SolverClient> {
    let client = SolverClient::new(
        SolverConfig::new()
            .with_base_url(config.solver.url.clone())
            .with_timeout(config.solver.timeout_secs),
    )?;
    Ok(client)
}

/// Render a result plus, when an itinerary resolved, the map summary.
fn present(result: &QueryResult, verbose: u8) {
    output::print_result(result, verbose);
    if let Some(itinerary) = result.itinerary() {
        let view = trainvox::map::render(itinerary);
        println!();
        output::print_map_summary(&view);
    }
}

async fn run_text_query(config: &Config, text: &str, verbose: u8) -> Result<()> {
    let client = solver_client(config)?;
    let result = client.submit_text(text).await?;
    present(&result, verbose);
    Ok(())
}

async fn run_route_query(
    config: &Config,
    origin: &str,
    destination: &str,
    verbose: u8,
) -> Result<()> {
    let client = solver_client(config)?;
    let result = client.submit_route(origin, destination).await?;
    present(&result, verbose);
    Ok(())
}

/// One voice interaction: record until Enter, encode, submit, render.
#[cfg(feature = "cpal-audio")]
async fn run_voice_query(
    config: &Config,
    quiet: bool,
    verbose: u8,
    transcribe_only: bool,
) -> Result<()> {
    use trainvox::audio::capture::{CpalCaptureDevice, suppress_audio_warnings};
    use trainvox::audio::wav::WavDecoder;
    use trainvox::pipeline::VoiceQueryPipeline;

    suppress_audio_warnings();

    let device = CpalCaptureDevice::new(config.audio.device.as_deref(), config.audio.sample_rate)?;
    let client = solver_client(config)?;
    let mut pipeline = VoiceQueryPipeline::new(device, WavDecoder::new(), client);

    let generation = pipeline.begin();
    pipeline.start_capture()?;
    if !quiet {
        eprintln!("{}", "Recording… press Enter to stop.".green());
    }

    // Enter arrives on a blocking thread; chunks are pumped meanwhile.
    let (stop_tx, stop_rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let mut line = String::new();
        let _ = std::io::stdin().read_line(&mut line);
        let _ = stop_tx.send(());
    });

    loop {
        if stop_rx.try_recv().is_ok() {
            break;
        }
        pipeline.poll_capture()?;
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }

    if !quiet {
        eprintln!("{}", "Processing…".dimmed());
    }

    let result = if transcribe_only {
        pipeline.finish_transcribe().await?
    } else {
        pipeline.finish().await?
    };

    // A stale generation means this interaction was superseded; its result
    // must not be applied.
    if pipeline.is_current(generation) {
        present(&result, verbose);
    }
    Ok(())
}

#[cfg(not(feature = "cpal-audio"))]
async fn run_voice_query(
    _config: &Config,
    _quiet: bool,
    _verbose: u8,
    _transcribe_only: bool,
) -> Result<()> {
    anyhow::bail!(
        "this build has no audio capture support; rebuild with the `cpal-audio` feature"
    );
}

#[cfg(feature = "cpal-audio")]
fn list_audio_devices() -> Result<()> {
    let devices = trainvox::audio::capture::list_devices()?;
    if devices.is_empty() {
        println!("{}", "No audio input devices found.".yellow());
        return Ok(());
    }

    println!("Available input devices:");
    for entry in devices {
        if entry.recommended {
            println!("  {} {}", entry.name.green(), "(recommended)".dimmed());
        } else {
            println!("  {}", entry.name);
        }
    }
    Ok(())
}

#[cfg(not(feature = "cpal-audio"))]
fn list_audio_devices() -> Result<()> {
    anyhow::bail!(
        "this build has no audio capture support; rebuild with the `cpal-audio` feature"
    );
}
