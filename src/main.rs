use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lifelens::{
    create_router, AnalysisClient, AnalysisResult, AppState, CameraDeviceFactory, Command,
    CommandOutcome, CommandSpeech, Config, ConsoleSpeech, FrameCapture, NarrationChannel,
    Orchestrator, RasterCanvas, SharedCanvas, SpeechOutput,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info};

#[derive(Parser)]
#[command(name = "lifelens", version, about = "Assistive-vision client: detect objects, read text, narrate")]
struct Cli {
    /// Configuration file (extension optional)
    #[arg(short, long, default_value = "config/lifelens")]
    config: String,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand)]
enum Mode {
    /// Read commands from stdin: start, detect, read, stop, status, quit (default)
    Run,
    /// Serve the HTTP command surface
    Serve,
    /// Probe the inference service
    Check,
}

struct Runtime {
    orchestrator: Arc<Orchestrator>,
    overlay: Arc<Mutex<RasterCanvas>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("LifeLens v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);
    info!("Inference service: {}", cfg.inference.base_url);

    match cli.mode.unwrap_or(Mode::Run) {
        Mode::Run => run_interactive(&cfg, build_runtime(&cfg)?).await,
        Mode::Serve => serve(&cfg, build_runtime(&cfg)?).await,
        Mode::Check => check(&cfg).await,
    }
}

fn build_runtime(cfg: &Config) -> Result<Runtime> {
    let device = CameraDeviceFactory::create(cfg.camera_source()?);
    info!("Camera source: {}", device.name());
    let capture = FrameCapture::new(device, cfg.camera_constraints())
        .with_jpeg_quality(cfg.camera.jpeg_quality);

    let client = AnalysisClient::new(cfg.analysis_client())
        .context("Failed to build inference client")?;

    let speech: Box<dyn SpeechOutput> = match &cfg.speech.command {
        Some(program) => Box::new(CommandSpeech::new(program.clone(), cfg.speech.args.clone())),
        None => Box::new(ConsoleSpeech),
    };
    info!("Speech output: {}", speech.name());

    let overlay = Arc::new(Mutex::new(RasterCanvas::new(cfg.camera.width, cfg.camera.height)));
    let canvas: SharedCanvas = overlay.clone();

    let orchestrator = Arc::new(Orchestrator::new(
        capture,
        client,
        canvas,
        NarrationChannel::new(speech),
    ));

    Ok(Runtime {
        orchestrator,
        overlay,
    })
}

async fn run_interactive(cfg: &Config, runtime: Runtime) -> Result<()> {
    println!("Commands: start, detect, read, stop, status, quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        match line.trim() {
            "" => continue,
            "quit" | "exit" => break,
            "status" => {
                let status = runtime.orchestrator.status();
                println!(
                    "[{}] {} ({})",
                    runtime.orchestrator.state(),
                    status.message,
                    status.severity.as_str()
                );
                continue;
            }
            _ => {}
        }

        let command: Command = match line.parse() {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        // Each command runs as its own task so `stop` can interleave with an
        // analysis that is waiting on the network.
        let orchestrator = Arc::clone(&runtime.orchestrator);
        let overlay = Arc::clone(&runtime.overlay);
        let output_path = cfg.overlay.output_path.clone();

        tokio::spawn(async move {
            match orchestrator.dispatch(command).await {
                Ok(CommandOutcome::Analyzed {
                    result: AnalysisResult::Detections(_),
                }) => {
                    if let Some(path) = output_path {
                        let canvas = overlay
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .clone();
                        let target = path.clone();
                        let saved = tokio::task::spawn_blocking(move || canvas.save(target))
                            .await
                            .map_err(anyhow::Error::from)
                            .and_then(|saved| saved);
                        match saved {
                            Ok(()) => info!("Overlay saved to {}", path),
                            Err(e) => error!("{:#}", e),
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => debug!("Command {:?} ended: {}", command, e),
            }
        });
    }

    runtime.orchestrator.stop().await;
    Ok(())
}

async fn serve(cfg: &Config, runtime: Runtime) -> Result<()> {
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let app = create_router(AppState::new(
        Arc::clone(&runtime.orchestrator),
        runtime.overlay,
    ));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP command surface listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    runtime.orchestrator.stop().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

async fn check(cfg: &Config) -> Result<()> {
    let client = AnalysisClient::new(cfg.analysis_client())
        .context("Failed to build inference client")?;

    let health = client
        .check_health()
        .await
        .with_context(|| format!("Inference service at {} is not reachable", client.base_url()))?;

    println!("{}: {} {}", client.base_url(), health.status, health.message);
    Ok(())
}
