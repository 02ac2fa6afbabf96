use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use friday_gateway::api::{self, ApiState};
use friday_gateway::voice::{AudioCapture, AudioPlayback, SAMPLE_RATE, samples_to_wav};
use friday_gateway::{
    AgentResponder, Config, ElevenLabsProvider, SessionRelay, SynthesisCache, SynthesisEngine,
    SynthesisOptions,
};

/// Friday - real-time voice gateway for the Friday assistant
#[derive(Parser)]
#[command(name = "friday", version, about)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "FRIDAY_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides configuration)
    #[arg(long, env = "FRIDAY_PORT")]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Test microphone input, writing the capture to a WAV file
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
        /// Output WAV path
        #[arg(short, long, default_value = "capture.wav")]
        output: PathBuf,
    },
    /// Test speaker output with a short tone
    TestSpeaker,
    /// Synthesize text and play it
    TestTts {
        /// Text to speak
        #[arg(default_value = "Hej! Dette er en test af Fridays stemme.")]
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,friday_gateway=info",
        1 => "info,friday_gateway=debug",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestMic { duration, output } => test_mic(duration, &output).await,
            Command::TestSpeaker => test_speaker(),
            Command::TestTts { text } => test_tts(&config, &text).await,
        };
    }

    serve(config).await
}

/// Run the voice server until interrupted
async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        port = config.server.port,
        cache_dir = %config.cache.dir.display(),
        "starting Friday voice server"
    );

    let engine = Arc::new(build_engine(&config)?);
    let responder = Arc::new(AgentResponder::new(&config.responder));
    let relay = Arc::new(SessionRelay::new(
        responder,
        engine,
        Duration::from_secs(config.responder.timeout_secs),
    ));

    let state = Arc::new(ApiState::new(relay, config.cache.dir.clone()));
    tracing::info!("Friday is ready to talk");
    api::serve(state, &config.server.bind, config.server.port).await?;
    Ok(())
}

/// Build the synthesis engine from configuration
fn build_engine(config: &Config) -> anyhow::Result<SynthesisEngine> {
    let api_key = config.synthesis.api_key.clone().ok_or_else(|| {
        anyhow::anyhow!("ELEVENLABS_API_KEY is required to synthesize speech")
    })?;

    let provider = Arc::new(ElevenLabsProvider::new(api_key)?);
    let cache = SynthesisCache::new(&config.cache.dir, config.cache.max_entries)?;
    let options = SynthesisOptions {
        voice_id: config.synthesis.voice_id.clone(),
        model: config.synthesis.model.clone(),
        max_attempts: config.synthesis.max_attempts,
        attempt_timeout: Duration::from_secs(config.synthesis.attempt_timeout_secs),
        ..SynthesisOptions::default()
    };
    Ok(SynthesisEngine::new(provider, cache, options))
}

/// Capture from the microphone and write a WAV file
#[allow(clippy::future_not_send, clippy::cast_precision_loss)]
async fn test_mic(duration: u64, output: &Path) -> anyhow::Result<()> {
    println!("Recording for {duration} seconds, speak into your microphone...");

    let mut capture = AudioCapture::new()?;
    capture.start()?;
    tokio::time::sleep(Duration::from_secs(duration)).await;
    capture.stop();

    let samples = capture.take_buffer();
    let wav = samples_to_wav(&samples, SAMPLE_RATE)?;
    std::fs::write(output, wav)?;

    println!(
        "Captured {} samples ({:.1}s) to {}",
        samples.len(),
        samples.len() as f64 / f64::from(SAMPLE_RATE),
        output.display()
    );
    Ok(())
}

/// Play a short sine tone
#[allow(clippy::cast_possible_truncation)]
fn test_speaker() -> anyhow::Result<()> {
    println!("Playing test tone...");

    let samples: Vec<f32> = (0..24_000)
        .map(|i| {
            let t = f64::from(i) / 24_000.0;
            (0.3 * (2.0 * std::f64::consts::PI * 440.0 * t).sin()) as f32
        })
        .collect();

    let playback = AudioPlayback::new()?;
    playback.play_samples(&samples)?;
    println!("Done.");
    Ok(())
}

/// Synthesize text through the full pipeline and play the cached artifact
async fn test_tts(config: &Config, text: &str) -> anyhow::Result<()> {
    println!("Synthesizing: {text}");

    let engine = build_engine(config)?;
    let artifact = engine.synthesize(text).await?;
    let path = config.cache.dir.join(&artifact.filename);
    println!("Artifact: {}", path.display());

    let mp3 = std::fs::read(&path)?;
    let playback = AudioPlayback::new()?;
    playback.play_mp3(&mp3)?;
    Ok(())
}
