use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use tokio::io::{AsyncBufReadExt, BufReader};

use emotion_detector::{ClientConfig, EmotionClient, SessionController, SessionOptions, SubmitOutcome};

#[derive(Parser)]
#[command(author, version, about = "Detect emotions in text through a remote prediction service", long_about = None)]
struct Args {
    /// Texts to classify; reads one per line from stdin when omitted
    text: Vec<String>,

    /// Backend root URL (overrides config file and EMOTION_API_URL)
    #[arg(short, long)]
    url: Option<String>,

    /// Request timeout in seconds
    #[arg(short, long)]
    timeout_secs: Option<u64>,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Treat input as voice transcripts
    #[arg(long)]
    voice: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = ClientConfig::resolve(args.config.as_deref()).context("failed to load configuration")?;
    if let Some(url) = args.url {
        config.base_url = url;
    }
    if let Some(secs) = args.timeout_secs {
        config.timeout_secs = Some(secs);
    }

    let client = EmotionClient::from_config(&config).context("failed to create prediction client")?;
    info!("=== Emotion detection session against {} ===", client.endpoint());
    let session = SessionController::builder()
        .predictor(Arc::new(client))
        .options(SessionOptions::from(&config))
        .build()?;

    let start_time = Instant::now();
    let mut submitted = 0usize;

    if args.text.is_empty() {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
            process_input(&session, &line, args.voice).await;
            submitted += 1;
        }
    } else {
        for text in &args.text {
            process_input(&session, text, args.voice).await;
            submitted += 1;
        }
    }

    println!("\nEmotion History:");
    for entry in session.history() {
        println!("  {}", entry);
    }

    info!("Processed {} submissions in {:.2?}", submitted, start_time.elapsed());
    Ok(())
}

async fn process_input(session: &SessionController, text: &str, voice: bool) {
    let outcome = if voice {
        session.submit_voice_transcript(text).await
    } else {
        session.submit_text(text).await
    };

    match outcome {
        SubmitOutcome::Detected(label) => println!("{} => {}", text, label),
        SubmitOutcome::Failed(message) => eprintln!("{} => {}", text, message),
        SubmitOutcome::Invalid | SubmitOutcome::Superseded => println!("{}", session.snapshot().message),
    }
}
