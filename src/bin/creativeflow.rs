//! CLI for CreativeFlow - image and video generation from the terminal.

use clap::{Args, Parser, Subcommand, ValueEnum};
use creativeflow::{
    AspectRatio, AuthGate, AuthState, ClientConfig, GeneratedItem, StaticKeyHost, Studio,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "creativeflow")]
#[command(about = "Generate images (Gemini) and videos (Veo) from text prompts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an image from a text prompt
    Image(ImageArgs),

    /// Generate a video from a text prompt
    Video(VideoArgs),
}

#[derive(Args)]
struct ImageArgs {
    /// The text prompt describing the image
    prompt: String,

    /// Output file path (defaults to creative-flow-<id>.png)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Aspect ratio
    #[arg(long, value_enum, default_value = "1:1")]
    aspect_ratio: AspectRatioArg,

    /// Use the higher quality (pro) model
    #[arg(long)]
    pro: bool,
}

#[derive(Args)]
struct VideoArgs {
    /// The text prompt describing the video
    prompt: String,

    /// Output file path (defaults to creative-flow-<id>.mp4)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Aspect ratio
    #[arg(long, value_enum, default_value = "16:9")]
    aspect_ratio: VideoAspectArg,

    /// Seconds between status polls
    #[arg(long, default_value_t = 5)]
    poll_interval: u64,

    /// Maximum number of status polls
    #[arg(long)]
    max_polls: Option<u32>,

    /// Give up after this many seconds
    #[arg(long, default_value_t = 600)]
    timeout: u64,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AspectRatioArg {
    #[value(name = "1:1")]
    Square,
    #[value(name = "16:9")]
    Landscape,
    #[value(name = "9:16")]
    Portrait,
}

impl From<AspectRatioArg> for AspectRatio {
    fn from(arg: AspectRatioArg) -> Self {
        match arg {
            AspectRatioArg::Square => AspectRatio::Square,
            AspectRatioArg::Landscape => AspectRatio::Landscape,
            AspectRatioArg::Portrait => AspectRatio::Portrait,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VideoAspectArg {
    #[value(name = "16:9")]
    Landscape,
    #[value(name = "9:16")]
    Portrait,
}

impl From<VideoAspectArg> for AspectRatio {
    fn from(arg: VideoAspectArg) -> Self {
        match arg {
            VideoAspectArg::Landscape => AspectRatio::Landscape,
            VideoAspectArg::Portrait => AspectRatio::Portrait,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Image(args) => generate_image(args, cli.json).await,
        Commands::Video(args) => generate_video(args, cli.json).await,
    }
}

async fn generate_image(args: ImageArgs, json_output: bool) -> anyhow::Result<()> {
    let config = ClientConfig::from_env()?;
    let studio = Studio::from_config(config, AuthGate::unavailable());

    let item = match studio
        .generate_image(&args.prompt, args.aspect_ratio.into(), args.pro)
        .await
    {
        Ok(item) => item,
        Err(e) => anyhow::bail!("{}", e.user_message()),
    };

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(item.download_file_name()));
    let data = studio.download(&item).await?;
    std::fs::write(&output, &data)?;

    report(&item, &output, data.len(), json_output)
}

async fn generate_video(args: VideoArgs, json_output: bool) -> anyhow::Result<()> {
    let config = ClientConfig::builder()
        .poll_interval(Duration::from_secs(args.poll_interval))
        .max_poll_attempts(args.max_polls)
        .poll_timeout(Some(Duration::from_secs(args.timeout)))
        .build_from_env()?;
    let studio = Studio::from_config(config, AuthGate::new(Arc::new(StaticKeyHost::new(true))));

    if studio.refresh_auth().await != AuthState::Confirmed {
        anyhow::bail!("Select an API key to enable video generation.");
    }

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    eprintln!("Generating video (this may take a few minutes)...");
    let item = match studio
        .generate_video(&args.prompt, args.aspect_ratio.into(), &cancel)
        .await
    {
        Ok(item) => item,
        Err(e) => anyhow::bail!("{}", e.user_message()),
    };

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(item.download_file_name()));
    let data = studio.download(&item).await?;
    std::fs::write(&output, &data)?;

    report(&item, &output, data.len(), json_output)
}

fn report(
    item: &GeneratedItem,
    output: &std::path::Path,
    size: usize,
    json_output: bool,
) -> anyhow::Result<()> {
    if json_output {
        let result = serde_json::json!({
            "success": true,
            "item": item,
            "output": output.display().to_string(),
            "size_bytes": size,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Generated {}: {} ({} bytes)",
            item.media_kind,
            output.display(),
            size
        );
    }
    Ok(())
}
