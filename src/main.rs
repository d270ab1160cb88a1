//! ReelForge CLI
//!
//! Headless topic-to-video generation.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use reelforge::core::captions::StyleRegistry;
use reelforge::core::config::PipelineConfig;
use reelforge::core::ffmpeg::{FFmpegInfo, FFmpegRunner};
use reelforge::core::pipeline::{Pipeline, PipelineOptions};
use reelforge::core::providers::ProviderRegistry;

#[derive(Parser, Debug)]
#[command(name = "reelforge", version, about = "Text-to-video generator")]
struct Args {
    /// Topic for video generation (prompted on stdin when omitted)
    #[arg(short, long)]
    topic: Option<String>,

    /// Output filename for the generated video
    #[arg(short, long)]
    output: Option<String>,

    /// Skip caption generation
    #[arg(long)]
    no_captions: bool,

    /// Skip background music
    #[arg(long)]
    no_bgm: bool,

    /// Keep the scratch workspace for resuming
    #[arg(long)]
    keep_workdir: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Config file path
    #[arg(long, default_value = "reelforge.json")]
    config: PathBuf,

    /// Caption style override
    #[arg(long)]
    style: Option<String>,

    /// List available caption styles and exit
    #[arg(long)]
    list_styles: bool,
}

fn prompt_topic() -> anyhow::Result<String> {
    print!("Enter a topic for your video: ");
    std::io::stdout().flush()?;
    let mut topic = String::new();
    std::io::stdin().read_line(&mut topic)?;
    let topic = topic.trim().to_string();
    anyhow::ensure!(!topic.is_empty(), "a topic is required");
    Ok(topic)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    reelforge::init_logging(std::path::Path::new(".logs"), args.debug);

    let config =
        PipelineConfig::load_or_default(&args.config).context("failed to load configuration")?;

    if args.list_styles {
        let registry = match &config.captions.style_file {
            Some(path) if path.exists() => StyleRegistry::with_overlay_file(path)?,
            _ => StyleRegistry::builtin(),
        };
        println!("Available caption styles:");
        for name in registry.names() {
            println!("  {name}");
        }
        return Ok(());
    }

    let topic = match args.topic {
        Some(topic) => topic,
        None => prompt_topic()?,
    };

    let providers = ProviderRegistry::builtin()
        .resolve(&config)
        .context("failed to resolve providers")?;
    let runner = FFmpegRunner::new(FFmpegInfo::detect()?);
    let pipeline = Pipeline::new(config, providers, runner);

    let options = PipelineOptions {
        captions: !args.no_captions,
        bgm: !args.no_bgm,
        keep_workdir: args.keep_workdir,
        output_name: args.output,
        style: args.style,
    };

    let output = pipeline
        .run(&topic, &options)
        .await
        .context("video generation failed")?;

    println!("Video saved to {}", output.display());
    Ok(())
}
