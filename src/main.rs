use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tldw::cli::{Cli, Commands};
use tldw::config::Config;
use tldw::pipeline::{Flow, SummaryFlow, SummaryPipeline};
use tldw::speech::{SpeechToText, WhisperClient};
use tldw::{output, utils};

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up OPENAI_API_KEY from a local .env if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose { "tldw=debug" } else { "tldw=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load().await?;

    match cli.command {
        Commands::Summarize {
            url,
            output: output_path,
            format,
            no_fallback,
        } => {
            // Fail fast before any network work
            config.require_api_key()?;

            let pipeline = SummaryPipeline::from_config(&config, !no_fallback)?;
            let flow = SummaryFlow::new(pipeline);

            if !cli.quiet && !no_fallback {
                warn_missing_dependencies().await;
            }

            tracing::info!("starting {} flow for URL: {}", flow.name(), url);

            let spinner = create_spinner("Summarizing video...", cli.quiet);
            let digest = flow.run(&url).await;
            let digest = finish_spinner(spinner, digest, "Summary ready")?;

            let rendered = output::render_digest(&digest, &format)?;
            match output_path {
                Some(path) => {
                    output::save_to_file(&rendered, &path)?;
                    println!("Summary saved to: {}", path.display());
                }
                None => {
                    if !cli.quiet {
                        println!(
                            "{} {}\n",
                            style("Source:").dim(),
                            style(digest.source).yellow()
                        );
                    }
                    println!("{rendered}");
                }
            }
        }
        Commands::Transcript {
            url,
            output: output_path,
            format,
            no_fallback,
        } => {
            let pipeline = SummaryPipeline::from_config(&config, !no_fallback)?;

            if !cli.quiet && !no_fallback {
                warn_missing_dependencies().await;
            }

            let spinner = create_spinner("Fetching transcript...", cli.quiet);
            let transcript = pipeline.transcript(&url).await;
            let transcript = finish_spinner(spinner, transcript, "Transcript ready")?;

            let rendered = output::render_transcript(&transcript, &format)?;
            match output_path {
                Some(path) => {
                    output::save_to_file(&rendered, &path)?;
                    println!("Transcript saved to: {}", path.display());
                }
                None => {
                    if !cli.quiet {
                        println!(
                            "{} {}\n",
                            style("Source:").dim(),
                            style(transcript.source).yellow()
                        );
                    }
                    println!("{rendered}");
                }
            }
        }
        Commands::Transcribe { file, output: output_path } => {
            config.require_api_key()?;

            let audio_bytes = fs_err::read(&file)?;
            tracing::info!("read {} bytes from {}", audio_bytes.len(), file.display());

            let whisper = WhisperClient::from_config(&config)?;

            let spinner = create_spinner("Transcribing audio...", cli.quiet);
            let text = whisper.transcribe(&audio_bytes).await;
            let text = finish_spinner(spinner, text, "Transcription ready")?;

            match output_path {
                Some(path) => {
                    output::save_to_file(&text, &path)?;
                    println!("Transcription saved to: {}", path.display());
                }
                None => println!("{text}"),
            }
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                config.save().await?;
                println!("Configuration written. Edit it with any text editor:");
                config.display();
            }
        }
    }

    Ok(())
}

/// Warn (non-fatally) about missing external tools.
async fn warn_missing_dependencies() {
    let missing = utils::check_dependencies().await;
    if !missing.is_empty() {
        eprintln!("⚠️  Dependency check warnings:");
        for dep in missing {
            eprintln!("   • {}", dep);
        }
        eprintln!("   (Continuing anyway - captions may be enough)");
    }
}

fn create_spinner(msg: &str, quiet: bool) -> Option<ProgressBar> {
    if quiet {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    Some(pb)
}

fn finish_spinner<T, E>(
    spinner: Option<ProgressBar>,
    result: std::result::Result<T, E>,
    done_msg: &str,
) -> std::result::Result<T, E> {
    if let Some(pb) = spinner {
        match &result {
            Ok(_) => pb.finish_with_message(format!("{} {}", style("✓").green().bold(), done_msg)),
            Err(_) => pb.finish_and_clear(),
        }
    }
    result
}
