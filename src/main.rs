//! CommProfile - Speech Communication Profiler

use std::fs;
use std::process;
use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use commprofile::feedback::FeedbackSynthesizer;
use commprofile::processing::{Pipeline, PipelineResult};
use commprofile::{init_logging, Args, Config};

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    if let Some(path) = &args.write_default_config {
        Config::create_default_config(path)
            .with_context(|| format!("Failed to write default config to {}", path.display()))?;
        println!("Default config written to {}", path.display());
        return Ok(());
    }

    if args.verbose {
        eprintln!("{}", commprofile::get_library_info());
    }

    let config = Config::from_args_and_config(args.clone())?;
    let transcript = match (&args.text, &config.transcript_path) {
        (Some(text), _) => Some(text.clone()),
        (None, Some(path)) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read transcript {}", path.display()))?,
        ),
        (None, None) => None,
    };

    let pipeline = Pipeline::new(config.clone())?;

    let result = if args.text_only {
        let transcript = transcript.context("Text-only mode needs --transcript or --text")?;
        pipeline.run_text_only(&transcript)?
    } else {
        let audio_path = config
            .audio_path
            .as_ref()
            .context("No audio input: pass --audio or use --text-only")?;
        if !audio_path.exists() {
            anyhow::bail!("Input file does not exist: {}", audio_path.display());
        }
        let wave = pipeline.load_audio(audio_path)?;

        if args.audio_only {
            pipeline.run_audio_only(&wave)?
        } else {
            let transcript = transcript
                .context("No transcript: pass --transcript or --text, or use --audio-only")?;
            pipeline.run(&wave, &transcript)?
        }
    };

    let output = render_output(&result, args.feedback)?;
    match &config.output_path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, &output)
                .with_context(|| format!("Failed to write output {}", path.display()))?;
            info!("Profile written to {}", path.display());
        }
        None => println!("{}", output),
    }

    if config.verbose() {
        let metrics = &result.metrics;
        eprintln!("=== Processing Complete ===");
        eprintln!("Time: {:.3}s", metrics.processing_time_seconds);
        eprintln!("Audio: {:.3}s, Text: {:.3}s", metrics.audio_time_seconds, metrics.text_time_seconds);
        if metrics.input_duration_seconds > 0.0 {
            eprintln!("RTF: {:.3}", metrics.real_time_factor);
        }
        eprintln!("Threads: {}", metrics.threads);
    }

    Ok(())
}

/// Profile JSON, or profile plus feedback when requested.
fn render_output(result: &PipelineResult, with_feedback: bool) -> Result<String> {
    if !with_feedback {
        return Ok(result.profile.to_json()?);
    }
    let feedback = FeedbackSynthesizer::from_profile(&result.profile);
    let combined = serde_json::json!({
        "profile": result.profile.to_value()?,
        "feedback": feedback,
    });
    Ok(serde_json::to_string_pretty(&combined)?)
}
