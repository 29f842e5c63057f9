use std::{path::PathBuf, process::ExitCode};

use anyhow::Result;
use clap::Parser;
use client_core::{
    config::{load_settings, load_settings_from},
    poster_url, GenerateError, ImageUpload, PosterClient, PosterService,
};
use shared::domain::PosterSet;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "poster-cli", about = "Submit a cover image and print the generated posters")]
struct Args {
    /// Image file to upload.
    #[arg(long)]
    image: PathBuf,
    /// Base URL of the poster generation service.
    #[arg(long)]
    server_url: Option<String>,
    /// Settings file to read instead of ./poster.toml.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the parsed result as JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => load_settings_from(path)?,
        None => load_settings(),
    }
    .with_server_url(args.server_url.as_deref())?;
    let client = PosterClient::new(settings.server_url);

    let outcome = match ImageUpload::from_path(&args.image).await {
        Ok(upload) => client.generate_posters(upload).await,
        Err(err) => Err(err),
    };

    match outcome {
        Ok(posters) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&posters)?);
            } else {
                for line in render_posters(client.server_url(), &posters) {
                    println!("{line}");
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            tracing::debug!(status = ?err.status(), "generation failed: {err}");
            eprintln!("{}", failure_line(&err));
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Text output for a successful run: title and description when present,
/// then one numbered line per poster URL.
fn render_posters(server_url: &str, posters: &PosterSet) -> Vec<String> {
    let mut lines = Vec::with_capacity(posters.outputs.len() + 2);
    if !posters.title.is_empty() {
        lines.push(posters.title.clone());
    }
    if !posters.description.is_empty() {
        lines.push(posters.description.clone());
    }
    lines.extend(
        posters
            .outputs
            .iter()
            .enumerate()
            .map(|(index, output)| format!("Poster {}: {}", index + 1, poster_url(server_url, output))),
    );
    lines
}

fn failure_line(err: &GenerateError) -> String {
    format!("Upload failed: {}", err.user_message())
}
