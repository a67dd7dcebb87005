use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use opml_share::config::Config;
use opml_share::opml::export_to_file;
use opml_share::render::{render_json, render_text, OutputFormat, TextOptions};
use opml_share::upload::{validate_upload_file, ValidatedOpml};

#[derive(Parser, Debug)]
#[command(
    name = "opml-share",
    about = "Parse OPML subscription exports into shareable feed collections"
)]
struct Args {
    /// Config file (defaults to ~/.config/opml-share/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse an OPML file and print its feed groups
    Show {
        file: PathBuf,

        /// Output format (overrides `output_format` from the config)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Check that a file would be accepted as an upload
    Validate { file: PathBuf },
    /// Normalize an OPML file and write it back out as OPML 2.0
    Export {
        file: PathBuf,

        #[arg(long, short, value_name = "FILE")]
        output: PathBuf,

        /// Title written to the document head
        #[arg(long, default_value = "Shared feeds")]
        title: String,
    },
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match Config::default_path() {
            Some(path) => path,
            None => {
                tracing::debug!("HOME not set, using default configuration");
                return Ok(Config::default());
            }
        },
    };
    Config::load(&path).with_context(|| format!("Failed to load config: {}", path.display()))
}

async fn read_opml(file: &Path, config: &Config) -> Result<ValidatedOpml> {
    validate_upload_file(file, config.max_upload_bytes)
        .await
        .with_context(|| format!("Failed to load OPML file: {}", file.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Show { file, format } => {
            let opml = read_opml(&file, &config).await?;
            match format.unwrap_or(config.output_format) {
                OutputFormat::Text => {
                    print!("{}", render_text(&opml.groups, TextOptions::from(&config)))
                }
                OutputFormat::Json => println!(
                    "{}",
                    render_json(&opml.groups).context("Failed to serialize feed groups")?
                ),
            }
        }
        Command::Validate { file } => {
            let opml = read_opml(&file, &config).await?;
            println!(
                "valid: {} feeds in {} groups",
                opml.feed_count(),
                opml.group_count()
            );
        }
        Command::Export {
            file,
            output,
            title,
        } => {
            let opml = read_opml(&file, &config).await?;
            export_to_file(&opml.groups, &title, &output)
                .with_context(|| format!("Failed to export to {}", output.display()))?;
            println!(
                "Exported {} feeds in {} groups to {}",
                opml.feed_count(),
                opml.group_count(),
                output.display()
            );
        }
    }

    Ok(())
}
