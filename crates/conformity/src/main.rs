use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use conformity::charts::PlotlyHtmlRenderer;
use conformity::client::HttpAnalysisClient;
use conformity::config::{self, ClientConfig};
use conformity::download::FileDownloadSink;
use conformity::flows::{ConvertFlow, UploadFlow};
use conformity::form::{ConvertForm, FileInput, UploadForm};
use conformity::view::{TerminalNotifier, TerminalView};

#[derive(Parser)]
#[command(name = "conformity")]
#[command(about = "Conformity - lecture/curriculum analysis client\nUpload transcripts, chart the match, convert curricula")]
#[command(version)]
struct Cli {
  /// Base URL of the analysis server
  #[arg(long, global = true, env = "CONFORMITY_SERVER_URL", default_value = config::DEFAULT_SERVER_URL)]
  server: String,

  /// Request timeout in seconds
  #[arg(
    long,
    global = true,
    env = "CONFORMITY_TIMEOUT_SECS",
    default_value_t = config::DEFAULT_TIMEOUT_SECS,
    value_parser = clap::value_parser!(u64).range(1..)
  )]
  timeout: u64,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Analyze a lecture transcript against a curriculum
  Analyze {
    /// Lecture transcript (.vtt)
    #[arg(short, long)]
    transcript: Option<PathBuf>,
    /// Curriculum file
    #[arg(short, long)]
    curriculum: Option<PathBuf>,
    /// Directory the chart pages are written to
    #[arg(long, default_value = config::DEFAULT_CHARTS_DIR)]
    charts_dir: PathBuf,
  },
  /// Convert a curriculum spreadsheet (.xlsx) to curriculum.json
  Convert {
    /// Spreadsheet to convert
    file: Option<PathBuf>,
    /// Where curriculum.json is saved (defaults to the download folder)
    #[arg(short, long)]
    download_dir: Option<PathBuf>,
  },
}

fn init_tracing() {
  let filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("conformity=info"));
  tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// Returns whether the submission succeeded; failures are already alerted.
async fn handle(cli: Cli) -> Result<bool> {
  let client_config =
    ClientConfig::new(&cli.server, cli.timeout).context("invalid server configuration")?;
  let api = Arc::new(HttpAnalysisClient::new(&client_config)?);
  let notifier = Arc::new(TerminalNotifier);

  match cli.command {
    Command::Analyze { transcript, curriculum, charts_dir } => {
      let flow = UploadFlow::new(
        api,
        Arc::new(TerminalView::stdout()),
        Arc::new(PlotlyHtmlRenderer::new(&charts_dir)),
        notifier,
      );
      let form = UploadForm::new(FileInput::from(transcript), FileInput::from(curriculum));

      let succeeded = flow.submit(&form).await.is_ok();
      if succeeded {
        println!("{} Charts written to {}", "✓".green(), charts_dir.display().to_string().cyan());
      }
      Ok(succeeded)
    }
    Command::Convert { file, download_dir } => {
      let download_dir = download_dir.unwrap_or_else(config::default_download_dir);
      let flow = ConvertFlow::new(api, Arc::new(FileDownloadSink::new(download_dir)), notifier);
      let mut form = ConvertForm::new(FileInput::from(file));

      match flow.submit(&mut form).await {
        Ok(saved) => {
          println!("{} Saved {}", "✓".green(), saved.display().to_string().cyan());
          Ok(true)
        }
        Err(_) => Ok(false),
      }
    }
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  init_tracing();
  let cli = Cli::parse();

  if !handle(cli).await? {
    process::exit(1);
  }
  Ok(())
}
