//! Bundle an HTML document and its local assets into one self-contained file.

use clap::Parser;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
  name = "htmlpack",
  version,
  about = "Inline local stylesheets, scripts and media into a single HTML file"
)]
struct Cli {
  /// Path to the input HTML document
  input: PathBuf,

  /// Directory that relative links resolve against (defaults to the
  /// input document's directory)
  #[arg(long)]
  base: Option<PathBuf>,

  /// Write the bundled document here instead of stdout
  #[arg(long)]
  out: Option<PathBuf>,

  /// Write per-resource failure diagnostics to this file as JSON
  #[arg(long)]
  report: Option<PathBuf>,
}

fn main() -> ExitCode {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
  let cli = Cli::parse();
  match run(&cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(error) => {
      eprintln!("error: {error}");
      ExitCode::FAILURE
    }
  }
}

fn run(cli: &Cli) -> htmlpack::Result<()> {
  let input = fs::read_to_string(&cli.input)?;
  let base = match &cli.base {
    Some(directory) => directory.clone(),
    None => cli
      .input
      .parent()
      .filter(|parent| !parent.as_os_str().is_empty())
      .map(Path::to_path_buf)
      .unwrap_or_else(|| PathBuf::from(".")),
  };

  let bundled = htmlpack::bundle(&input, &base)?;
  for diagnostic in &bundled.diagnostics {
    log::warn!("{diagnostic}");
  }

  if let Some(report) = &cli.report {
    let json =
      serde_json::to_string_pretty(&bundled.diagnostics).map_err(std::io::Error::other)?;
    fs::write(report, json)?;
  }

  match &cli.out {
    Some(path) => fs::write(path, bundled.html.as_bytes())?,
    None => std::io::stdout().write_all(bundled.html.as_bytes())?,
  }
  Ok(())
}
