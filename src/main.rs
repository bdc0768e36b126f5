#![warn(clippy::all)]

mod transfer;
mod ui;

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::transfer::{Settings, Summary, UploadMethod};

use clap::Parser;
use humantime::format_duration;
use log::{debug, error};
use reqwest::StatusCode;
use url::Url;

#[derive(Debug, thiserror::Error)]
#[error("pstream error")]
pub(crate) enum Error {
  #[error("IO error: {0}")]
  Io(#[from] io::Error),
  #[error("Networking error: {0}")]
  Net(#[from] reqwest::Error),
  #[error("Error writing summary: {0}")]
  Json(#[from] serde_json::Error),
  #[error("`{url}` responded with {status}")]
  Status { url: Url, status: StatusCode },
  #[error("Cannot determine the size of `{}`", .0.display())]
  UnknownSize(PathBuf),
}

#[derive(Debug, clap::Args)]
struct GeneralOpts {
  /// Verbose output (can be specified multiple times)
  #[clap(short, long, global = true, action = clap::ArgAction::Count)]
  verbose: u8,

  /// Timeout for each request, e.g. "30s" or "2m 30s"
  #[clap(short, long, global = true, default_value = "30s", value_parser = humantime::parse_duration)]
  timeout: Duration,

  /// Do not display progress bars
  #[clap(long, global = true)]
  no_progress: bool,

  /// Display colors even when the NO_COLOR environment variable is set
  #[clap(short, long, global = true)]
  color: bool,

  /// Print the transfer summary as JSON on standard output
  #[clap(long, global = true)]
  json: bool,
}

#[derive(Debug, clap::Parser)]
#[clap(author, version, about, long_about = None)]
struct Opt {
  #[clap(flatten)]
  general_opts: GeneralOpts,

  #[clap(subcommand)]
  command: Command,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
  /// Download URL into a file
  Download {
    /// The URL to download
    #[clap(name = "URL")]
    url: Url,

    /// Output file, defaults to the last segment of the URL path
    #[clap(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
  },

  /// Upload FILE to URL
  Upload {
    /// The file to upload
    #[clap(name = "FILE")]
    file: PathBuf,

    /// The URL to upload to
    #[clap(name = "URL")]
    url: Url,

    /// HTTP method to send the file with
    #[clap(short, long, value_enum, default_value = "put")]
    method: UploadMethod,
  },
}

fn is_no_color_env_set() -> bool {
  match env::var("NO_COLOR") {
    Ok(val) => val != "0",
    Err(_) => false,
  }
}

fn get_log_level(verbose: u8) -> log::LevelFilter {
  match verbose {
    0 => log::LevelFilter::Off,
    1 => log::LevelFilter::Error,
    2 => log::LevelFilter::Warn,
    3 => log::LevelFilter::Info,
    4 => log::LevelFilter::Debug,
    _ => log::LevelFilter::Trace,
  }
}

fn init_logger(verbose: u8) -> bool {
  let logger = env_logger::Builder::new().filter_level(get_log_level(verbose)).try_init();
  if let Err(e) = &logger {
    eprintln!("Error initializing logger: {e}");
  }
  logger.is_ok()
}

fn print_json(summary: &Summary) -> Result<(), Error> {
  let stdout = io::stdout();
  let mut handle = stdout.lock();
  serde_json::to_writer_pretty(&mut handle, summary)?;
  writeln!(handle)?;
  Ok(())
}

macro_rules! fail {
  ($logger:expr, $e:expr) => {
    match $e {
      Ok(v) => v,
      Err(e) => {
        let logger: bool = $logger;
        if logger {
          error!("Error: {e}");
        } else {
          eprintln!("Error: {e}");
        }
        std::process::exit(1);
      }
    }
  };
}

fn main() {
  let start_time = Instant::now();
  let args = Opt::parse();
  let opts = args.general_opts;

  let have_logger = init_logger(opts.verbose);
  let settings = Settings { progress: !opts.no_progress, color: !is_no_color_env_set() || opts.color };
  let client = fail!(have_logger, transfer::create_client(opts.timeout));

  let summary = match args.command {
    Command::Download { url, output } => {
      let path = output.unwrap_or_else(|| transfer::default_output_path(&url));
      fail!(have_logger, transfer::download(&client, &url, &path, &settings))
    }
    Command::Upload { file, url, method } => {
      fail!(have_logger, transfer::upload(&client, method, &file, &url, &settings))
    }
  };

  if opts.json {
    fail!(have_logger, print_json(&summary));
  } else {
    eprintln!("{summary}");
  }

  debug!("Total time: {}", format_duration(Instant::now().duration_since(start_time)));
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn log_levels() {
    assert_eq!(get_log_level(0), log::LevelFilter::Off);
    assert_eq!(get_log_level(3), log::LevelFilter::Info);
    assert_eq!(get_log_level(9), log::LevelFilter::Trace);
  }

  #[test]
  fn parse_download() {
    let opt = Opt::try_parse_from(["pstream", "-vv", "download", "https://example.com/a.bin", "-o", "out.bin"]).unwrap();
    assert_eq!(opt.general_opts.verbose, 2);
    assert_eq!(opt.general_opts.timeout, Duration::from_secs(30));
    match opt.command {
      Command::Download { url, output } => {
        assert_eq!(url.as_str(), "https://example.com/a.bin");
        assert_eq!(output, Some(PathBuf::from("out.bin")));
      }
      Command::Upload { .. } => panic!("expected download"),
    }
  }

  #[test]
  fn parse_upload() {
    let opt =
      Opt::try_parse_from(["pstream", "upload", "in.bin", "https://example.com/up", "-m", "post", "--timeout", "2m"])
        .unwrap();
    assert_eq!(opt.general_opts.timeout, Duration::from_secs(120));
    match opt.command {
      Command::Upload { file, url, method } => {
        assert_eq!(file, PathBuf::from("in.bin"));
        assert_eq!(url.as_str(), "https://example.com/up");
        assert!(matches!(method, UploadMethod::Post));
      }
      Command::Download { .. } => panic!("expected upload"),
    }
  }

  #[test]
  fn clap_definition() {
    use clap::CommandFactory;
    Opt::command().debug_assert();
  }
}
