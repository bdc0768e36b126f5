#![warn(clippy::all)]

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const BAR_COLOR: &str =
  "{msg}: {bar:40.cyan/blue} {percent:>3}%  {bytes:>9}/{total_bytes} {bytes_per_sec:>10} {elapsed:>4} ETA: {eta:>4}";
const BAR_PLAIN: &str =
  "{msg}: {bar:40} {percent:>3}%  {bytes:>9}/{total_bytes} {bytes_per_sec:>10} {elapsed:>4} ETA: {eta:>4}";
const SPINNER_COLOR: &str = "{msg}: {spinner:.cyan/blue}  {bytes:>9} {bytes_per_sec:>10} {elapsed:>4}";
const SPINNER_PLAIN: &str = "{msg}: {spinner}  {bytes:>9} {bytes_per_sec:>10} {elapsed:>4}";

/// Creates a progress bar when the length of the transfer is known, or a spinner otherwise.
pub fn create_progress(msg: String, len: Option<u64>, color: bool) -> ProgressBar {
  match len {
    Some(len) => create_progress_bar(msg, len, color),
    None => create_progress_spinner(msg, color),
  }
}

fn create_progress_bar(msg: String, len: u64, color: bool) -> ProgressBar {
  let style = ProgressStyle::default_bar().template(if color { BAR_COLOR } else { BAR_PLAIN });
  let bar = ProgressBar::new(len);
  let bar = if let Ok(style) = style {
    bar.with_style(style)
  } else {
    bar
  };

  bar.set_message(msg);
  bar
}

fn create_progress_spinner(msg: String, color: bool) -> ProgressBar {
  let style = ProgressStyle::default_spinner().template(if color { SPINNER_COLOR } else { SPINNER_PLAIN });
  let bar = ProgressBar::new_spinner();
  let bar = if let Ok(style) = style {
    bar.with_style(style.tick_strings(&[r"◧", r"◩", r"⬒", r"⬔", r"◨", r"◪", r"⬓", r"⬕"]))
  } else {
    bar
  };

  bar.enable_steady_tick(Duration::from_millis(100));
  bar.set_message(msg);
  bar
}
