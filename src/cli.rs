//! Command line interface

use crate::session::{AcquisitionSettings, InsertOrder};
use crate::template::DEFAULT_TEMPLATE;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "aves",
    version,
    about = "Acquisition, visualization and exploration of sensor data",
    long_about = "Reads sensor samples from a serial device (or replays a log file), \
                  stores them on disk and plots them while they arrive."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log everything the crate does
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Acquire samples and plot them in real time
    Acquire(AcquireArgs),
    /// Plot a previously acquired log file
    Explore(ExploreArgs),
    /// Copy a project template into a directory
    Init(InitArgs),
}

/// Buffer insertion order
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderArg {
    /// Newest sample first
    #[default]
    LatestFirst,
    /// Arrival order
    Forward,
}

impl From<OrderArg> for InsertOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::LatestFirst => InsertOrder::LatestFirst,
            OrderArg::Forward => InsertOrder::Forward,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct AcquireArgs {
    /// Serial port to read from; an existing file is replayed instead
    #[arg(long, default_value = "COM5")]
    pub port: String,

    /// Skip saving acquired data to a file
    #[arg(long)]
    pub no_save: bool,

    /// Duration of the experiment in seconds (default: unlimited)
    #[arg(long, value_parser = parse_seconds)]
    pub time: Option<f64>,

    /// File to save the experiment into (default: data/<date>.txt)
    #[arg(long)]
    pub outfile: Option<PathBuf>,

    /// Samples to collect before each plot update
    #[arg(long, alias = "plot_every_n_samples", default_value_t = 10)]
    pub plot_every_n_samples: usize,

    /// Samples kept in the plot, 0 for unlimited
    #[arg(long, alias = "plot_win_size", default_value_t = 200)]
    pub plot_win_size: usize,

    /// Device columns, log layout and plot layout
    #[arg(long, default_value = crate::config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Order samples are kept in the plot buffer
    #[arg(long, value_enum, default_value_t = OrderArg::LatestFirst)]
    pub order: OrderArg,

    /// Do not open a window even if the configuration has a gui section
    #[arg(long)]
    pub headless: bool,
}

impl AcquireArgs {
    /// Log file to write, `None` when saving is disabled
    pub fn destination(&self) -> Option<PathBuf> {
        if self.no_save {
            return None;
        }
        Some(self.outfile.clone().unwrap_or_else(default_outfile))
    }

    /// Experiment duration; values too large for a `Duration` (including
    /// `inf`) mean unlimited
    pub fn time_limit(&self) -> Option<Duration> {
        self.time
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    pub fn window(&self) -> Option<usize> {
        (self.plot_win_size > 0).then_some(self.plot_win_size)
    }

    pub fn settings(&self, x_column: Option<String>) -> AcquisitionSettings {
        AcquisitionSettings {
            batch_size: self.plot_every_n_samples,
            window: self.window(),
            time_limit: self.time_limit(),
            order: self.order.into(),
            x_column,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ExploreArgs {
    /// Log file to load (a file dialog opens when omitted)
    #[arg(long)]
    pub filename: Option<PathBuf>,

    /// Log layout and plot layout
    #[arg(long, default_value = crate::config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Print a summary instead of opening a window
    #[arg(long)]
    pub headless: bool,
}

#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    /// Template to use
    #[arg(long, default_value = DEFAULT_TEMPLATE)]
    pub template: String,

    /// Directory the template is copied into (a folder dialog opens when omitted)
    #[arg(long)]
    pub destdir: Option<PathBuf>,
}

/// `data/<YYYY_MM_DD-HH.MM.SS>.txt` for the current local time
pub fn default_outfile() -> PathBuf {
    PathBuf::from("data").join(
        chrono::Local::now()
            .format("%Y_%m_%d-%H.%M.%S.txt")
            .to_string(),
    )
}

fn parse_seconds(text: &str) -> Result<f64, String> {
    let secs: f64 = text
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", text))?;
    if secs.is_nan() || secs < 0.0 {
        return Err(format!("duration must be non-negative, got {}", text));
    }
    Ok(secs)
}
