//! Diode I-U characterization from the command line
//!
//! Drives an Arduino-class instrument that applies a DAC voltage across a
//! diode in series with a 220 Ω sense resistor, sweeps the output and reports
//! the current-voltage curve with standard errors.
//!
//! ```bash
//! diodaq list --identify
//! diodaq info --port ttyACM
//! diodaq scan --port ttyACM --start 0 --stop 3.3 --repeats 5 --output-dir runs/
//! ```

mod connect;
mod report;
mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use daq_detect::identify_port;
use daq_protocol::{raw_to_volt, FULL_SCALE_VOLTS};
use daq_scan::{save_csv, save_in_dir, scan_with_progress, ScanParams};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use settings::Settings;

#[derive(Parser)]
#[command(name = "diodaq", version)]
#[command(about = "Measure diode current-voltage curves", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List serial ports and simulated instruments
    List {
        /// Ask each serial port for its identification
        #[arg(long)]
        identify: bool,
    },

    /// Show an instrument's identification and programmed output
    Info {
        /// Substring of the instrument address
        #[arg(long)]
        port: Option<String>,
    },

    /// Sweep the output and measure the I-U curve
    Scan {
        /// Substring of the instrument address
        #[arg(long)]
        port: Option<String>,

        /// First output voltage
        #[arg(long, default_value_t = 0.0)]
        start: f64,

        /// Last output voltage
        #[arg(long, default_value_t = FULL_SCALE_VOLTS)]
        stop: f64,

        /// Samples per step (defaults to the settings file)
        #[arg(long)]
        repeats: Option<usize>,

        /// Write the result to this CSV file
        #[arg(long, conflicts_with = "output_dir")]
        output: Option<PathBuf>,

        /// Write the result to the next free measurements_<n>.csv in this directory
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Show the settings file, optionally writing the current settings to it
    Config {
        /// Create or overwrite the settings file
        #[arg(long)]
        write: bool,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so tables and CSV paths on stdout stay clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "diodaq=info,daq_protocol=info,daq_detect=info,daq_scan=info,daq_sim=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = Settings::load();

    match cli.command {
        Commands::List { identify } => list(identify, &settings),
        Commands::Info { port } => show_info(port.as_deref(), &settings),
        Commands::Scan {
            port,
            start,
            stop,
            repeats,
            output,
            output_dir,
        } => {
            let repeats = repeats.unwrap_or(settings.default_repeats);
            let params = ScanParams::from_volts(start, stop, repeats)?;
            run_scan(port.as_deref(), params, output, output_dir, &settings)
        }
        Commands::Config { write } => show_config(write, &settings),
    }
}

fn list(identify: bool, settings: &Settings) -> Result<()> {
    let registry = settings.registry();

    let ports = registry
        .enumerate_ports()
        .context("failed to enumerate serial ports")?;
    for port in &ports {
        if !identify {
            println!("{}", port.display_label());
            continue;
        }
        match identify_port(&port.address(), &settings.serial_config()) {
            Ok(id) => println!("{}: {}", port.display_label(), id.trim()),
            Err(e) => println!("{}: no identification ({})", port.display_label(), e),
        }
    }
    for address in registry.virtual_addresses() {
        println!("{} (simulated)", address);
    }

    Ok(())
}

fn show_info(port: Option<&str>, settings: &Settings) -> Result<()> {
    let search = connect::search_string(port, settings)?;
    let mut channel = connect::open(search, settings)?;

    let identification = channel.identify().context("identification query failed")?;
    let output = channel.get_output().context("output read-back failed")?;

    println!("Address:  {}", channel.address());
    println!("Identity: {}", identification);
    println!("Output:   {} raw ({:.3} V)", output, raw_to_volt(output));

    channel.close();
    Ok(())
}

fn run_scan(
    port: Option<&str>,
    params: ScanParams,
    output: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    settings: &Settings,
) -> Result<()> {
    // Reject bad parameters before touching any hardware
    params.validate()?;

    let search = connect::search_string(port, settings)?;
    let mut channel = connect::open(search, settings)?;

    let mut last_decile = 0;
    let mut progress = |step: usize, total: usize| {
        let decile = step * 10 / total;
        if decile > last_decile {
            last_decile = decile;
            info!("{}% done", decile * 10);
        }
    };

    let result = scan_with_progress(&mut channel, params, &mut progress)
        .with_context(|| format!("scan on {} failed", channel.address()))?;
    channel.close();

    print!("{}", report::format_table(&result));
    info!("{}", report::summary_line(&result));

    let saved = match (output, output_dir.or_else(|| settings.output_dir.clone())) {
        (Some(path), _) => Some(save_csv(&result, &path)?),
        (None, Some(dir)) => Some(save_in_dir(&result, &dir)?),
        (None, None) => None,
    };
    if let Some(path) = saved {
        println!("Saved {}", path.display());
    }

    Ok(())
}

fn show_config(write: bool, settings: &Settings) -> Result<()> {
    if write {
        let path = settings.save().map_err(anyhow::Error::msg)?;
        println!("Wrote {}", path.display());
    } else if let Some(path) = Settings::settings_path() {
        println!("Settings file: {}", path.display());
    }

    println!("{}", serde_json::to_string_pretty(settings)?);
    Ok(())
}
