mod layout;
mod replay;

use std::fs;
use std::io;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use phantom_core::{Filtered, Immediate};

#[derive(Parser)]
#[command(name = "phantom-cli")]
#[command(about = "Host tools for the Phantom keyboard firmware")]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the layout table as a matrix grid
    Layout {
        /// Emit an HTML page with the physical layout instead
        #[arg(long)]
        html: bool,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Run a switch script through the scan loop and print the reports
    Replay {
        /// Script of `press R C`, `release R C` and `scan [N]` lines
        script: String,
        /// Debounce by requiring 5 consistent scans, as the
        /// `debounce-filter` firmware build does
        #[arg(long)]
        filter: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match cli.command {
        Command::Layout { html, output } => {
            let rendered = if html {
                layout::generate_html()
            } else {
                layout::generate_grid()
            };

            match output {
                Some(path) => {
                    fs::write(&path, rendered).with_context(|| format!("writing {}", path))?;
                    log::info!("layout written to {}", path);
                }
                None => print!("{}", rendered),
            }
        }
        Command::Replay { script, filter } => {
            let source =
                fs::read_to_string(&script).with_context(|| format!("reading {}", script))?;
            let commands = replay::parse_script(&source)
                .with_context(|| format!("parsing {}", script))?;

            let mut out = io::stdout().lock();
            if filter {
                replay::run(&commands, Filtered::<5>::new(), &mut out)?;
            } else {
                replay::run(&commands, Immediate, &mut out)?;
            }
        }
    }

    Ok(())
}
