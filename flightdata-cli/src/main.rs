use anyhow::Result;
use clap::{Parser, Subcommand};
use flightdata_cli::{commands, commands::align::AlignOptions, MethodArg};
use flightdata_core::RepairOptions;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "flightdata")]
#[command(about = "Flightdata - Frame alignment and repair for flight data recorder dumps", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Realign a raw dump to frame boundaries
    Align {
        /// Raw recorder dump
        #[arg(short, long)]
        input: String,

        /// Output file for aligned frames
        #[arg(short, long)]
        output: String,

        /// Aligner configuration (JSON)
        #[arg(long)]
        config: Option<String>,

        /// Words are stored big-endian
        #[arg(long)]
        big_endian: bool,

        /// Drop partial frames
        #[arg(long)]
        frames_only: bool,

        /// Smallest words-per-subframe to consider
        #[arg(long)]
        min_wps: Option<u16>,

        /// Largest words-per-subframe to consider
        #[arg(long)]
        max_wps: Option<u16>,

        /// First frame to write
        #[arg(long, allow_hyphen_values = true)]
        start: Option<i64>,

        /// Frame at which to stop writing
        #[arg(long, allow_hyphen_values = true)]
        stop: Option<i64>,

        /// Bytes read per chunk
        #[arg(long, default_value = "65536")]
        chunk_size: usize,

        /// Input holds packed 12-bit words
        #[arg(long)]
        packed_12bit: bool,

        /// Show a progress bar
        #[arg(long)]
        progress: bool,
    },

    /// Report where frame sync is acquired
    Identify {
        /// Raw recorder dump
        #[arg(short, long)]
        input: String,

        /// Output JSON file for sync points
        #[arg(short, long)]
        output: Option<String>,

        /// Aligner configuration (JSON)
        #[arg(long)]
        config: Option<String>,

        /// Words are stored big-endian
        #[arg(long)]
        big_endian: bool,

        /// Input holds packed 12-bit words
        #[arg(long)]
        packed_12bit: bool,
    },

    /// Unpack 12-bit words into 16-bit words
    Unpack {
        /// Packed input file
        #[arg(short, long)]
        input: String,

        /// Output file for 16-bit words
        #[arg(short, long)]
        output: String,

        /// Write big-endian words
        #[arg(long)]
        big_endian: bool,
    },

    /// Repair masked gaps in a JSON sample array
    Repair {
        /// Input JSON ({"data": [...], "mask": [...]})
        #[arg(short, long)]
        input: String,

        /// Output JSON file
        #[arg(short, long)]
        output: String,

        /// Gap filling method
        #[arg(long, value_enum, default_value = "interpolate")]
        method: MethodArg,

        /// Longest gap repaired in seconds (0 for no limit)
        #[arg(long, default_value = "10")]
        duration: f64,

        /// Sample rate in Hz
        #[arg(long, default_value = "1")]
        frequency: f64,

        /// Fill gaps at the start and end of the array
        #[arg(long)]
        extrapolate: bool,

        /// Fail if a gap is longer than the limit
        #[arg(long)]
        raise_duration: bool,

        /// Leave entirely masked input untouched instead of failing
        #[arg(long)]
        allow_entire_mask: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Execute command
    match cli.command {
        Commands::Align {
            input,
            output,
            config,
            big_endian,
            frames_only,
            min_wps,
            max_wps,
            start,
            stop,
            chunk_size,
            packed_12bit,
            progress,
        } => commands::align::execute(&AlignOptions {
            input: &input,
            output: &output,
            config: config.as_deref(),
            big_endian,
            frames_only,
            min_wps,
            max_wps,
            start,
            stop,
            chunk_size,
            packed_12bit,
            progress,
        }),

        Commands::Identify {
            input,
            output,
            config,
            big_endian,
            packed_12bit,
        } => commands::identify::execute(
            &input,
            output.as_deref(),
            config.as_deref(),
            big_endian,
            packed_12bit,
        )
        .map(|_| ()),

        Commands::Unpack {
            input,
            output,
            big_endian,
        } => commands::unpack::execute(&input, &output, big_endian),

        Commands::Repair {
            input,
            output,
            method,
            duration,
            frequency,
            extrapolate,
            raise_duration,
            allow_entire_mask,
        } => {
            let options = RepairOptions::new()
                .method(method.into())
                .repair_duration(Some(duration))
                .frequency(frequency)
                .extrapolate(extrapolate)
                .raise_duration_exceedance(raise_duration)
                .raise_entire_mask(!allow_entire_mask);
            commands::repair::execute(&input, &output, &options).map(|_| ())
        }
    }
}
