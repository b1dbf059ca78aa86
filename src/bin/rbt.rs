use std::io;
use std::path::PathBuf;

use clap::Parser;
use rb_index::driver::{self, DEFAULT_SCENARIO};
use rb_index::{DriverConfig, Key, OutputFormat};

/// Insert keys into a red-black tree and print the in-order sequence
/// after every insertion.
#[derive(Parser, Debug)]
#[command(name = "rbt", version, about)]
struct Args {
    /// Keys to insert, in order (defaults to 0 1 6 3 2 4)
    #[arg(allow_negative_numbers = true, conflicts_with = "keys_file")]
    keys: Vec<Key>,

    /// CSV file with a `key` column to read keys from
    #[arg(long, env = "RBT_KEYS_FILE")]
    keys_file: Option<PathBuf>,

    /// Output format for step records
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, env = "RBT_FORMAT")]
    format: OutputFormat,

    /// Skip full-tree validation after each step
    #[arg(long)]
    no_check: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    rb_index::logging::init("warn");
    let args = Args::parse();

    let keys = if let Some(path) = &args.keys_file {
        driver::load_keys_file(path)?
    } else if args.keys.is_empty() {
        DEFAULT_SCENARIO.to_vec()
    } else {
        args.keys
    };

    let config = DriverConfig {
        keys,
        format: args.format,
        check: !args.no_check,
    };

    let stdout = io::stdout();
    driver::run(&config, stdout.lock())?;
    Ok(())
}
