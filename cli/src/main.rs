use clap::Parser;
use log::info;
use sdcore::{core::load_config, utils::logging::init_logging};

mod commands;
use commands::{run_command, Commands};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Full path to sdtool TOML config
    #[clap(short, long, value_parser)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn main() {
    let args = Args::parse();

    let config = match load_config(args.config.as_deref()) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("[sdtool] Failed to load config: {err}");
            std::process::exit(1);
        }
    };
    if let Err(err) = init_logging(&config.output) {
        eprintln!("[sdtool] Could not setup logging: {err}");
    }

    let command = match args.command {
        Some(result) => result,
        None => {
            eprintln!("[sdtool] No command provided!");
            std::process::exit(1);
        }
    };

    match run_command(&command, &config) {
        Ok(output) => {
            info!("[sdtool] Command finished");
            println!("{output}");
        }
        Err(err) => {
            eprintln!("[sdtool] {err}");
            std::process::exit(1);
        }
    }
}
