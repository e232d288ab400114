use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use edgelink::{bug_byte, SolveConfig};

/// Solve Jane Street's Bug Byte puzzle and print the word spelled by its shortest path.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Give up after this many seconds
    #[arg(long, value_name = "SECS", default_value_t = 60, conflicts_with = "no_time_limit")]
    time_limit: u64,

    /// Search for as long as it takes
    #[arg(long)]
    no_time_limit: bool,

    /// Log every encoding step and solver pass
    #[arg(short, long)]
    debug: bool,

    /// Print every solved edge weight as well
    #[arg(long)]
    show_weights: bool,
}

impl Cli {
    fn config(&self) -> SolveConfig {
        match self.no_time_limit {
            true => SolveConfig::without_time_limit(),
            false => SolveConfig::with_time_limit(Duration::from_secs(self.time_limit)),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    edgelink::log::init_logger(cli.debug);

    match try_main(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let puzzle = bug_byte().map_err(|reasons| format!("malformed puzzle: {reasons:?}"))?;
    let config = cli.config();
    log::debug!("solving with {:?}", config);
    let solved = puzzle.solve(&config)?;

    if cli.show_weights {
        print!("{}", solved.graph());
        print!("{}", solved);
    }
    println!("{}", solved.message());

    Ok(())
}
