use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, LevelFilter};

use layersynth::{
    problem::{demo_suite, DEMO_SUITES},
    synthesize,
    synthesize_restricted,
    Outcome,
    Problem,
};

#[derive(Parser)]
#[command(name = "layersynth")]
#[command(about = "Bottom-up synthesis of expressions from examples", long_about = None)]
struct Cli {
    /// Raise the log level, repeat for more
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only let `*` and `<` combine variables and constants
    #[arg(long, global = true)]
    restricted: bool,

    /// Override the max depth of every problem
    #[arg(long, global = true)]
    depth: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve the problem described by a JSON file
    Solve {
        path: PathBuf,
    },
    /// Run one of the built-in problem sets, or all of them
    Demo {
        suite: Option<String>,
    },
}

fn init_logging(verbose: u8) {
    if verbose == 0 {
        colog::init();
        return;
    }

    let level = match verbose {
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    colog::default_builder()
        .filter_level(level)
        .init();
}

fn solve(problem: &Problem, restricted: bool) -> Result<()> {
    let synthesis = if restricted {
        synthesize_restricted(problem)?
    } else {
        synthesize(problem)?
    };

    println!(" ");
    println!("{problem}");
    match &synthesis.outcome {
        Outcome::Found(expr) => println!("Result: {expr}"),
        Outcome::NoSolution => println!("Result: no solution"),
    }
    info!(
        "{} candidates generated, {} retained, {} layers",
        synthesis.stats.generated,
        synthesis.stats.retained,
        synthesis.stats.layers,
    );

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut problems = match &cli.command {
        Commands::Solve { path } => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let problem = Problem::from_json(&text)
                .with_context(|| format!("parsing {}", path.display()))?;

            vec![problem]
        },
        Commands::Demo { suite: Some(name) } => match demo_suite(name) {
            Some(suite) => suite,
            None => bail!("unknown suite `{name}`, expected one of {DEMO_SUITES:?}"),
        },
        Commands::Demo { suite: None } => DEMO_SUITES.iter()
            .filter_map(|name| demo_suite(name))
            .flatten()
            .collect(),
    };

    if let Some(depth) = cli.depth {
        for problem in &mut problems {
            problem.max_depth = depth;
        }
    }

    let restricted = cli.restricted
        || matches!(&cli.command, Commands::Demo { suite: Some(name) } if name == "1b");

    for problem in &problems {
        solve(problem, restricted)?;
    }

    Ok(())
}
