//! Mudblood Layout CLI
//!
//! Usage:
//!   mudblood-layout [OPTIONS] [FILE]
//!
//! Options:
//!   -c, --config <FILE>        Solver configuration (TOML format)
//!   -m, --max-variables <N>    Override the solver variable cap
//!   -e, --exact                Print exact rational values
//!   -v, --verbose              Log solver progress to stderr
//!   -h, --help                 Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use mudblood_layout::layout::{Rational, ResolvedNode};
use mudblood_layout::{
    solve_document_with_config, LayoutError, ResolvedLayout, SolveError, SolverConfig,
};

#[derive(Parser)]
#[command(name = "mudblood-layout")]
#[command(about = "Solve box layouts declared as linear constraints")]
struct Cli {
    /// Layout document (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Solver configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum number of solver variables (six per node)
    #[arg(short, long)]
    max_variables: Option<usize>,

    /// Print exact rational values instead of decimals
    #[arg(short, long)]
    exact: bool,

    /// Log solver progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn setup_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("mudblood_layout=debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    // Nothing piped in and no file given: show usage instead of blocking
    if cli.input.is_none() && io::stdin().is_terminal() {
        let _ = Cli::command().print_help();
        return;
    }

    let mut config = match &cli.config {
        Some(path) => match SolverConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => SolverConfig::default(),
    };
    if let Some(max_variables) = cli.max_variables {
        config = config.with_max_variables(max_variables);
    }

    // Read input
    let (source, filename) = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => (buffer, "<stdin>".to_string()),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    match solve_document_with_config(&source, &config) {
        Ok(layout) => print_layout(&layout, cli.exact),
        Err(SolveError::Layout(LayoutError::Parse {
            node,
            attribute,
            expression,
            error,
        })) => {
            eprintln!("Error in {}: {}.{} = {}", filename, node, attribute, expression);
            eprint!("{}", error.format(&expression, &format!("{}.{}", node, attribute)));
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error in {}: {}", filename, e);
            std::process::exit(1);
        }
    }
}

fn print_layout(layout: &ResolvedLayout, exact: bool) {
    fn value(v: Rational, exact: bool) -> String {
        if exact {
            v.to_string()
        } else {
            format!("{:.1}", v.to_f64())
        }
    }

    fn print_tree(node: &ResolvedNode, depth: usize, exact: bool) {
        let indent = "  ".repeat(depth);
        let g = &node.geometry;
        println!(
            "{}[{}] {} x={} y={} w={} h={} right={} bottom={}",
            indent,
            node.id,
            node.kind,
            value(g.x, exact),
            value(g.y, exact),
            value(g.w, exact),
            value(g.h, exact),
            value(g.right, exact),
            value(g.bottom, exact),
        );
        for child in &node.children {
            print_tree(child, depth + 1, exact);
        }
    }

    print_tree(&layout.root, 0, exact);
}
