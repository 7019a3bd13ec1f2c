//! CLI entry point for the constrained facet coloring sampler

use clap::Parser;
use graftgrid::io::cli::{BatchRunner, Cli};

fn main() -> graftgrid::Result<()> {
    let cli = Cli::parse();
    let mut runner = BatchRunner::new(cli);
    runner.run()
}
