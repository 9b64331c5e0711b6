//! `generate-plantuml` - `PlantUML` pre-commit hook.
//!
//! Renders every diagram file passed on the command line with the `PlantUML`
//! jar, downloading the jar on first use.

mod error;
mod generate;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use generate::GenerateArgs;
use output::Output;

/// PlantUML generator hook.
#[derive(Parser)]
#[command(name = "generate-plantuml", version, about)]
struct Cli {
    #[command(flatten)]
    args: GenerateArgs,
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables DEBUG, otherwise use RUST_LOG or default to WARN
    let filter = if cli.args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = cli.args.execute(&output) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
