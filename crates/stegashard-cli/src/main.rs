use std::io::{self, Write};

use clap::Parser;
use log::debug;

mod cli;
mod commands;

use cli::{CliArgs, Commands};

pub type CliResult<T> = stegashard_core::Result<T>;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    let result = match args.command {
        Commands::Split(args) => args.run().map(|_| 0),
        Commands::Embed(args) => args.run().map(|_| 0),
        Commands::Distribute(args) => args.run().map(|_| 0),
        Commands::Reconstruct(args) => args.run(),
    };

    match result {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => std::process::exit(report_failure(&mut io::stderr(), &e)),
    }
}

/// Writes the failure to `out` regardless of the log filter and returns the exit code for it.
fn report_failure(out: &mut impl Write, e: &stegashard_core::ShardError) -> i32 {
    debug!("{e:?}");
    let _ = writeln!(out, "Error: {e}");
    e.exit_code()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stegashard_core::ShardError;

    #[test]
    fn should_print_the_failure_and_return_its_exit_code() {
        let mut out = Vec::new();
        let code = report_failure(&mut out, &ShardError::MissingFragments(vec![2]));

        assert_eq!(code, 5);
        assert_eq!(String::from_utf8(out).unwrap(), "Error: Missing fragments: [2]\n");
    }
}
