//! dupescan - Content-Based Duplicate File Scanner
//!
//! Entry point for the dupescan CLI application.

use clap::Parser;
use dupescan::{
    cli::Cli,
    error::{ExitCode, StructuredError},
};

fn main() {
    let cli = Cli::parse();
    let json_errors = cli.json_errors;

    match dupescan::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            let exit_code = if err
                .downcast_ref::<dupescan::duplicates::FinderError>()
                .is_some_and(|e| matches!(e, dupescan::duplicates::FinderError::Interrupted))
            {
                ExitCode::Interrupted
            } else {
                ExitCode::GeneralError
            };

            if json_errors {
                let structured = StructuredError::new(&err, exit_code);
                if let Ok(json) = serde_json::to_string_pretty(&structured) {
                    eprintln!("{}", json);
                } else {
                    eprintln!("[{}] Error: {}", exit_code.code_prefix(), err);
                }
            } else {
                eprintln!("[{}] Error: {}", exit_code.code_prefix(), err);
            }

            std::process::exit(exit_code.as_i32());
        }
    }
}
