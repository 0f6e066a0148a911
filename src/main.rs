//! rmdupes command-line entry point.

use std::io::{self, IsTerminal, Write};

use clap::Parser;
use rmdupes::{
    cli::Cli,
    config::Config,
    error::{ExitCode, StructuredError},
    logging::init_logging,
    output::OutputFormat,
    signal::{install_handler, ShutdownHandler},
};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if cli.no_color || !io::stdout().is_terminal() {
        yansi::disable();
    }
    let json_errors = Config::output_for_cli(&cli) == OutputFormat::Json;

    let shutdown = install_handler().unwrap_or_else(|e| {
        log::warn!("{e}; Ctrl+C will terminate immediately");
        ShutdownHandler::new()
    });

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout().lock();

    let result = rmdupes::run_app(cli, &shutdown, &mut input, &mut stdout);
    let _ = stdout.flush();

    match result {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            let exit_code = ExitCode::from_error(&err);
            log::debug!("Exiting with {:?}: {err:?}", exit_code);

            let structured = json_errors
                .then(|| serde_json::to_string_pretty(&StructuredError::new(&err, exit_code)).ok())
                .flatten();
            match structured {
                Some(json) => eprintln!("{json}"),
                None => eprintln!("[{}] Error: {err:#}", exit_code.code_prefix()),
            }

            std::process::exit(exit_code.as_i32());
        }
    }
}
