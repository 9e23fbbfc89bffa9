//! `dst-install` command-line entry point.
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;

use dst_install::cli::{Cli, Command};
use dst_install::commands;
use dst_install::logging::{Logger, init_subscriber};

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    if matches!(args.command, Command::Version) {
        commands::version::run();
        return ExitCode::SUCCESS;
    }

    let name = args.command.name();
    let log_file = init_subscriber(args.verbose, name);
    let log = Arc::new(Logger::new(Some(log_file)));

    let result = match &args.command {
        Command::Install(opts) => commands::install::run(&args.global, opts, &log),
        Command::Uninstall(opts) => commands::uninstall::run(&args.global, opts, &log),
        Command::Verify => commands::verify::run(&args.global, &log),
        Command::Version => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let status = commands::exit_status(&e);
            log.failure(&e, status);
            // The summary already names the log file once any task ran.
            if let Some(path) = log.log_path()
                && log.task_entries().is_empty()
            {
                log.info(&format!("log: {}", path.display()));
            }
            ExitCode::from(status)
        }
    }
}
