use std::process::ExitCode;

use clap::Parser;

mod cli;
mod consts;
mod driver;
mod io;
mod ops;
mod structure;
mod util;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("SIMFS_LOG", level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    init_logging(cli.verbose);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    match cli::run(&cli, &mut stdin.lock(), &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("simfs: {} (errno {})", err, err.errno());
            ExitCode::FAILURE
        }
    }
}
