use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use drone_stack::cli::{Cli, Command};
use drone_stack::{BuildInfo, DeployError, Pipeline, config};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            let code = err
                .downcast_ref::<DeployError>()
                .map_or(1, DeployError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    if cli.command == Some(Command::Version) {
        println!("{}", BuildInfo::current());
        return Ok(());
    }

    let settings = config::load(&cli.args).context("cannot load configuration")?;
    Pipeline::new(settings).run()?;
    Ok(())
}
