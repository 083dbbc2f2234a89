//! Command-line entry point for pptx-weigh.
//!
//! With a FILE argument a single report (or a single entry's content with
//! `--preview`) is written and the program exits. Without one, or with `-i`,
//! commands are read from stdin.

use anyhow::Result;
use clap::Parser;
use std::io::Write;
use std::process::ExitCode;
use tokio::io::{AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use pptx_weigh::{Cli, Controller, LoadError, LoadState, format_bytes, render, repl};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut controller = Controller::new(cli.display_config());

    if cli.is_interactive() {
        let mut stdout = std::io::stdout();
        if let Some(file) = &cli.file {
            repl::execute(&mut controller, repl::Command::Open(file.clone()), &mut stdout).await?;
        } else {
            writeln!(stdout, "Type `help` for commands.")?;
        }
        repl::run(&mut controller, BufReader::new(tokio::io::stdin()), &mut stdout).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(file) = cli.file.as_deref() else {
        return Ok(ExitCode::FAILURE);
    };

    if controller.load(file).await != LoadState::Ready {
        eprintln!(
            "{}",
            controller.error_message().unwrap_or(LoadError::USER_MESSAGE)
        );
        return Ok(ExitCode::FAILURE);
    }

    let code = match cli.preview.as_deref() {
        Some(entry) => write_entry(&controller, entry, cli.output.as_deref()).await?,
        None => {
            write_report(&controller, &cli)?;
            ExitCode::SUCCESS
        }
    };

    // Display network transfer statistics for HTTP sources
    if !cli.quiet
        && let Some(transferred) = controller
            .archive()
            .and_then(|a| a.reader().transferred_bytes())
    {
        eprintln!("\nTotal bytes transferred: {}", format_bytes(transferred));
    }

    Ok(code)
}

fn write_report(controller: &Controller, cli: &Cli) -> Result<()> {
    let Some(session) = controller.session() else {
        return Ok(());
    };
    let mut stdout = std::io::stdout().lock();
    if cli.json {
        render::write_json(&mut stdout, session, controller.config())?;
    } else {
        render::write_report(&mut stdout, session, controller.config())?;
    }
    Ok(())
}

/// Write one entry's content to `output` or stdout.
async fn write_entry(controller: &Controller, entry: &str, output: Option<&str>) -> Result<ExitCode> {
    // The reason is already logged by the controller.
    let Some(data) = controller.preview(entry).await else {
        return Ok(ExitCode::FAILURE);
    };

    match output {
        Some(path) => {
            tokio::fs::write(path, &data).await?;
            tracing::info!(entry, path, bytes = data.len(), "entry written");
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(&data).await?;
            stdout.flush().await?;
        }
    }
    Ok(ExitCode::SUCCESS)
}
