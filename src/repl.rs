//! Interactive line session.
//!
//! Each line is a command; the current configuration and presentation live
//! in the [`Controller`] for the whole session. Limit edits are coalesced so
//! that a burst of `limit` lines re-renders once, with the last value.

use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::analysis::{Category, categorize};
use crate::controller::{Controller, LoadState, Toggle};
use crate::debounce::Coalescer;
use crate::render;

const HELP: &str = "\
Commands:
  open <FILE|URL>          analyze a presentation
  limit <N>                number of files to list (1-500)
  images|slides|other on|off
                           show or hide a category group
  show                     print the full report again
  preview <ENTRY> [OUT]    fetch an image; write it to OUT if given
  help                     this text
  quit                     leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(String),
    Limit(String),
    Toggle(Toggle, bool),
    Show,
    Preview {
        entry: String,
        output: Option<String>,
    },
    Help,
    Quit,
}

fn parse_switch(word: Option<&str>) -> Option<bool> {
    match word?.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

impl Command {
    /// Parse one input line; blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));

        let command = match word.to_ascii_lowercase().as_str() {
            "" => return Ok(None),
            "open" if !rest.is_empty() => Command::Open(rest.to_string()),
            "open" => return Err("usage: open <FILE|URL>".into()),
            "limit" => Command::Limit(rest.to_string()),
            toggle @ ("images" | "slides" | "other") => {
                let on = parse_switch(rest.split_whitespace().next())
                    .ok_or_else(|| format!("usage: {toggle} on|off"))?;
                let toggle = match toggle {
                    "images" => Toggle::Images,
                    "slides" => Toggle::Slides,
                    _ => Toggle::Other,
                };
                Command::Toggle(toggle, on)
            }
            "show" => Command::Show,
            "preview" => {
                let mut args = rest.split_whitespace();
                let entry = args
                    .next()
                    .ok_or_else(|| "usage: preview <ENTRY> [OUT]".to_string())?;
                Command::Preview {
                    entry: entry.to_string(),
                    output: args.next().map(str::to_string),
                }
            }
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(format!("unknown command: {other} (try `help`)")),
        };
        Ok(Some(command))
    }
}

fn render_files(controller: &Controller, out: &mut impl Write) -> Result<()> {
    if controller.session().is_some_and(|s| !s.is_empty()) {
        render::write_files(out, &controller.visible())?;
    }
    Ok(())
}

fn render_full(controller: &Controller, out: &mut impl Write) -> Result<()> {
    match (controller.state(), controller.session()) {
        (LoadState::Ready, Some(session)) => {
            render::write_report(out, session, controller.config())?
        }
        (LoadState::Failed, _) => {
            if let Some(message) = controller.error_message() {
                writeln!(out, "{message}")?;
            }
        }
        _ => writeln!(out, "No presentation loaded. Use `open <FILE>`.")?,
    }
    Ok(())
}

/// Run one non-limit command.
pub async fn execute(
    controller: &mut Controller,
    command: Command,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::Open(input) => {
            controller.load(&input).await;
            render_full(controller, out)?;
        }
        Command::Limit(raw) => {
            if controller.set_limit_input(&raw) {
                render_files(controller, out)?;
            }
        }
        Command::Toggle(toggle, on) => {
            controller.set_toggle(toggle, on);
            render_files(controller, out)?;
        }
        Command::Show => render_full(controller, out)?,
        Command::Preview { entry, output } => {
            if categorize(&entry) != Category::Images {
                writeln!(out, "only images can be previewed")?;
                return Ok(());
            }
            // Failures are logged by the controller and otherwise ignored.
            if let Some(data) = controller.preview(&entry).await {
                match output {
                    Some(path) => {
                        tokio::fs::write(&path, &data).await?;
                        writeln!(out, "{entry} -> {path} ({} bytes)", data.len())?;
                    }
                    None => writeln!(out, "{entry}: {} bytes", data.len())?,
                }
            }
        }
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => {}
    }
    out.flush()?;
    Ok(())
}

/// Read commands from `input` until `quit` or end of input.
pub async fn run<R>(controller: &mut Controller, input: R, out: &mut impl Write) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut limit_edits = Coalescer::default();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match Command::parse(&line) {
                    Ok(Some(Command::Limit(raw))) => limit_edits.push(raw),
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => execute(controller, command, out).await?,
                    Ok(None) => {}
                    Err(message) => writeln!(out, "{message}")?,
                }
            }
            raw = limit_edits.settled() => {
                execute(controller, Command::Limit(raw), out).await?;
            }
        }
    }

    if let Some(raw) = limit_edits.flush() {
        execute(controller, Command::Limit(raw), out).await?;
    }
    Ok(())
}
