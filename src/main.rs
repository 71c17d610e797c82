use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use zcalc::calculator::{copy_to_clipboard, tokenize};
use zcalc::config::{Config, OutputFormat};
use zcalc::{DisplaySnapshot, Engine};

/// Immediate-execution calculator driven by keypad labels.
///
/// Keys are button labels such as `7`, `.`, `+`, `*`, `/`, `=`, `%`, `1/x`,
/// `sqrt`, `+/-`, `CE`, `C` and `Backspace`. With no keys, lines are read
/// from stdin and both display lines are printed after each one.
#[derive(Parser, Debug)]
#[command(name = "zcalc", version, about)]
struct Cli {
    /// Keys to press, e.g. `12 + 3 =`.
    keys: Vec<String>,

    /// Config file to use instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format, overriding the config file.
    #[arg(long, value_enum)]
    output: Option<OutputFormat>,

    /// Only print the current line.
    #[arg(long)]
    no_history: bool,

    /// Copy the final result to the clipboard.
    #[arg(long)]
    copy: bool,

    /// Print the displays after every key instead of once per line.
    #[arg(long)]
    trace: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

struct Printer {
    output: OutputFormat,
    show_history: bool,
}

impl Printer {
    fn print(&self, snapshot: &DisplaySnapshot) -> Result<()> {
        let text = match self.output {
            OutputFormat::Plain => snapshot.render_plain(self.show_history),
            OutputFormat::Json => {
                serde_json::to_string(snapshot).context("Failed to serialize display")?
            }
        };
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", text)?;
        stdout.flush()?;
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load_default()?,
    };

    let printer = Printer {
        output: cli.output.unwrap_or(config.output),
        show_history: config.show_history && !cli.no_history,
    };

    let mut engine = Engine::new();

    if cli.keys.is_empty() {
        run_interactive(&mut engine, &printer, cli.trace)?;
    } else {
        let line = cli.keys.join(" ");
        run_line(&mut engine, &line, &printer, cli.trace)?;
        if !cli.trace {
            printer.print(&engine.snapshot())?;
        }
    }

    if cli.copy || config.copy_result {
        let snapshot = engine.snapshot();
        if let Err(e) = copy_to_clipboard(snapshot.text_for_clipboard()) {
            tracing::warn!("{}", e);
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_line(engine: &mut Engine, line: &str, printer: &Printer, trace: bool) -> Result<()> {
    if !trace {
        return engine
            .press_line(line)
            .with_context(|| invalid_input(line));
    }

    for key in tokenize(line).with_context(|| invalid_input(line))? {
        engine.press(key).with_context(|| invalid_input(line))?;
        printer.print(&engine.snapshot())?;
    }
    Ok(())
}

fn invalid_input(line: &str) -> String {
    format!("Invalid input {:?}", line)
}

fn run_interactive(engine: &mut Engine, printer: &Printer, trace: bool) -> Result<()> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read from stdin")?;
        let line = line.trim();

        if line.is_empty() {
            continue;
        }
        if matches!(line, "quit" | "exit") {
            break;
        }

        // A bad key only rejects its line; the session continues.
        match run_line(engine, line, printer, trace) {
            Ok(()) if !trace => printer.print(&engine.snapshot())?,
            Ok(()) => {}
            Err(e) => eprintln!("error: {:#}", e),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn printer() -> Printer {
        Printer {
            output: OutputFormat::Plain,
            show_history: true,
        }
    }

    #[test]
    fn test_trace_mode_reports_the_rejected_line() {
        let mut engine = Engine::new();
        let err = run_line(&mut engine, "2 ^ 2", &printer(), true).unwrap_err();
        assert_eq!(
            format!("{:#}", err),
            r#"Invalid input "2 ^ 2": unknown key "^""#
        );
        assert_eq!(engine.current_display(), "0");
    }

    #[test]
    fn test_line_mode_reports_the_rejected_line() {
        let mut engine = Engine::new();
        let err = run_line(&mut engine, "4 + hello", &printer(), false).unwrap_err();
        assert!(format!("{:#}", err).starts_with(r#"Invalid input "4 + hello""#));
    }
}
