use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser as ClapParser, ValueEnum};
use rocket_lang::executor::Outcome;
use rocket_lang::lexeme::Number;
use rocket_lang::Rocket;

#[derive(ClapParser, Debug)]
#[command(author, version, about = "Compile and run a Rocket program")]
struct Cli {
    /// Path to the Rocket source file
    source: PathBuf,

    /// Grammar symbol to parse from
    #[arg(long, default_value = "statement_list")]
    root: String,

    /// Specify the log level of the pipeline.
    #[arg(value_enum, short, long, default_value_t = LogLevel::default())]
    verbosity: LogLevel,
}

/// Log level for the Rocket pipeline.
#[derive(ValueEnum, Clone, Default, Debug)]
enum LogLevel {
    #[default]
    #[value(alias("0"))]
    Error,
    #[value(alias("1"))]
    Warn,
    #[value(alias("2"))]
    Info,
    #[value(alias("3"))]
    Debug,
    #[value(alias("4"))]
    Trace,
}

impl From<&LogLevel> for log::Level {
    fn from(value: &LogLevel) -> Self {
        match value {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    simple_logger::init_with_level((&cli.verbosity).into()).expect("logger installs exactly once");

    let source = match std::fs::read_to_string(&cli.source) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("cannot read {}: {err}", cli.source.display());
            return ExitCode::FAILURE;
        }
    };

    let mut rocket = Rocket::new(cli.root);
    if let Err(err) = rocket.compile(&source) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    let stdout = io::stdout();
    let mut sink = |text: &str| {
        let mut handle = stdout.lock();
        let _ = writeln!(handle, "{text}");
    };

    let mut outcome = match rocket.run(&mut sink) {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    loop {
        match outcome {
            Outcome::Done(_) => break,
            Outcome::NeedsInput { resume_pc } => {
                let mut line = String::new();
                if io::stdin().lock().read_line(&mut line).unwrap_or(0) == 0 {
                    eprintln!("expected input but stdin was closed");
                    return ExitCode::FAILURE;
                }
                let value = match parse_input(line.trim()) {
                    Some(value) => value,
                    None => {
                        eprintln!("could not parse '{}' as a number", line.trim());
                        return ExitCode::FAILURE;
                    }
                };
                outcome = match rocket.resume(&mut sink, value, resume_pc) {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        eprintln!("{err}");
                        return ExitCode::FAILURE;
                    }
                };
            }
        }
    }

    ExitCode::SUCCESS
}

fn parse_input(text: &str) -> Option<Number> {
    if let Ok(i) = text.parse::<i64>() {
        return Some(Number::Int(i));
    }
    text.parse::<f64>().ok().map(Number::Float)
}
