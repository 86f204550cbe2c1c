use clap::{Parser, Subcommand};
use cmd::inspect;
use colored::Colorize;
use common::{log_error, log_info, syslog};
use std::fmt;
use std::path::PathBuf;
mod cmd;

const BANNER: &str = r"
pyhost - PAM module host diagnostics

inspect a PAM configuration and print the module script and
per-service argument vectors a transaction would resolve.";

#[derive(Debug)]
struct PyCliError {
    message: String,
}

impl fmt::Display for PyCliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", "error:".red().bold(), self.message)
    }
}

#[derive(Debug)]
struct PyCliSuccess {
    message: String,
}

impl fmt::Display for PyCliSuccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", "success:".green().bold(), self.message)
    }
}

#[derive(Debug)]
struct PyCliInfo {
    message: String,
}

impl fmt::Display for PyCliInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", "info:".yellow().bold(), self.message)
    }
}

#[derive(Debug)]
enum PyCliResult {
    Success(Option<PyCliSuccess>),
    Info(PyCliInfo),
    Error(PyCliError),
}

impl fmt::Display for PyCliResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PyCliResult::Success(Some(ref success)) => write!(f, "{success}"),
            PyCliResult::Success(None) => Ok(()),
            PyCliResult::Error(ref error) => write!(f, "{error}"),
            PyCliResult::Info(ref info) => write!(f, "{info}"),
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    arg_required_else_help = true,
    about = &BANNER,
)]

struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Resolve a PAM configuration and show the service argument table")]
    Inspect {
        #[clap(long, short)]
        config: String,
        #[clap(long, short, help = "Print the table as JSON")]
        json: bool,
        #[clap(long, short, help = "Write the JSON dump to a file")]
        out: Option<PathBuf>,
    },
}

fn main() {
    syslog::init_cli_log().unwrap_or_else(|e| println!("{e:?}: Error initializing cli log:"));

    let cli_res = match Cli::parse().command {
        Some(Command::Inspect { config, json, out }) => {
            inspect::config(&config, json, out.as_deref())
        }
        _ => PyCliResult::Success(None),
    };

    match &cli_res {
        PyCliResult::Success(res) => {
            if let Some(res) = res {
                log_info!("{}", &res.message);
            }
        }
        PyCliResult::Error(res) => {
            log_error!("{}", &res.message);
        }
        PyCliResult::Info(_) => (),
    }

    println!("{cli_res}");
}
