pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "bookery",
    about = "Bookery operator CLI",
    long_about = "Operate Bookery migrations, runtime readiness, and reservation inspection.",
    after_help = "Examples:\n  bookery migrate\n  bookery doctor --json\n  bookery list --order newest"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Validate config, database connectivity, and schema readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Print active reservations in the selected order")]
    List {
        #[arg(long, value_enum, default_value = "schedule", help = "Listing order")]
        order: OrderArg,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OrderArg {
    /// Date and time ascending.
    Schedule,
    /// Most recently created first.
    Newest,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::List { order } => commands::list::run(order),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
