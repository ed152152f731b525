use std::process::ExitCode;

fn main() -> ExitCode {
    bookery_cli::run()
}
