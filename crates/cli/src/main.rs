use std::process::ExitCode;

fn main() -> ExitCode {
    santral_cli::run()
}
