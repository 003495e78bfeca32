use std::process::ExitCode;

fn main() -> ExitCode {
    innerspace_cli::run()
}
