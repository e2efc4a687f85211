use std::process::ExitCode;

fn main() -> ExitCode {
    fstask_cli::run()
}
