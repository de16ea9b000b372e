use std::process::ExitCode;

fn main() -> ExitCode {
    smartbuy_cli::run()
}
