use std::process::ExitCode;

fn main() -> ExitCode {
    eshop_deals_cli::run()
}
