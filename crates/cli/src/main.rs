use std::process::ExitCode;

fn main() -> ExitCode {
    faqbot_cli::run()
}
