use std::process::ExitCode;

fn main() -> ExitCode {
    match slugsync::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            slugsync::ui::output::error(format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
