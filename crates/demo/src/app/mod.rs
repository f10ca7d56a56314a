mod bootstrap;
mod config;
mod loop_runner;
mod scene;

use std::process::ExitCode;

use tracing::error;

pub(crate) fn main_entry() -> ExitCode {
    match bootstrap::build_app() {
        Ok(app) => loop_runner::run(app),
        Err(err) => {
            error!(error = %err, "bootstrap_failed");
            ExitCode::FAILURE
        }
    }
}
