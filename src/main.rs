//! labcost-server: lab cloud cost estimation service

#![allow(missing_docs)]

use labcost::server;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // Tracing is initialised inside run_server once logging config is known
    match server::builder::run_server().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
