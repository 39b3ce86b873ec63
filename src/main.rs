use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match medai::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("MedAI backend stopped: {e}");
            ExitCode::FAILURE
        }
    }
}
