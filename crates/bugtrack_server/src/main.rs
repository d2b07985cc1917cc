use bugtrack_server::api::setup::setup_logging;
use bugtrack_server::start_main_server;
use tracing::error;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // soft fail, the server still runs without structured logs
    if let Err(e) = setup_logging() {
        eprintln!("{}", e);
    }

    start_main_server()
        .await
        .inspect_err(|e| error!("Server exited with error: {:?}", e))
}
