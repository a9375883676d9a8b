//! Game server binary.
//!
//! Serves the REST API and WebSocket event feeds for live sessions.
//! Bind address comes from the BIND_ADDR environment variable.

use goldshot::*;

#[tokio::main]
async fn main() {
    log();
    kys();
    hosting::Server::run().await.unwrap();
}
