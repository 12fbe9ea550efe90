//! Insights Backend - binary entry point
//! Delegates to the library for all app logic.

#[tokio::main]
async fn main() {
    if let Err(e) = insights_backend::run().await {
        eprintln!("insights-backend failed: {}", e);
        std::process::exit(1);
    }
}
