//! SofaClean Site - binary entry point
//! Delegates to the library for all app logic.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sofaclean_site::run().await
}
