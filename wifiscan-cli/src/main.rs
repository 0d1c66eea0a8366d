#[tokio::main]
async fn main() -> anyhow::Result<()> {
    wifiscan_cli::run().await
}
