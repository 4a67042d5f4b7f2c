#[tokio::main]
async fn main() -> anyhow::Result<()> {
    nearsight_lib::run().await
}
