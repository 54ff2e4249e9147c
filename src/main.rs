#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fffinder_lib::run().await
}
