#![allow(missing_docs)]

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    nutriscan_lib::run().await
}
