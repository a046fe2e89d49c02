use color_eyre::Result;
use nats_updates::{config::Config, producer, setup::setup};

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config = Config::load().await?;
    producer::run(&config).await?;

    Ok(())
}
