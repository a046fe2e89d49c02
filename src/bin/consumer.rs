use color_eyre::Result;
use nats_updates::{config::Config, consumer, setup::setup};

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config = Config::load().await?;
    consumer::run(&config).await?;

    Ok(())
}
