use anyhow::Context;
use subtrack::{
    configuration::get_configuration,
    startup::Application,
    telemetry::{get_subscriber, init_subscriber},
};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let subscriber = get_subscriber("subtrack".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let configuration = get_configuration().context("Failed to read configuration")?;

    let application = Application::build(configuration)
        .await
        .context("Failed to build application")?;

    application.run_until_stopped().await?;

    Ok(())
}
