use offer_notifier::configuration::get_configuration;
use offer_notifier::startup::Application;
use offer_notifier::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("offer-notifier".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    //Panic if we can't read configuration
    let configuration = get_configuration().expect("Failed to read configuration.");
    let application = Application::build(configuration).await?;
    tracing::info!(port = application.port(), "Listening for offer notifications");
    application.run_until_stopped().await?;
    Ok(())
}
