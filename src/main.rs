use smsoptin::configuration::get_configuration;
use smsoptin::startup::Application;
use smsoptin::telemetry::init_subscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let configuration = get_configuration()?;
    init_subscriber("info".into(), std::io::stdout, &configuration.telemetry)?;

    let application = Application::build(configuration).await?;
    application.run_until_stopped().await?;
    Ok(())
}
