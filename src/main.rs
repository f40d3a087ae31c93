use color_eyre::eyre::Result;
use dotenv::dotenv;
use smokecheck_api::config::ApiConfig;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    let config = ApiConfig::from_env()?;

    // Falls back to the in-memory store when DATABASE_URL is unset
    smokecheck_api::start_server(config).await?;

    Ok(())
}
