use crate::clients::{MetadataExtractor, OpenGraphClient};
use crate::config::Config;

pub async fn cmd_extract(config: &Config, url: &str) -> anyhow::Result<()> {
    let client = OpenGraphClient::from_config(&config.extractor)?;
    let metadata = client.extract(url).await;

    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(())
}
