//! Bio command implementation

use super::with_spinner;
use crate::config::Config;
use anyhow::Result;
use libris_core::IngestionFlow;

/// Print a short biography of an author
pub async fn bio(config: &Config, author: &str) -> Result<()> {
    let flow = IngestionFlow::new(config.service()?).with_timeout(config.timeout);

    let bio = with_spinner(format!("Looking up {}", author), flow.author_bio(author)).await?;

    println!("{}\n\n{}", author, bio);
    Ok(())
}
