use super::prompt::Console;
use crate::Result;
use crate::config::ConfigStore;
use crate::tmdb::MetadataProvider;
use std::io::{BufRead, Write};
use tracing::warn;

/// Probe the metadata service with the resolved key
pub async fn test_connection<P, R, W>(
    provider: &P,
    store: &ConfigStore,
    console: &mut Console<R, W>,
) -> Result<()>
where
    P: MetadataProvider + ?Sized,
    R: BufRead,
    W: Write,
{
    console.say(format!("Testing connection to {}...", provider.name()))?;
    provider.probe().await?;

    if let Err(e) = store.mark_credentials_used() {
        warn!("Failed to update credentials: {}", e);
    }
    console.say(format!("Connected to {}.", provider.name()))?;
    console.say(format!("Image base URL: {}", provider.image_base_url().await))
}
