use aws_config::{BehaviorVersion, Region, SdkConfig};
use tracing::debug;

/// Load AWS configuration from the standard environment/profile chain,
/// optionally pinning the region.
pub async fn load_sdk_config(region: Option<String>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(Region::new(region));
    }

    let config = loader.load().await;
    debug!(region = ?config.region(), "loaded AWS configuration");
    config
}
