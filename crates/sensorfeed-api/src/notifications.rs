// Push notification registration

use serde_json::json;
use tracing::debug;

use crate::client::SensorClient;
use crate::error::Error;

impl SensorClient {
    /// Register a device push token with the backend.
    ///
    /// `POST notifications/register` with `{pushToken, platform}`
    pub async fn register_push_token(&self, token: &str, platform: &str) -> Result<(), Error> {
        let url = self.endpoint_url("notifications/register")?;
        debug!(platform, "registering push token");
        self.post_unit(
            url,
            &json!({
                "pushToken": token,
                "platform": platform,
            }),
        )
        .await
    }
}
