// Alert endpoints
//
// Listing is `POST alerts/{type}`, status changes are
// `POST alerts/{type}/status`. Alert ids are only unique per type.

use serde_json::json;
use tracing::debug;

use crate::client::SensorClient;
use crate::error::Error;
use crate::models::{AlertRecord, SensorKind};

impl SensorClient {
    /// List alerts for one channel.
    ///
    /// `POST alerts/{kind}` with `{deviceId, status?, limit}`. Omitting
    /// `status` returns alerts in every state.
    pub async fn alerts(
        &self,
        kind: SensorKind,
        device_id: &str,
        status: Option<&str>,
        limit: u32,
    ) -> Result<Vec<AlertRecord>, Error> {
        let url = self.endpoint_url(&format!("alerts/{kind}"))?;
        debug!(%kind, device_id, ?status, limit, "fetching alerts");

        let mut body = json!({
            "deviceId": device_id,
            "limit": limit,
        });
        if let Some(status) = status {
            body["status"] = json!(status);
        }
        self.post_list(url, &body).await
    }

    /// Move an alert to a new status.
    ///
    /// `POST alerts/{kind}/status` with `{alertId, status}`
    pub async fn update_alert_status(
        &self,
        kind: SensorKind,
        alert_id: u64,
        status: &str,
    ) -> Result<(), Error> {
        let url = self.endpoint_url(&format!("alerts/{kind}/status"))?;
        debug!(%kind, alert_id, status, "updating alert status");
        self.post_unit(
            url,
            &json!({
                "alertId": alert_id,
                "status": status,
            }),
        )
        .await
    }
}
