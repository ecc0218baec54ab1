// Sensor history endpoints
//
// `POST sensor/{type}/history` with `{deviceId, limit}`. Rows come back
// newest-first; ordering and deduplication are the caller's concern.

use serde_json::json;
use tracing::debug;

use crate::client::SensorClient;
use crate::error::Error;
use crate::models::{HistoryRecord, SensorKind};

impl SensorClient {
    /// Fetch up to `limit` most-recent readings for one channel.
    ///
    /// `POST sensor/{kind}/history`
    pub async fn history(
        &self,
        kind: SensorKind,
        device_id: &str,
        limit: u32,
    ) -> Result<Vec<HistoryRecord>, Error> {
        let url = self.endpoint_url(&format!("sensor/{kind}/history"))?;
        debug!(%kind, device_id, limit, "fetching history");
        self.post_list(
            url,
            &json!({
                "deviceId": device_id,
                "limit": limit,
            }),
        )
        .await
    }
}
