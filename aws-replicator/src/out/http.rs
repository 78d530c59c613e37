use crate::config::TransportConfig;
use crate::envelope;
use crate::error::{ReplicationError, Result};
use crate::replicator_core::ResourceDescriptor;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::debug;

/// Posts envelopes to the running local instance. One attempt per call; a
/// failed post fails the resource's run.
pub struct HttpBridge {
    client: Client,
    url: String,
}

impl HttpBridge {
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let url = config.url();
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ReplicationError::transport(url.clone(), format!("client build error: {e}")))?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the number of bytes sent.
    pub async fn send(&self, descriptor: &ResourceDescriptor) -> Result<usize> {
        let body = envelope::encode(descriptor);
        let len = body.len();
        debug!(resource = %descriptor.label(), bytes = len, url = %self.url, "posting envelope");

        let resp = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                let kind = if e.is_timeout() { "timed out" } else { "send error" };
                ReplicationError::transport(self.url.clone(), format!("{} ({kind}): {e}", descriptor.label()))
            })?;

        if !resp.status().is_success() {
            let code = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ReplicationError::transport(
                self.url.clone(),
                format!("{} rejected: {code} - {body}", descriptor.label()),
            ));
        }
        Ok(len)
    }
}
