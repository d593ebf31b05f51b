use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;
use url::Url;

use crate::errors::{BulletinError, BulletinResult};
use crate::sources::traits::AnnouncementSource;

/// Payloads above this size are refused
const MAX_PAYLOAD_SIZE: u64 = 5 * 1024 * 1024;

const USER_AGENT: &str = concat!("bulletin/", env!("CARGO_PKG_VERSION"));

/// Fetches the announcement list from an HTTP(S) endpoint
pub struct HttpAnnouncementSource {
    client: Client,
    endpoint: Url,
}

impl HttpAnnouncementSource {
    pub fn new(endpoint: &str, timeout: Duration) -> BulletinResult<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| BulletinError::InvalidUrl(format!("{}: {}", endpoint, e)))?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(BulletinError::InvalidUrl(format!(
                "unsupported scheme: {}",
                endpoint.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl AnnouncementSource for HttpAnnouncementSource {
    fn base_url(&self) -> Option<Url> {
        Some(self.endpoint.clone())
    }

    fn fetch(&self) -> BulletinResult<Vec<u8>> {
        debug!(endpoint = %self.endpoint, "fetching announcements");

        let response = self
            .client
            .get(self.endpoint.clone())
            .send()?
            .error_for_status()?;

        if let Some(length) = response.content_length() {
            if length > MAX_PAYLOAD_SIZE {
                return Err(BulletinError::Transport(format!(
                    "payload too large: {} bytes (max {} bytes)",
                    length, MAX_PAYLOAD_SIZE
                )));
            }
        }

        let bytes = response.bytes()?;
        if bytes.len() as u64 > MAX_PAYLOAD_SIZE {
            return Err(BulletinError::Transport(format!(
                "payload too large: {} bytes (max {} bytes)",
                bytes.len(),
                MAX_PAYLOAD_SIZE
            )));
        }

        Ok(bytes.to_vec())
    }
}
