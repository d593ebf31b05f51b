use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::NotebrookConfig;
use crate::domain::Notification;
use crate::errors::{BulletinError, BulletinResult};
use crate::notifiers::traits::Notifier;

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(deserialize_with = "deserialize_string_or_i64")]
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ChannelsResponse {
    channels: Vec<Channel>,
}

#[derive(Debug, Serialize)]
struct SendMessagePayload<'a> {
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateChannelPayload<'a> {
    name: &'a str,
}

fn deserialize_string_or_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct StringOrI64Visitor;

    impl<'de> Visitor<'de> for StringOrI64Visitor {
        type Value = i64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or i64")
        }

        fn visit_i64<E>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E>(self, v: u64) -> Result<i64, E>
        where
            E: de::Error,
        {
            i64::try_from(v).map_err(de::Error::custom)
        }

        fn visit_str<E>(self, v: &str) -> Result<i64, E>
        where
            E: de::Error,
        {
            v.parse().map_err(de::Error::custom)
        }
    }

    deserializer.deserialize_any(StringOrI64Visitor)
}

enum SendOutcome {
    Sent,
    TooLarge,
}

/// Posts notifications as messages to a Notebrook channel,
/// creating the channel on first use
pub struct NotebrookNotifier {
    url: String,
    channel: String,
    client: Client,
}

impl NotebrookNotifier {
    pub fn new(config: &NotebrookConfig, timeout: Duration) -> BulletinResult<Self> {
        let mut headers = HeaderMap::new();
        let token = HeaderValue::from_str(&config.token).map_err(|_| {
            BulletinError::Config("invalid NOTEBROOK_TOKEN header value".to_string())
        })?;
        headers.insert(HeaderName::from_static("authorization"), token);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            url: config.url.trim_end_matches('/').to_string(),
            channel: config.channel.clone(),
            client,
        })
    }

    fn find_channel_id(&self) -> BulletinResult<Option<i64>> {
        let response: ChannelsResponse = self
            .client
            .get(format!("{}/channels", self.url))
            .send()?
            .error_for_status()?
            .json()?;

        Ok(response
            .channels
            .into_iter()
            .find(|c| c.name == self.channel)
            .map(|c| c.id))
    }

    fn create_channel(&self) -> BulletinResult<i64> {
        debug!(channel = %self.channel, "creating notebrook channel");

        let channel: Channel = self
            .client
            .post(format!("{}/channels/", self.url))
            .json(&CreateChannelPayload {
                name: &self.channel,
            })
            .send()?
            .error_for_status()?
            .json()?;

        Ok(channel.id)
    }

    fn send_message(&self, channel_id: i64, content: &str) -> BulletinResult<SendOutcome> {
        let response = self
            .client
            .post(format!("{}/channels/{}/messages", self.url, channel_id))
            .json(&SendMessagePayload { content })
            .send()?;

        if response.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Ok(SendOutcome::TooLarge);
        }

        response.error_for_status()?;
        Ok(SendOutcome::Sent)
    }
}

impl Notifier for NotebrookNotifier {
    fn notify(&self, notification: &Notification) -> BulletinResult<()> {
        let channel_id = match self.find_channel_id()? {
            Some(id) => id,
            None => self.create_channel()?,
        };

        if let SendOutcome::Sent = self.send_message(channel_id, &notification.format())? {
            return Ok(());
        }

        // Message too large, fall back to the title alone
        warn!(channel = %self.channel, "notification too large, sending title only");
        match self.send_message(channel_id, &notification.title)? {
            SendOutcome::Sent => Ok(()),
            SendOutcome::TooLarge => Err(BulletinError::Notification(
                "payload too large even without body".to_string(),
            )),
        }
    }
}
