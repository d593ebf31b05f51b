//! Tolerant decoding of the announcement payload.
//!
//! The endpoint has served both a bare JSON array and an object envelope
//! (`{"publiees": [...]}`). Both are accepted. Entries that cannot be read as
//! an announcement (most commonly a missing `id`) are skipped instead of
//! failing the whole batch.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::domain::{Announcement, AnnouncementId};
use crate::errors::{BulletinError, BulletinResult};

/// Envelope keys that may hold the announcement list, in lookup order
const ENVELOPE_KEYS: [&str; 3] = ["publiees", "announcements", "items"];

/// A list that arrives either as a JSON array or as one delimited string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringList {
    Many(Vec<Option<String>>),
    Joined(String),
}

impl StringList {
    fn into_vec(self, separators: &[char]) -> Vec<String> {
        let parts: Vec<String> = match self {
            StringList::Many(items) => items.into_iter().flatten().collect(),
            StringList::Joined(joined) => joined
                .split(|c| separators.contains(&c))
                .map(str::to_string)
                .collect(),
        };

        parts
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect()
    }
}

/// Boolean flag as the server has stored it: bool, 0/1, or "on"/"true"
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl Flag {
    fn is_set(&self) -> bool {
        match self {
            Flag::Bool(b) => *b,
            Flag::Int(i) => *i != 0,
            Flag::Text(s) => {
                matches!(s.trim().to_lowercase().as_str(), "1" | "on" | "true" | "yes")
            }
        }
    }
}

/// One entry as served. French and English spellings are separate fields so
/// an entry carrying both still decodes; the French one wins.
#[derive(Debug, Deserialize)]
struct RawAnnouncement {
    id: AnnouncementId,
    #[serde(default)]
    titre: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    contenu: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    images: Option<StringList>,
    #[serde(default)]
    youtube: Option<String>,
    #[serde(default)]
    youtubes: Option<StringList>,
    #[serde(default)]
    adresses: Option<String>,
    #[serde(default)]
    adresse: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    epingle: Option<Flag>,
    #[serde(default)]
    pinned: Option<Flag>,
    #[serde(default)]
    tags: Option<StringList>,
}

impl From<RawAnnouncement> for Announcement {
    fn from(raw: RawAnnouncement) -> Self {
        let mut videos: Vec<String> = raw.youtube.into_iter().collect();
        if let Some(more) = raw.youtubes {
            videos.extend(more.into_vec(&['\n', '\r']));
        }

        // The multi-line field supersedes the legacy single address
        let address = raw
            .adresses
            .filter(|a| !a.trim().is_empty())
            .or(raw.adresse)
            .or(raw.address);
        let title = raw.titre.or(raw.title).unwrap_or_default();
        let body = raw.contenu.or(raw.body).or(raw.content).unwrap_or_default();
        let pinned = raw.epingle.or(raw.pinned).is_some_and(|f| f.is_set());

        Announcement::new(raw.id, title)
            .with_body(body)
            .with_images(raw.images.map(|i| i.into_vec(&[','])).unwrap_or_default())
            .with_videos(videos)
            .with_address(address)
            .with_pinned(pinned)
            .with_tags(raw.tags.map(|t| t.into_vec(&[','])).unwrap_or_default())
    }
}

/// Locate the announcement list inside the payload
fn extract_list(payload: Value) -> BulletinResult<Vec<Value>> {
    match payload {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => ENVELOPE_KEYS
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(|| {
                BulletinError::Decode(format!(
                    "object payload has no announcement list (expected one of: {})",
                    ENVELOPE_KEYS.join(", ")
                ))
            }),
        other => Err(BulletinError::Decode(format!(
            "expected an array or an object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Decode a raw payload into announcements, in received order.
///
/// Fails only when the payload as a whole is not a list of announcements;
/// individual malformed entries are dropped.
pub fn decode_announcements(payload: &[u8]) -> BulletinResult<Vec<Announcement>> {
    let value: Value = serde_json::from_slice(payload)?;
    let entries = extract_list(value)?;
    let total = entries.len();

    let announcements: Vec<Announcement> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<RawAnnouncement>(entry) {
            Ok(raw) => Some(Announcement::from(raw)),
            Err(e) => {
                debug!(index, error = %e, "skipping malformed announcement entry");
                None
            }
        })
        .collect();

    if announcements.len() < total {
        debug!(
            kept = announcements.len(),
            dropped = total - announcements.len(),
            "dropped malformed announcement entries"
        );
    }

    Ok(announcements)
}
