use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Stable identifier of an announcement.
///
/// The feed has published ids both as integers and as strings; both are
/// normalized to their text form so `7` and `"7"` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AnnouncementId(String);

impl AnnouncementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnnouncementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for AnnouncementId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for AnnouncementId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for AnnouncementId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct IdVisitor;

        impl<'de> Visitor<'de> for IdVisitor {
            type Value = AnnouncementId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a non-empty string or an integer")
            }

            fn visit_i64<E>(self, v: i64) -> Result<AnnouncementId, E> {
                Ok(AnnouncementId(v.to_string()))
            }

            fn visit_u64<E>(self, v: u64) -> Result<AnnouncementId, E> {
                Ok(AnnouncementId(v.to_string()))
            }

            fn visit_str<E>(self, v: &str) -> Result<AnnouncementId, E>
            where
                E: de::Error,
            {
                let trimmed = v.trim();
                if trimmed.is_empty() {
                    return Err(de::Error::custom("empty announcement id"));
                }
                Ok(AnnouncementId(trimmed.to_string()))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: AnnouncementId,
    pub title: String,
    pub body: String,
    pub image_refs: Vec<String>,
    pub video_refs: Vec<String>,
    pub address_text: Option<String>,
    pub pinned: bool,
    pub tags: Vec<String>,
}

impl Announcement {
    pub fn new(id: impl Into<AnnouncementId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: String::new(),
            image_refs: Vec::new(),
            video_refs: Vec::new(),
            address_text: None,
            pinned: false,
            tags: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_images(mut self, image_refs: Vec<String>) -> Self {
        self.image_refs = image_refs;
        self
    }

    pub fn with_videos(mut self, video_refs: Vec<String>) -> Self {
        self.video_refs = dedup_video_refs(video_refs);
        self
    }

    pub fn with_address(mut self, address_text: Option<String>) -> Self {
        self.address_text = address_text.filter(|a| !a.trim().is_empty());
        self
    }

    pub fn with_pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Individual addresses, one per line of `address_text`
    pub fn addresses(&self) -> Vec<String> {
        self.address_text
            .as_deref()
            .map(|text| {
                text.replace("\r\n", "\n")
                    .split('\n')
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Resolve relative image references (e.g. `/static/uploads/x.png`)
    /// against the feed endpoint. References that cannot be resolved are kept.
    pub fn resolve_media(mut self, base: &Url) -> Self {
        self.image_refs = self
            .image_refs
            .into_iter()
            .map(|r| match Url::parse(&r) {
                Ok(_) => r,
                Err(_) => base.join(&r).map(|u| u.to_string()).unwrap_or(r),
            })
            .collect();
        self
    }
}

fn youtube_id_regexes() -> &'static [Regex; 2] {
    static REGEXES: OnceLock<[Regex; 2]> = OnceLock::new();
    REGEXES.get_or_init(|| {
        [
            Regex::new(r"(?i)(?:youtu\.be/|youtube\.com/(?:watch\?v=|embed/|v/|shorts/)?)([\w-]{11})")
                .expect("valid youtube regex"),
            Regex::new(r"(?i)youtube\.com.*[?&]v=([\w-]{11})").expect("valid youtube regex"),
        ]
    })
}

/// Extract the 11 character video id from any YouTube link shape
pub fn youtube_video_id(link: &str) -> Option<String> {
    let trimmed = link.trim();
    if trimmed.is_empty() {
        return None;
    }

    youtube_id_regexes()
        .iter()
        .find_map(|re| re.captures(trimmed).map(|caps| caps[1].to_string()))
}

/// Trim, drop blanks, and drop links pointing at a video already listed
fn dedup_video_refs(refs: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    refs.into_iter()
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .filter(|r| seen.insert(youtube_video_id(r).unwrap_or_else(|| r.clone())))
        .collect()
}
