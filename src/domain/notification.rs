use super::Announcement;

const TITLE: &str = "New announcements";
const SINGLE_FALLBACK: &str = "New announcement!";

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub count: usize,
}

impl Notification {
    /// Build the notification for a batch of new announcements.
    /// Returns None when there is nothing new.
    pub fn for_new_announcements(new_items: &[Announcement]) -> Option<Self> {
        let body = match new_items {
            [] => return None,
            [only] => {
                let title = only.title.trim();
                if title.is_empty() {
                    SINGLE_FALLBACK.to_string()
                } else {
                    title.to_string()
                }
            }
            many => format!("{} new announcements published!", many.len()),
        };

        Some(Self {
            title: TITLE.to_string(),
            body,
            count: new_items.len(),
        })
    }

    /// Format: "{title}: {body}"
    pub fn format(&self) -> String {
        if self.body.is_empty() {
            return self.title.clone();
        }
        format!("{}: {}", self.title, self.body)
    }
}
