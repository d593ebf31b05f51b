use std::io::Write;
use std::sync::Mutex;

use crate::domain::Notification;
use crate::errors::BulletinResult;
use crate::notifiers::traits::Notifier;

/// Writes notifications to a terminal or any other writer
pub struct ConsoleNotifier<W: Write + Send> {
    out: Mutex<W>,
    prefix: &'static str,
}

impl ConsoleNotifier<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout(), "[NOTIFY]")
    }

    /// Notifier used for --dry-run: shows what would have been sent
    pub fn dry_run() -> Self {
        Self::new(std::io::stdout(), "[DRY RUN]")
    }
}

impl<W: Write + Send> ConsoleNotifier<W> {
    pub fn new(out: W, prefix: &'static str) -> Self {
        Self {
            out: Mutex::new(out),
            prefix,
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl<W: Write + Send> Notifier for ConsoleNotifier<W> {
    fn notify(&self, notification: &Notification) -> BulletinResult<()> {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        writeln!(out, "  {} {}", self.prefix, notification.format())?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_formatted_notification() {
        let notifier = ConsoleNotifier::new(Vec::new(), "[NOTIFY]");
        let notification = Notification {
            title: "New announcements".to_string(),
            body: "Marché de Noël".to_string(),
            count: 1,
        };

        notifier.notify(&notification).unwrap();

        let written = String::from_utf8(notifier.into_inner()).unwrap();
        assert_eq!(written, "  [NOTIFY] New announcements: Marché de Noël\n");
    }
}
