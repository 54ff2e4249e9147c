use std::fmt::Write;
use std::sync::Arc;

use chrono_tz::Tz;

use crate::config::DEFAULT_TIMESTAMP_FORMAT;
use crate::dates::{Clock, SystemClock, DEFAULT_TIMEZONE};
use crate::models::Notification;

struct SeedNotification {
    title: &'static str,
    message: &'static str,
    time: &'static str,
}

const SYSTEM_NOTIFICATIONS: [SeedNotification; 1] = [SeedNotification {
    title: "Version 1.0 Released",
    message: "We’re excited to announce that FFFinder v1.0 is now live! Update available from May 11, 12:00 PM.",
    time: "2025/5/11, 14:11",
}];

/// Most-recent-first log. Entries are never removed.
pub struct NotificationLog {
    entries: Vec<Notification>,
    next_id: u64,
    clock: Arc<dyn Clock>,
    tz: Tz,
    timestamp_format: String,
}

impl std::fmt::Debug for NotificationLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationLog")
            .field("entries", &self.entries)
            .field("tz", &self.tz)
            .field("timestamp_format", &self.timestamp_format)
            .finish_non_exhaustive()
    }
}

impl Default for NotificationLog {
    fn default() -> Self {
        Self::seeded(Arc::new(SystemClock), DEFAULT_TIMEZONE, DEFAULT_TIMESTAMP_FORMAT)
    }
}

impl NotificationLog {
    pub fn empty(clock: Arc<dyn Clock>, tz: Tz, timestamp_format: impl Into<String>) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
            clock,
            tz,
            timestamp_format: timestamp_format.into(),
        }
    }

    /// Starts with the system announcements, all unread.
    pub fn seeded(clock: Arc<dyn Clock>, tz: Tz, timestamp_format: impl Into<String>) -> Self {
        let mut log = Self::empty(clock, tz, timestamp_format);
        for seed in &SYSTEM_NOTIFICATIONS {
            let id = log.allocate_id();
            log.entries.push(Notification {
                id,
                title: seed.title.to_string(),
                message: seed.message.to_string(),
                time: seed.time.to_string(),
                is_read: false,
            });
        }
        log
    }

    pub fn add(&mut self, title: impl Into<String>, message: impl Into<String>) -> u64 {
        let id = self.allocate_id();
        let local = self.clock.now().with_timezone(&self.tz);
        let mut time = String::new();
        if write!(time, "{}", local.format(&self.timestamp_format)).is_err() {
            tracing::warn!(format = %self.timestamp_format, "invalid timestamp format");
            time = local.format(DEFAULT_TIMESTAMP_FORMAT).to_string();
        }
        let notification = Notification {
            id,
            title: title.into(),
            message: message.into(),
            time,
            is_read: false,
        };
        tracing::debug!(id, title = %notification.title, "notification added");
        self.entries.insert(0, notification);
        id
    }

    /// Returns false when no entry has that id.
    pub fn mark_read(&mut self, id: u64) -> bool {
        match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.is_read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&mut self) {
        for entry in &mut self.entries {
            entry.is_read = true;
        }
    }

    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    pub fn head(&self) -> Option<&Notification> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|entry| !entry.is_read).count()
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
