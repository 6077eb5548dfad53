//! View-only state: overlay, sidebar, notifications and the explore input.

use std::fmt;
use std::time::Instant;

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::util::debounce::DebouncerState;

/// Notification levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum NotificationLevel {
    Info = 0,
    Success = 1,
    Warning = 2,
    Error = 3,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        };

        write!(f, "{s}")
    }
}

/// Compact notification with timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: CompactString,
    pub level: NotificationLevel,
    pub timestamp: Instant,
}

impl Notification {
    pub fn new(message: impl Into<CompactString>, level: NotificationLevel) -> Self {
        Self {
            message: message.into(),
            level,
            timestamp: Instant::now(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UIState {
    /// Shown once a listing stayed outstanding for the whole quiet period.
    pub show_loading_overlay: bool,

    /// Opened automatically when a deep link selects a single item.
    pub expand_sidebar: bool,

    pub notifications: SmallVec<[Notification; 4]>,

    /// Address typed on the explore screen.
    pub address_input: CompactString,

    pub loading_debounce: DebouncerState,
    pub notification_debounce: DebouncerState,
    pub address_debounce: DebouncerState,
}

impl UIState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_notification(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    /// Returns how many notifications were dismissed.
    pub fn dismiss_notifications(&mut self) -> usize {
        let count = self.notifications.len();
        self.notifications.clear();
        count
    }

    pub fn set_address_input(&mut self, text: impl Into<CompactString>) {
        self.address_input = text.into();
    }

    #[must_use]
    pub fn latest_notification(&self) -> Option<&Notification> {
        self.notifications.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notifications_stack_and_dismiss() {
        let mut ui = UIState::new();
        ui.push_notification(Notification::new("first", NotificationLevel::Info));
        ui.push_notification(Notification::new("second", NotificationLevel::Error));

        assert_eq!(
            ui.latest_notification().map(|n| n.level),
            Some(NotificationLevel::Error)
        );
        assert_eq!(ui.dismiss_notifications(), 2);
        assert!(ui.notifications.is_empty());
        assert_eq!(ui.dismiss_notifications(), 0);
    }

    #[test]
    fn test_defaults() {
        let ui = UIState::new();
        assert!(!ui.show_loading_overlay);
        assert!(!ui.expand_sidebar);
        assert!(ui.address_input.is_empty());
        assert!(!ui.loading_debounce.is_pending());
    }
}
