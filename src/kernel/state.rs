use std::collections::VecDeque;

use crate::kernel::documents::DocumentRegistry;
use crate::kernel::explorer::DirectoryTree;
use crate::kernel::services::ports::Settings;
use crate::kernel::terminal::SessionMultiplexer;

const MAX_NOTIFICATIONS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

#[derive(Debug)]
pub struct AppState {
    pub documents: DocumentRegistry,
    pub explorer: DirectoryTree,
    pub terminal: SessionMultiplexer,
    pub settings: Settings,
    notifications: VecDeque<Notification>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            documents: DocumentRegistry::new(),
            explorer: DirectoryTree::new(),
            terminal: SessionMultiplexer::new(),
            settings,
            notifications: VecDeque::new(),
        }
    }

    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    pub(crate) fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            NotificationLevel::Error => tracing::warn!(%message, "notification"),
            _ => tracing::info!(%message, "notification"),
        }
        if self.notifications.len() == MAX_NOTIFICATIONS {
            self.notifications.pop_front();
        }
        self.notifications.push_back(Notification { level, message });
    }

    pub(crate) fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
