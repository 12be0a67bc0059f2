//! User facing feedback (toasts) raised by background work.

mod notifier;

pub use notifier::Notifier;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
	pub kind: NotificationKind,
	pub message: String,
	pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
	Info,
	Success,
	Error,
}

impl Notification {
	pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
		Self {
			kind,
			message: message.into(),
			created_at: Utc::now(),
		}
	}
}
