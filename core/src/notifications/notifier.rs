use std::{collections::VecDeque, sync::Arc};

use tokio::sync::{broadcast, Mutex};
use tracing::trace;

use super::{Notification, NotificationKind};

const CHANNEL_CAPACITY: usize = 16;
/// Oldest notifications are dropped past this point.
const HISTORY_CAPACITY: usize = 64;

#[derive(Debug)]
pub struct Notifier {
	notifications: Mutex<VecDeque<Notification>>,
	chan: broadcast::Sender<Notification>,
}

impl Notifier {
	#[must_use]
	pub fn new() -> Arc<Self> {
		Arc::new(Self {
			notifications: Mutex::new(VecDeque::with_capacity(HISTORY_CAPACITY)),
			chan: broadcast::channel(CHANNEL_CAPACITY).0,
		})
	}

	pub async fn emit(&self, notification: Notification) {
		trace!(kind = ?notification.kind, message = %notification.message, "Emitting notification;");

		{
			let mut history = self.notifications.lock().await;
			if history.len() == HISTORY_CAPACITY {
				history.pop_front();
			}
			history.push_back(notification.clone());
		}

		if self.chan.receiver_count() > 0 {
			self.chan.send(notification).ok();
		}
	}

	pub async fn info(&self, message: impl Into<String> + Send) {
		self.emit(Notification::new(NotificationKind::Info, message))
			.await;
	}

	pub async fn success(&self, message: impl Into<String> + Send) {
		self.emit(Notification::new(NotificationKind::Success, message))
			.await;
	}

	pub async fn error(&self, message: impl Into<String> + Send) {
		self.emit(Notification::new(NotificationKind::Error, message))
			.await;
	}

	pub async fn get_notifications(&self) -> Vec<Notification> {
		self.notifications.lock().await.iter().cloned().collect()
	}

	pub async fn clear_notifications(&self) {
		self.notifications.lock().await.clear();
	}

	pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
		self.chan.subscribe()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn subscribers_receive_and_history_is_kept() {
		let notifier = Notifier::new();

		notifier.info("before anyone listens").await;

		let mut rx = notifier.subscribe();
		notifier.error("Cocktails removed: Negroni").await;

		let received = rx.recv().await.unwrap();
		assert_eq!(received.kind, NotificationKind::Error);
		assert_eq!(received.message, "Cocktails removed: Negroni");

		assert_eq!(notifier.get_notifications().await.len(), 2);
		notifier.clear_notifications().await;
		assert!(notifier.get_notifications().await.is_empty());
	}

	#[tokio::test]
	async fn history_keeps_only_the_latest_notifications() {
		let notifier = Notifier::new();

		for i in 0..HISTORY_CAPACITY + 10 {
			notifier.info(format!("notification {i}")).await;
		}

		let history = notifier.get_notifications().await;
		assert_eq!(history.len(), HISTORY_CAPACITY);
		assert_eq!(history[0].message, "notification 10");
		assert_eq!(
			history[HISTORY_CAPACITY - 1].message,
			format!("notification {}", HISTORY_CAPACITY + 9)
		);
	}
}
