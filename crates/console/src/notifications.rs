//! Outbox of notifications waiting for the frontend to show them.

use std::collections::VecDeque;

use dbide_registry::{Level, Notification};

/// FIFO of raised notifications. The frontend drains it after each update and
/// decides how long each toast lives from its [`AutoDismiss`](dbide_registry::AutoDismiss).
#[derive(Debug, Default)]
pub struct NotificationCenter {
	queue: VecDeque<Notification>,
}

impl NotificationCenter {
	pub fn push(&mut self, notification: Notification) {
		let (id, message) = (notification.id(), &notification.message);
		if notification.level() >= Level::Warn {
			tracing::warn!(id, %message, "notify");
		} else {
			tracing::debug!(id, %message, "notify");
		}
		self.queue.push_back(notification);
	}

	/// Removes and returns everything raised so far, oldest first.
	pub fn drain(&mut self) -> Vec<Notification> {
		self.queue.drain(..).collect()
	}
}
