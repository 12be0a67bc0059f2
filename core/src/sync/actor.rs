use crate::Session;

use std::{sync::Arc, time::Duration};

use tokio::{
	task::JoinHandle,
	time::{interval, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Background loop syncing a [`Session`]: once on start, then on every queued mutation and on
/// every tick of `period`.
pub struct SyncActor {
	session: Arc<Session>,
	period: Duration,
	cancel: CancellationToken,
}

impl SyncActor {
	#[must_use]
	pub fn new(session: Arc<Session>, period: Duration) -> Self {
		Self {
			session,
			period,
			cancel: CancellationToken::new(),
		}
	}

	/// Cancelling the token stops the actor at the next await point, an in-flight request is
	/// abandoned and its action stays queued.
	#[must_use]
	pub fn cancellation_token(&self) -> CancellationToken {
		self.cancel.clone()
	}

	pub fn spawn(self) -> JoinHandle<()> {
		tokio::spawn(self.run())
	}

	pub async fn run(self) {
		let Self {
			session,
			period,
			cancel,
		} = self;

		let wake = session.changes();

		let mut ticker = interval(period);
		ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

		info!(?period, "Starting sync actor;");

		loop {
			tokio::select! {
				() = cancel.cancelled() => break,
				_ = ticker.tick() => debug!("Sync tick;"),
				() = wake.notified() => debug!("Woken by local mutation;"),
			}

			tokio::select! {
				() = cancel.cancelled() => break,
				report = session.run_sync_pass() => {
					if let Some(report) = report {
						debug!(sent = report.sent(), ok = report.is_success(), "Sync pass done;");
					}
				}
			}
		}

		info!("Sync actor stopped;");
	}
}
