//! Graceful shutdown coordination.
//!
//! One [`ShutdownCoordinator`] is shared by the accept loop and every
//! connection task. Triggering it stops the accept loop, asks open
//! connections to finish their in-flight request, and lets the caller wait
//! until they have drained or the timeout has passed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{Notify, broadcast};

/// Broadcasts a shutdown request and tracks open connections.
#[derive(Clone)]
pub struct ShutdownCoordinator {
	shutdown_tx: broadcast::Sender<()>,
	triggered: Arc<AtomicBool>,
	accepting_stopped: Arc<AtomicBool>,
	connections: Arc<AtomicUsize>,
	drained: Arc<Notify>,
	timeout: Duration,
}

impl ShutdownCoordinator {
	/// `timeout` bounds how long [`wait_for_shutdown`](Self::wait_for_shutdown)
	/// waits for open connections.
	pub fn new(timeout: Duration) -> Self {
		let (shutdown_tx, _) = broadcast::channel(1);
		Self {
			shutdown_tx,
			triggered: Arc::new(AtomicBool::new(false)),
			accepting_stopped: Arc::new(AtomicBool::new(false)),
			connections: Arc::new(AtomicUsize::new(0)),
			drained: Arc::new(Notify::new()),
			timeout,
		}
	}

	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	/// Receiver that fires once when shutdown is triggered.
	pub fn subscribe(&self) -> broadcast::Receiver<()> {
		self.shutdown_tx.subscribe()
	}

	/// Trigger shutdown. Repeated calls are no-ops.
	pub fn shutdown(&self) {
		if !self.triggered.swap(true, Ordering::SeqCst) {
			tracing::info!("shutdown requested");
			// No receivers just means nothing is listening yet.
			let _ = self.shutdown_tx.send(());
		}
	}

	pub fn is_shutting_down(&self) -> bool {
		self.triggered.load(Ordering::SeqCst)
	}

	/// Called by the server once it stops accepting connections.
	pub fn notify_shutdown_complete(&self) {
		self.accepting_stopped.store(true, Ordering::SeqCst);
		self.drained.notify_waiters();
	}

	/// Registers an open connection until the guard drops.
	pub fn connection_guard(&self) -> ConnectionGuard {
		self.connections.fetch_add(1, Ordering::SeqCst);
		ConnectionGuard {
			coordinator: self.clone(),
		}
	}

	pub fn active_connections(&self) -> usize {
		self.connections.load(Ordering::SeqCst)
	}

	fn is_drained(&self) -> bool {
		self.accepting_stopped.load(Ordering::SeqCst) && self.active_connections() == 0
	}

	/// Waits until the server stopped accepting and every connection closed.
	///
	/// Returns `false` when the timeout elapsed first.
	pub async fn wait_for_shutdown(&self) -> bool {
		let drained = async {
			loop {
				let notified = self.drained.notified();
				if self.is_drained() {
					return;
				}
				notified.await;
			}
		};

		match tokio::time::timeout(self.timeout, drained).await {
			Ok(()) => true,
			Err(_) => {
				tracing::warn!(
					open_connections = self.active_connections(),
					timeout_secs = self.timeout.as_secs(),
					"graceful shutdown timed out"
				);
				false
			}
		}
	}
}

/// Decrements the open-connection count on drop.
pub struct ConnectionGuard {
	coordinator: ShutdownCoordinator,
}

impl Drop for ConnectionGuard {
	fn drop(&mut self) {
		if self.coordinator.connections.fetch_sub(1, Ordering::SeqCst) == 1 {
			self.coordinator.drained.notify_waiters();
		}
	}
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(err) = tokio::signal::ctrl_c().await {
			tracing::error!(error = %err, "failed to listen for Ctrl-C");
			std::future::pending::<()>().await;
		}
		tracing::info!("received Ctrl-C");
	};

	#[cfg(unix)]
	let terminate = async {
		use tokio::signal::unix::{SignalKind, signal};

		match signal(SignalKind::terminate()) {
			Ok(mut stream) => {
				stream.recv().await;
				tracing::info!("received terminate signal");
			}
			Err(err) => {
				tracing::error!(error = %err, "failed to install SIGTERM handler");
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}
}
