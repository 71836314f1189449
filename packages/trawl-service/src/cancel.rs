use std::{
	future::Future,
	sync::{
		Arc, OnceLock,
		atomic::{AtomicBool, Ordering},
	},
	time::Duration,
};

use tokio::time::Instant;

/// Cooperative cancellation signal shared between a caller and a running aggregation.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
	cancelled: Arc<AtomicBool>,
}
impl CancellationToken {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn cancel(&self) {
		self.cancelled.store(true, Ordering::SeqCst);
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancelled.load(Ordering::SeqCst)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interrupt {
	Cancelled,
	TimedOut,
}

/// Checked at every page, batch, and lookup boundary.
#[derive(Debug)]
pub(crate) struct RunGuard {
	token: CancellationToken,
	deadline: Option<Instant>,
	observed: OnceLock<Interrupt>,
}
impl RunGuard {
	pub(crate) fn new(token: CancellationToken, timeout: Option<Duration>) -> Self {
		Self {
			token,
			deadline: timeout.map(|timeout| Instant::now() + timeout),
			observed: OnceLock::new(),
		}
	}

	pub(crate) fn interrupted(&self) -> Option<Interrupt> {
		if let Some(interrupt) = self.observed.get() {
			return Some(*interrupt);
		}

		let interrupt = if self.token.is_cancelled() {
			Interrupt::Cancelled
		} else if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
			Interrupt::TimedOut
		} else {
			return None;
		};

		Some(*self.observed.get_or_init(|| interrupt))
	}

	/// Bounds one remote call by the run deadline.
	///
	/// A call still in flight at the deadline is dropped and the run is marked timed out.
	pub(crate) async fn bounded<F>(&self, call: F) -> Result<F::Output, Interrupt>
	where
		F: Future,
	{
		let Some(deadline) = self.deadline else {
			return Ok(call.await);
		};

		tokio::time::timeout_at(deadline, call)
			.await
			.map_err(|_| *self.observed.get_or_init(|| Interrupt::TimedOut))
	}

	/// The first interrupt any boundary check saw, if one did.
	pub(crate) fn observed(&self) -> Option<Interrupt> {
		self.observed.get().copied()
	}
}
