//! Recurring token-refresh scheduling with single-timer and no-panic invariants.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// crates.io
use tokio::{runtime::Handle, task::JoinHandle, time::MissedTickBehavior};
// self
use crate::{
	_prelude::*,
	idp::IdpAdapter,
	obs::{self, FlowOutcome, FlowSpan, SessionFlow},
};

/// Tunable cadence for the recurring refresh timer.
///
/// The defaults re-ask the IdP every minute for a token that stays valid a
/// little longer than one period. Deployments that want an expiry-derived
/// cadence tune both knobs instead of relying on the fixed interval.
#[derive(Clone, Copy, Debug)]
pub struct RefreshSettings {
	/// Period between refresh attempts.
	pub interval: Duration,
	/// Minimum remaining validity requested from the client on each attempt.
	pub min_validity: Duration,
}
impl Default for RefreshSettings {
	fn default() -> Self {
		Self { interval: Duration::seconds(60), min_validity: Duration::seconds(70) }
	}
}

/// Thread-safe counters for refresh attempts.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	attempts: AtomicU64,
	successes: AtomicU64,
	failures: AtomicU64,
}
impl RefreshMetrics {
	/// Returns the total number of refresh attempts.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of refresh attempts that kept the session alive
	/// (rotations and still-valid reuses alike).
	pub fn successes(&self) -> u64 {
		self.successes.load(Ordering::Relaxed)
	}

	/// Returns the number of refresh attempts that tore the session down.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	fn record_success(&self) {
		self.successes.fetch_add(1, Ordering::Relaxed);
	}

	fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}
}

/// Timer slot plus settings; at most one live timer per adapter.
pub(crate) struct RefreshSchedule {
	settings: RefreshSettings,
	handle: Mutex<Option<JoinHandle<()>>>,
	metrics: RefreshMetrics,
}
impl RefreshSchedule {
	pub(crate) fn new(settings: RefreshSettings) -> Self {
		Self { settings, handle: Mutex::new(None), metrics: RefreshMetrics::default() }
	}
}

impl IdpAdapter {
	/// Arms the recurring refresh timer, always cancelling any predecessor first.
	///
	/// Outside an async runtime (non-browser-equivalent execution) scheduling is
	/// skipped with a warning instead of failing; the session simply lives until
	/// its token expires.
	pub fn schedule_token_refresh(&self) {
		let schedule = self.refresh_schedule();
		let mut slot = schedule.handle.lock();

		if let Some(previous) = slot.take() {
			previous.abort();
		}

		let interval = schedule.settings.interval;

		if !interval.is_positive() {
			tracing::warn!("Refresh interval is not positive; skipping refresh scheduling.");

			return;
		}

		let Ok(runtime) = Handle::try_current() else {
			tracing::warn!("No async runtime is available; skipping refresh scheduling.");

			return;
		};
		let weak = self.weak_handle();
		let period = interval.unsigned_abs();
		let handle = runtime.spawn(async move {
			let mut ticker = tokio::time::interval(period);

			ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
			// The first tick of a Tokio interval completes immediately; consume it
			// so the first refresh happens one full period after arming.
			ticker.tick().await;

			loop {
				ticker.tick().await;

				let Some(adapter) = weak.upgrade() else {
					return;
				};

				if adapter.refresh_now().await.is_err() {
					// The session was torn down; the next check_auth re-arms.
					return;
				}
			}
		});

		*slot = Some(handle);
	}

	/// Cancels the refresh timer, if one is armed.
	pub fn cancel_token_refresh(&self) {
		if let Some(handle) = self.refresh_schedule().handle.lock().take() {
			handle.abort();
		}
	}

	/// Returns `true` while a refresh timer is armed and still running.
	pub fn refresh_armed(&self) -> bool {
		self.refresh_schedule().handle.lock().as_ref().is_some_and(|handle| !handle.is_finished())
	}

	/// Counters describing refresh health since the adapter was constructed.
	pub fn refresh_metrics(&self) -> &RefreshMetrics {
		&self.refresh_schedule().metrics
	}

	/// Runs one refresh cycle immediately.
	///
	/// A rotation updates the token store, the token-derived groups, and the
	/// validation stamp; a still-valid token is left untouched. Failure clears
	/// both caches so the next `check_auth` re-authenticates from scratch, and
	/// is reported as an error rather than a panic so timer callbacks stay
	/// crash-free.
	pub async fn refresh_now(&self) -> Result<bool> {
		const FLOW: SessionFlow = SessionFlow::Refresh;

		let span = FlowSpan::new(FLOW, "refresh_now");

		obs::record_flow_outcome(FLOW, FlowOutcome::Attempt);

		let schedule = self.refresh_schedule();
		let result = span
			.instrument(async move {
				schedule.metrics.record_attempt();

				match self.client().update_token(schedule.settings.min_validity).await {
					Ok(rotated) => {
						if rotated {
							self.adopt_session();
						}

						schedule.metrics.record_success();

						Ok(rotated)
					},
					Err(e) => {
						self.discard_session();
						schedule.metrics.record_failure();
						tracing::warn!(
							error = %e,
							"Token refresh failed; session cleared for re-authentication.",
						);

						Err(Error::RefreshFailed { reason: e.to_string() })
					},
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(FLOW, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(FLOW, FlowOutcome::Failure),
		}

		result
	}
}
