//! Tracking of submissions that outlived their time bound.
//!
//! A timed-out submission is not cancelled: the connector may still deliver
//! an answer. The ledger keeps the in-flight request and records whatever it
//! eventually returns, so callers can look it up by submission id instead of
//! submitting again.

use crate::submit::classify;
use dashmap::DashMap;
use shipper_connector::{ConnectorError, SendTransactionPayload};
use shipper_types::{ErrorDetail, SubmissionOutcome, UNEXPECTED_STATUS_CODE};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// State of a timed-out submission.
#[derive(Debug, Clone, PartialEq)]
pub enum LateStatus {
	/// The connector call is still running.
	Pending,
	/// The connector answered after the time bound.
	Resolved(SubmissionOutcome),
}

impl LateStatus {
	/// Returns true once the late answer has been classified.
	pub fn is_resolved(&self) -> bool {
		matches!(self, LateStatus::Resolved(_))
	}
}

pub(crate) type ConnectorTask =
	JoinHandle<Result<Option<SendTransactionPayload>, ConnectorError>>;

/// Late results of timed-out submissions, keyed by submission id.
///
/// An entry lives until its resolved outcome has been read once through
/// [`SubmissionLedger::status`] or [`SubmissionLedger::wait_for`].
/// Clones share the same entries.
#[derive(Clone, Default)]
pub struct SubmissionLedger {
	entries: Arc<DashMap<String, watch::Receiver<LateStatus>>>,
}

impl SubmissionLedger {
	/// Creates an empty ledger.
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts watching an in-flight connector call.
	pub(crate) fn track(&self, submission_id: String, task: ConnectorTask) {
		let (tx, rx) = watch::channel(LateStatus::Pending);
		self.entries.insert(submission_id.clone(), rx);

		tokio::spawn(async move {
			let outcome = match task.await {
				Ok(result) => classify(result),
				Err(e) => SubmissionOutcome::ProtocolError {
					code: UNEXPECTED_STATUS_CODE.to_string(),
					detail: Some(ErrorDetail::message(format!("connector task failed: {}", e))),
				},
			};
			if outcome.is_success() {
				info!(%submission_id, %outcome, "Timed-out submission completed late");
			} else {
				warn!(%submission_id, %outcome, "Timed-out submission failed late");
			}
			// Receivers live in the ledger, so the send only fails if it was dropped.
			let _ = tx.send(LateStatus::Resolved(outcome));
		});
	}

	/// Current state of a timed-out submission, `None` if the id is unknown.
	///
	/// A resolved outcome is handed out once; the entry is dropped afterwards.
	pub fn status(&self, submission_id: &str) -> Option<LateStatus> {
		let status = self
			.entries
			.get(submission_id)
			.map(|entry| entry.value().borrow().clone())?;
		self.forget_if_resolved(submission_id, &status);
		Some(status)
	}

	/// Waits up to `grace` for a late result.
	///
	/// Returns the state at the end of the wait, `None` if the id is unknown.
	/// Like [`SubmissionLedger::status`], a resolved outcome is handed out once.
	pub async fn wait_for(&self, submission_id: &str, grace: Duration) -> Option<LateStatus> {
		let mut rx = self.entries.get(submission_id)?.value().clone();
		let _ = tokio::time::timeout(grace, rx.wait_for(|status| status.is_resolved())).await;
		let status = rx.borrow().clone();
		self.forget_if_resolved(submission_id, &status);
		Some(status)
	}

	fn forget_if_resolved(&self, submission_id: &str, status: &LateStatus) {
		if status.is_resolved() {
			self.entries.remove(submission_id);
		}
	}

	/// Submission ids that have not resolved yet.
	pub fn pending(&self) -> Vec<String> {
		self.entries
			.iter()
			.filter(|entry| !entry.value().borrow().is_resolved())
			.map(|entry| entry.key().clone())
			.collect()
	}

	/// Drops resolved entries nobody has read yet and returns how many were
	/// removed.
	pub fn prune_resolved(&self) -> usize {
		let before = self.entries.len();
		self.entries
			.retain(|_, status| !status.borrow().is_resolved());
		before - self.entries.len()
	}

	/// Number of entries, pending or resolved but not yet read.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
