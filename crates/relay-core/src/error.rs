//! Request-level error and its HTTP mapping.

use relay_types::{DecodeError, RelayOutcome, RequestShapeError, SubmissionError, VerificationError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
	#[error(transparent)]
	Request(#[from] RequestShapeError),

	#[error("Meta signature invalid: {0}")]
	Decode(#[from] DecodeError),

	#[error("Meta signature invalid: {0}")]
	Verification(#[from] VerificationError),

	#[error(transparent)]
	Submission(#[from] SubmissionError),
}

impl RelayError {
	/// HTTP status code reported for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			RelayError::Request(_) => 400,
			RelayError::Decode(_) | RelayError::Verification(_) => 403,
			RelayError::Submission(SubmissionError::PendingTimeout { .. }) => 504,
			RelayError::Submission(_) => 502,
		}
	}

	pub fn into_outcome(self) -> RelayOutcome {
		RelayOutcome::error(self.status_code(), self.to_string())
	}
}
