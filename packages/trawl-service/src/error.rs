use trawl_domain::request::RequestError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Remote quota exhausted after {cost_used} cost units: {message}")]
	QuotaExhausted { message: String, cost_used: u64 },
}
impl Error {
	/// The caller may retry once the remote cost allowance resets.
	pub fn is_recoverable(&self) -> bool {
		matches!(self, Self::QuotaExhausted { .. })
	}
}

impl From<RequestError> for Error {
	fn from(err: RequestError) -> Self {
		Self::InvalidRequest { message: err.to_string() }
	}
}
