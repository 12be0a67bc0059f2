use serde::Deserialize;
use tracing::debug;

/// Failures talking to the cocktail server.
///
/// Timeouts reported by the HTTP client surface as [`Error::Network`], the same as any other
/// transport failure.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
	#[error("network error: {0}")]
	Network(String),
	#[error("server error ({status}): {}", .reason.as_deref().unwrap_or("no details"))]
	Server { status: u16, reason: Option<String> },
	#[error("not authorized")]
	Unauthorized,
	#[error("requested resource was not found")]
	NotFound,
	#[error("failed to decode server response: {0}")]
	Decode(String),
	#[error("invalid url: {0}")]
	InvalidUrl(String),
}

#[derive(Deserialize)]
struct AbortBody {
	reason: String,
}

impl Error {
	/// Maps a non-success status and its body to an error.
	///
	/// Vapor style `{"error": true, "reason": "..."}` bodies contribute their reason, any other
	/// non-empty body is kept verbatim.
	#[must_use]
	pub fn from_status(status: u16, body: &[u8]) -> Self {
		match status {
			401 => Self::Unauthorized,
			404 => Self::NotFound,
			_ => {
				let reason = serde_json::from_slice::<AbortBody>(body)
					.map(|abort| abort.reason)
					.ok()
					.or_else(|| {
						let text = String::from_utf8_lossy(body).trim().to_string();
						(!text.is_empty()).then_some(text)
					});

				Self::Server { status, reason }
			}
		}
	}

	/// Transport level failures, the ones worth retrying once connectivity comes back.
	#[must_use]
	pub const fn is_network(&self) -> bool {
		matches!(self, Self::Network(_))
	}
}

impl From<reqwest::Error> for Error {
	fn from(e: reqwest::Error) -> Self {
		if e.is_decode() {
			Self::Decode(e.to_string())
		} else {
			Self::Network(e.to_string())
		}
	}
}

pub(crate) async fn check(response: reqwest::Response) -> Result<reqwest::Response, Error> {
	let status = response.status();

	if status.is_success() {
		return Ok(response);
	}

	let url = response.url().clone();
	let body = response.bytes().await.unwrap_or_default();
	let e = Error::from_status(status.as_u16(), &body);

	debug!(%url, status = status.as_u16(), ?e, "Server rejected request;");

	Err(e)
}

#[cfg(test)]
mod tests {
	use super::*;

	use tracing_test::traced_test;

	#[test]
	fn maps_auth_and_missing_statuses() {
		assert_eq!(Error::from_status(401, b"whatever"), Error::Unauthorized);
		assert_eq!(Error::from_status(404, b""), Error::NotFound);
	}

	#[test]
	fn server_reason_is_taken_from_abort_body() {
		let err = Error::from_status(409, br#"{"error":true,"reason":"Bar item already exists"}"#);

		assert_eq!(
			err,
			Error::Server {
				status: 409,
				reason: Some("Bar item already exists".to_string())
			}
		);
		assert_eq!(
			err.to_string(),
			"server error (409): Bar item already exists"
		);
	}

	#[test]
	fn server_reason_falls_back_to_plain_text() {
		assert_eq!(
			Error::from_status(500, b" upstream exploded \n"),
			Error::Server {
				status: 500,
				reason: Some("upstream exploded".to_string())
			}
		);

		let empty = Error::from_status(503, b"");
		assert_eq!(
			empty,
			Error::Server {
				status: 503,
				reason: None
			}
		);
		assert_eq!(empty.to_string(), "server error (503): no details");
	}

	#[test]
	fn only_transport_failures_are_network() {
		assert!(Error::Network("connection refused".into()).is_network());
		assert!(!Error::Unauthorized.is_network());
		assert!(!Error::from_status(500, b"").is_network());
	}

	#[tokio::test]
	#[traced_test]
	async fn rejected_responses_are_logged() {
		let response = reqwest::Response::from(
			http::Response::builder()
				.status(409)
				.body(r#"{"error":true,"reason":"Bar item already exists"}"#)
				.unwrap(),
		);

		let e = check(response).await.unwrap_err();

		assert_eq!(
			e,
			Error::Server {
				status: 409,
				reason: Some("Bar item already exists".to_string())
			}
		);
		assert!(logs_contain("Server rejected request;"));
	}

	#[tokio::test]
	async fn successful_responses_pass_through() {
		let response =
			reqwest::Response::from(http::Response::builder().status(204).body("").unwrap());

		assert_eq!(check(response).await.unwrap().status().as_u16(), 204);
	}
}
