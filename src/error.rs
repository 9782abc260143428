//! Broker-level error types shared across flows, transports, and the gateway.

// self
use crate::{
	_prelude::*,
	payload::FailureDetail,
	provider::{ClientAuthMethod, IdentifierError, ProviderDescriptorError},
};

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical broker error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem; no network call was made.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Every configured strategy was attempted without obtaining a token.
	#[error(transparent)]
	Exhausted(#[from] AcquisitionFailure),
}
impl Error {
	/// Returns the final attempt's failure when the broker ran out of strategies.
	pub fn as_failure(&self) -> Option<&AcquisitionFailure> {
		match self {
			Self::Exhausted(failure) => Some(failure),
			Self::Config(_) => None,
		}
	}
}

/// Configuration and validation failures raised by the broker.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required credential is absent or blank.
	#[error("Required credential `{field}` is missing or empty.")]
	MissingCredential {
		/// Credential field name (`client_id` or `client_secret`).
		field: &'static str,
	},
	/// Acquisition was requested with an empty strategy list.
	#[error("At least one client authentication strategy is required.")]
	NoStrategies,
	/// Provider descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] ProviderDescriptorError),
	/// Provider identifier failed validation.
	#[error(transparent)]
	ProviderId(#[from] IdentifierError),
	/// Token endpoint is not an absolute URL.
	#[error("Token endpoint is not a valid URL.")]
	InvalidEndpoint {
		/// URL parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Per-attempt timeout must be positive.
	#[error("Attempt timeout must be greater than zero.")]
	InvalidTimeout,
	/// Configuration document could not be deserialized.
	#[error("Broker configuration is invalid at `{}`.", .source.path())]
	Parse {
		/// Structured parsing failure including the offending field path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A CORS policy value is not a valid header value.
	#[error("CORS header `{header}` has an invalid value.")]
	CorsHeader {
		/// Header being configured.
		header: &'static str,
		/// Header validation failure.
		#[source]
		source: oauth2::http::header::InvalidHeaderValue,
	},
	/// Token request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, timeouts) observed on a single attempt.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// The attempt exceeded its timeout.
	#[error("Request to the token endpoint timed out.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// The connection could not be established (DNS, refused, TLS handshake).
	#[error("Could not connect to the token endpoint.")]
	Connect {
		/// Transport-specific connection error.
		#[source]
		source: BoxError,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The request could not be handed to the transport.
	#[error("Token request was rejected by the HTTP client.")]
	Request {
		/// Conversion or validation failure.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
	/// Transport reported a failure without a typed error.
	#[error("HTTP client error occurred while calling the token endpoint: {message}.")]
	Other {
		/// Transport-supplied message.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Timeout { source: Box::new(src) }
	}

	/// Wraps a transport-specific connection error.
	pub fn connect(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Connect { source: Box::new(src) }
	}

	/// Wraps a request conversion failure.
	pub fn request(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Request { source: Box::new(src) }
	}
}

/// Outcome classes for a failed acquisition attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
	/// Network, connection, or timeout failure; no response was captured.
	Transport,
	/// The token endpoint answered with a non-success status.
	UpstreamRejection,
	/// Success status, but no structured payload or no usable access token.
	MalformedResponse,
}
impl FailureKind {
	/// Returns a stable label suitable for log or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FailureKind::Transport => "transport",
			FailureKind::UpstreamRejection => "upstream_rejection",
			FailureKind::MalformedResponse => "malformed_response",
		}
	}
}
impl Display for FailureKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Diagnostics retained from the last attempted strategy once all strategies are exhausted.
///
/// The detail never carries the client secret; the broker scrubs it before the failure is
/// returned.
#[derive(Debug, ThisError)]
#[error("No access token obtained after {attempts} attempt(s); the final {method} attempt failed with {kind}.")]
pub struct AcquisitionFailure {
	/// Classification of the final attempt.
	pub kind: FailureKind,
	/// Strategy used by the final attempt.
	pub method: ClientAuthMethod,
	/// Number of network attempts made during the call.
	pub attempts: usize,
	/// HTTP status of the final attempt, absent for transport failures.
	pub status: Option<u16>,
	/// `Content-Type` reported by the final attempt (empty when absent).
	pub content_type: String,
	/// Parsed payload, raw text, or transport message from the final attempt.
	pub detail: FailureDetail,
	/// Transport error behind a [`FailureKind::Transport`] failure.
	#[source]
	pub transport: Option<TransportError>,
}
