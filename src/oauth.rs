//! Token endpoint wire protocol: request construction and transport error mapping.

pub use oauth2;

// crates.io
use oauth2::{
	HttpClientError, HttpRequest,
	http::{
		HeaderValue, Method, Request,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
	},
};
// self
use crate::{
	_prelude::*,
	auth::Credentials,
	error::{ConfigError, TransportError},
	provider::{ClientAuthMethod, ProviderQuirks},
};

/// Media type of every token request body.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
/// Media type requested from the token endpoint.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Maps HTTP transport failures into broker [`TransportError`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted during an attempt made with `method`.
	fn map_transport_error(&self, method: ClientAuthMethod, error: HttpClientError<E>)
	-> TransportError;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		_method: ClientAuthMethod,
		err: HttpClientError<ReqwestError>,
	) -> TransportError {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(*inner),
			HttpClientError::Http(inner) => TransportError::request(inner),
			HttpClientError::Io(inner) => TransportError::Io(inner),
			HttpClientError::Other(message) => TransportError::Other { message },
			_ => TransportError::Other { message: "unrecognized HTTP client error".into() },
		}
	}
}

/// Builds the token request for one attempt.
///
/// Every request is a `POST` with a form-encoded body and `Accept: application/json`;
/// `BasicAuth` adds the `Authorization` header while `BodyCredentials` moves the pair into
/// the body.
pub fn build_token_request(
	endpoint: &Url,
	method: ClientAuthMethod,
	credentials: &Credentials,
	quirks: &ProviderQuirks,
) -> Result<HttpRequest, ConfigError> {
	let body = method.encode_form(credentials, quirks);
	let mut builder = Request::builder()
		.method(Method::POST)
		.uri(endpoint.as_str())
		.header(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE))
		.header(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));

	if let Some(authorization) = method.authorization(credentials) {
		let mut value = HeaderValue::from_str(authorization.expose())
			.map_err(|e| ConfigError::HttpRequest(e.into()))?;

		value.set_sensitive(true);

		builder = builder.header(AUTHORIZATION, value);
	}

	Ok(builder.body(body.expose().as_bytes().to_vec())?)
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(err: ReqwestError) -> TransportError {
	if err.is_timeout() {
		TransportError::timeout(err)
	} else if err.is_connect() {
		TransportError::connect(err)
	} else if err.is_builder() || err.is_request() {
		TransportError::request(err)
	} else {
		TransportError::network(err)
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use base64::{Engine, engine::general_purpose::STANDARD};
	// self
	use super::*;

	fn endpoint() -> Url {
		Url::parse("https://api.example.com/token").expect("Failed to parse token endpoint URL.")
	}

	#[test]
	fn basic_auth_request_carries_header_and_grant_only() {
		let credentials = Credentials::new("client-id", "client-secret");
		let request = build_token_request(
			&endpoint(),
			ClientAuthMethod::BasicAuth,
			&credentials,
			&ProviderQuirks::default(),
		)
		.expect("Basic auth request should build.");

		assert_eq!(request.method(), Method::POST);
		assert_eq!(request.uri(), "https://api.example.com/token");
		assert_eq!(request.headers()[CONTENT_TYPE], FORM_CONTENT_TYPE);
		assert_eq!(request.headers()[ACCEPT], JSON_CONTENT_TYPE);
		assert!(request.headers()[AUTHORIZATION].is_sensitive());
		assert_eq!(request.body().as_slice(), b"grant_type=client_credentials");

		let header = request.headers()[AUTHORIZATION]
			.to_str()
			.expect("Authorization header should be ASCII.");
		let decoded = STANDARD
			.decode(header.trim_start_matches("Basic "))
			.expect("Authorization header should be base64.");

		assert_eq!(decoded, b"client-id:client-secret");
	}

	#[test]
	fn body_credentials_request_omits_authorization() {
		let credentials = Credentials::new("client-id", "client-secret");
		let request = build_token_request(
			&endpoint(),
			ClientAuthMethod::BodyCredentials,
			&credentials,
			&ProviderQuirks::default(),
		)
		.expect("Body credentials request should build.");

		assert!(request.headers().get(AUTHORIZATION).is_none());
		assert_eq!(
			request.body().as_slice(),
			b"grant_type=client_credentials&client_id=client-id&client_secret=client-secret"
		);
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn reqwest_mapper_keeps_other_messages() {
		let mapped = ReqwestTransportErrorMapper
			.map_transport_error(ClientAuthMethod::BasicAuth, HttpClientError::Other("boom".into()));

		assert!(matches!(mapped, TransportError::Other { message } if message == "boom"));
	}
}
