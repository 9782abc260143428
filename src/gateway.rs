//! Caller-facing handler that republishes broker results as HTTP responses.
//!
//! The gateway is transport-agnostic: it accepts the caller's request method and returns an
//! [`http::Response`](oauth2::http::Response) with a JSON body, leaving the actual server (or
//! serverless runtime) to the embedding application. Only the normalized token ever reaches
//! the caller; failures expose the final attempt's scrubbed diagnostics.

// crates.io
use oauth2::http::{
	HeaderValue, Method, Response, StatusCode,
	header::{
		ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
		ALLOW, CONTENT_TYPE,
	},
};
use serde_json::{Value, json};
// self
use crate::{
	_prelude::*,
	auth::{CredentialSource, IssuedToken},
	error::{AcquisitionFailure, ConfigError, FailureKind},
	flows::Broker,
	http::TokenHttpClient,
	oauth::{JSON_CONTENT_TYPE, TransportErrorMapper},
};

/// Methods answered by the gateway, as advertised in `Allow`.
pub const ALLOWED_METHODS: &str = "GET, OPTIONS";

/// CORS headers attached to gateway responses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsPolicy {
	/// `Access-Control-Allow-Origin`, sent on every response.
	pub allow_origin: String,
	/// `Access-Control-Allow-Methods`, sent on preflight responses.
	pub allow_methods: String,
	/// `Access-Control-Allow-Headers`, sent on preflight responses.
	pub allow_headers: String,
}
impl Default for CorsPolicy {
	fn default() -> Self {
		Self {
			allow_origin: "*".into(),
			allow_methods: "GET,OPTIONS".into(),
			allow_headers: "Content-Type,Authorization".into(),
		}
	}
}

#[derive(Clone, Debug)]
struct CorsHeaders {
	allow_origin: HeaderValue,
	allow_methods: HeaderValue,
	allow_headers: HeaderValue,
}
impl CorsHeaders {
	fn from_policy(policy: &CorsPolicy) -> Result<Self, ConfigError> {
		fn value(header: &'static str, raw: &str) -> Result<HeaderValue, ConfigError> {
			HeaderValue::from_str(raw).map_err(|source| ConfigError::CorsHeader { header, source })
		}

		Ok(Self {
			allow_origin: value("access-control-allow-origin", &policy.allow_origin)?,
			allow_methods: value("access-control-allow-methods", &policy.allow_methods)?,
			allow_headers: value("access-control-allow-headers", &policy.allow_headers)?,
		})
	}
}
impl Default for CorsHeaders {
	fn default() -> Self {
		Self {
			allow_origin: HeaderValue::from_static("*"),
			allow_methods: HeaderValue::from_static("GET,OPTIONS"),
			allow_headers: HeaderValue::from_static("Content-Type,Authorization"),
		}
	}
}

/// Routes caller requests to the broker and shapes the response.
pub struct Gateway<C, M, S>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
	S: CredentialSource,
{
	broker: Broker<C, M>,
	credentials: S,
	cors: CorsHeaders,
}
impl<C, M, S> Gateway<C, M, S>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
	S: CredentialSource,
{
	/// Creates a gateway with the wildcard CORS policy.
	pub fn new(broker: Broker<C, M>, credentials: S) -> Self {
		Self { broker, credentials, cors: CorsHeaders::default() }
	}

	/// Replaces the CORS policy, rejecting values that cannot be sent as headers.
	pub fn with_cors(mut self, policy: &CorsPolicy) -> Result<Self, ConfigError> {
		self.cors = CorsHeaders::from_policy(policy)?;

		Ok(self)
	}

	/// Broker used for `GET` requests.
	pub fn broker(&self) -> &Broker<C, M> {
		&self.broker
	}

	/// Answers one caller request.
	///
	/// `OPTIONS` is answered locally, `GET` runs one acquisition with freshly loaded
	/// credentials, and every other method is refused with `405`.
	pub async fn handle(&self, method: &Method) -> Response<String> {
		if *method == Method::OPTIONS {
			return self.preflight();
		}
		if *method != Method::GET {
			let mut response = self.json(
				StatusCode::METHOD_NOT_ALLOWED,
				json!({ "error": "Method not allowed", "method": method.as_str() }),
			);

			response.headers_mut().insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));

			return response;
		}

		let credentials = self.credentials.load();

		match self.broker.acquire(&credentials).await {
			Ok(token) => self.json(StatusCode::OK, token_body(&token)),
			Err(Error::Config(e)) => self.config_failure(&e),
			Err(Error::Exhausted(failure)) => self.acquisition_failure(&failure),
		}
	}

	fn preflight(&self) -> Response<String> {
		let mut response = self.respond(StatusCode::NO_CONTENT, String::new());
		let headers = response.headers_mut();

		headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.cors.allow_methods.clone());
		headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.cors.allow_headers.clone());

		response
	}

	fn config_failure(&self, e: &ConfigError) -> Response<String> {
		let error = match e {
			ConfigError::MissingCredential { .. } => "Missing client credentials",
			_ => "Broker misconfigured",
		};

		self.json(
			StatusCode::INTERNAL_SERVER_ERROR,
			json!({ "error": error, "message": e.to_string() }),
		)
	}

	fn acquisition_failure(&self, failure: &AcquisitionFailure) -> Response<String> {
		match failure.kind {
			FailureKind::UpstreamRejection => {
				let status = failure
					.status
					.and_then(|status| StatusCode::from_u16(status).ok())
					.filter(|status| status.is_client_error() || status.is_server_error())
					.unwrap_or(StatusCode::BAD_GATEWAY);

				self.json(status, diagnostics("Token request failed", failure))
			},
			FailureKind::MalformedResponse => self.json(
				StatusCode::INTERNAL_SERVER_ERROR,
				diagnostics("Token response missing access token", failure),
			),
			FailureKind::Transport => self.json(
				StatusCode::BAD_GATEWAY,
				json!({
					"error": "Token endpoint unreachable",
					"message": failure.detail.to_value(),
				}),
			),
		}
	}

	fn json(&self, status: StatusCode, body: Value) -> Response<String> {
		let mut response = self.respond(status, body.to_string());

		response.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));

		response
	}

	fn respond(&self, status: StatusCode, body: String) -> Response<String> {
		let mut response = Response::new(body);

		*response.status_mut() = status;
		response.headers_mut().insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.cors.allow_origin.clone());

		response
	}
}
impl<C, M, S> Debug for Gateway<C, M, S>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
	S: CredentialSource,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Gateway").field("broker", &self.broker).field("cors", &self.cors).finish()
	}
}

fn token_body(token: &IssuedToken) -> Value {
	json!({ "access-token": token.access_token.expose(), "expires_in": token.expires_in })
}

fn diagnostics(error: &str, failure: &AcquisitionFailure) -> Value {
	json!({
		"error": error,
		"status": failure.status,
		"contentType": failure.content_type,
		"detail": failure.detail.to_value(),
	})
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::{auth::Credentials, config::BrokerConfig};

	fn gateway(credentials: Credentials) -> Gateway<
		crate::http::ReqwestHttpClient,
		crate::oauth::ReqwestTransportErrorMapper,
		Credentials,
	> {
		let broker = BrokerConfig::default().build_broker().expect("Default broker should build.");

		Gateway::new(broker, credentials)
	}

	fn body(response: &Response<String>) -> Value {
		serde_json::from_str(response.body()).expect("Gateway bodies should be JSON.")
	}

	#[tokio::test]
	async fn options_returns_preflight_headers() {
		let response = gateway(Credentials::new("id", "secret")).handle(&Method::OPTIONS).await;

		assert_eq!(response.status(), StatusCode::NO_CONTENT);
		assert!(response.body().is_empty());
		assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
		assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_METHODS], "GET,OPTIONS");
		assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type,Authorization");
	}

	#[tokio::test]
	async fn other_methods_are_refused() {
		let response = gateway(Credentials::new("id", "secret")).handle(&Method::POST).await;

		assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
		assert_eq!(response.headers()[ALLOW], ALLOWED_METHODS);
		assert_eq!(response.headers()[CONTENT_TYPE], JSON_CONTENT_TYPE);
		assert_eq!(body(&response)["method"], "POST");
	}

	#[tokio::test]
	async fn missing_credentials_short_circuit_with_500() {
		let response = gateway(Credentials::new("", "secret")).handle(&Method::GET).await;

		assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
		assert_eq!(body(&response)["error"], "Missing client credentials");
	}

	#[test]
	fn custom_cors_policy_is_validated() {
		let policy = CorsPolicy { allow_origin: "https://shop.example.com".into(), ..Default::default() };
		let configured = gateway(Credentials::new("id", "secret"))
			.with_cors(&policy)
			.expect("Origin should be a valid header value.");

		assert_eq!(configured.cors.allow_origin, "https://shop.example.com");

		let policy = CorsPolicy { allow_origin: "bad\norigin".into(), ..Default::default() };

		assert!(matches!(
			gateway(Credentials::new("id", "secret")).with_cors(&policy),
			Err(ConfigError::CorsHeader { header: "access-control-allow-origin", .. })
		));
	}
}
