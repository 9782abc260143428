//! Demonstrates registering a custom HTTP client and mapper that emit non-reqwest errors.
//!
//! 1. Implement [`TokenHttpClient`] so the broker can obtain an [`AsyncHttpClient`] handle per
//!    attempt.
//! 2. Provide a [`TransportErrorMapper`] that turns the transport's own error type into a
//!    broker [`TransportError`].
//! 3. Pass both to [`Broker::with_http_client`].
//! 4. Inspect the [`AcquisitionFailure`](credential_broker::error::AcquisitionFailure) left by
//!    the final strategy.

// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	future::{self, Future},
	pin::Pin,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};
// crates.io
use color_eyre::{Result, eyre::eyre};
use url::Url;
// self
use credential_broker::{
	auth::Credentials,
	error::TransportError,
	flows::Broker,
	http::TokenHttpClient,
	oauth::{
		TransportErrorMapper,
		oauth2::{
			AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
			http::{HeaderValue, StatusCode, header::CONTENT_TYPE},
		},
	},
	provider::{ClientAuthMethod, ProviderDescriptor, ProviderId},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let descriptor = ProviderDescriptor::builder(ProviderId::new("mock-provider")?)
		.token_endpoint(Url::parse("https://provider.example.com/token")?)
		.build()?;
	let http_client = MockHttpClient::default();
	let broker: Broker<MockHttpClient, MockTransportErrorMapper> =
		Broker::with_http_client(descriptor, http_client.clone(), MockTransportErrorMapper);
	let Err(err) = broker.acquire(&Credentials::new("demo-client", "demo-secret")).await else {
		return Err(eyre!("The mock transport never issues a token."));
	};
	let failure = err.as_failure().ok_or_else(|| eyre!("Expected strategy exhaustion, got {err}."))?;

	println!(
		"After {} attempt(s) the final {} attempt failed with {} (status {:?}): {}",
		failure.attempts,
		failure.method,
		failure.kind,
		failure.status,
		failure.detail.to_value(),
	);
	println!("Mock transport saw {} request(s).", http_client.calls.load(Ordering::Relaxed));

	Ok(())
}

#[derive(Debug)]
enum MockTransportError {
	Offline,
}
impl Display for MockTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Offline => write!(f, "mock network is offline"),
		}
	}
}
impl StdError for MockTransportError {}

/// Refuses the first request and answers every later one with a text rejection.
#[derive(Clone, Default)]
struct MockHttpClient {
	calls: Arc<AtomicUsize>,
}
impl TokenHttpClient for MockHttpClient {
	type Handle = MockHttpHandle;
	type TransportError = MockTransportError;

	fn handle(&self) -> Self::Handle {
		MockHttpHandle { calls: self.calls.clone() }
	}
}

struct MockHttpHandle {
	calls: Arc<AtomicUsize>,
}
impl<'a> AsyncHttpClient<'a> for MockHttpHandle {
	type Error = HttpClientError<MockTransportError>;
	type Future = Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send>>;

	fn call(&'a self, _request: HttpRequest) -> Self::Future {
		let result = if self.calls.fetch_add(1, Ordering::Relaxed) == 0 {
			Err(HttpClientError::Reqwest(Box::new(MockTransportError::Offline)))
		} else {
			let mut response = HttpResponse::new(b"service temporarily disabled".to_vec());

			*response.status_mut() = StatusCode::SERVICE_UNAVAILABLE;
			response.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

			Ok(response)
		};

		Box::pin(future::ready(result))
	}
}

#[derive(Clone, Copy, Debug, Default)]
struct MockTransportErrorMapper;
impl TransportErrorMapper<MockTransportError> for MockTransportErrorMapper {
	fn map_transport_error(
		&self,
		method: ClientAuthMethod,
		err: HttpClientError<MockTransportError>,
	) -> TransportError {
		match err {
			HttpClientError::Reqwest(inner) => TransportError::connect(*inner),
			other => TransportError::Other { message: format!("{method} attempt failed: {other}") },
		}
	}
}
