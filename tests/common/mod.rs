//! Scripted transport shared by the integration tests.

#![allow(dead_code)]

// std
use std::{
	collections::VecDeque,
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	future::{self, Future},
	pin::Pin,
	sync::Arc,
};
// crates.io
use parking_lot::Mutex;
// self
use credential_broker::{
	error::TransportError,
	flows::Broker,
	http::TokenHttpClient,
	oauth::{
		TransportErrorMapper,
		oauth2::{
			AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
			http::{
				HeaderName, HeaderValue, StatusCode,
				header::{AUTHORIZATION, CONTENT_TYPE},
			},
		},
	},
	provider::{ClientAuthMethod, ProviderDescriptor, ProviderId},
	url::Url,
};

pub const CLIENT_ID: &str = "demo-client";
pub const CLIENT_SECRET: &str = "s3cr3t+value";
pub const TOKEN_ENDPOINT: &str = "https://auth.example.com/token";

pub type FakeBroker = Broker<FakeHttpClient, FakeTransportErrorMapper>;

#[derive(Debug)]
pub enum FakeTransportError {
	Refused,
	TimedOut,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Refused => write!(f, "connection refused"),
			Self::TimedOut => write!(f, "operation timed out"),
		}
	}
}
impl StdError for FakeTransportError {}

/// One scripted reaction to an outbound request.
pub enum Step {
	Respond { status: u16, content_type: Option<&'static str>, body: String },
	Fail(FakeTransportError),
}
impl Step {
	pub fn json(status: u16, body: impl Into<String>) -> Self {
		Self::Respond { status, content_type: Some("application/json"), body: body.into() }
	}

	pub fn text(status: u16, body: impl Into<String>) -> Self {
		Self::Respond { status, content_type: Some("text/plain"), body: body.into() }
	}

	pub fn empty(status: u16) -> Self {
		Self::Respond { status, content_type: None, body: String::new() }
	}
}

/// What the broker actually sent.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
	pub authorization: Option<String>,
	pub content_type: Option<String>,
	pub body: String,
}
impl RecordedRequest {
	pub fn method(&self) -> ClientAuthMethod {
		if self.authorization.is_some() {
			ClientAuthMethod::BasicAuth
		} else {
			ClientAuthMethod::BodyCredentials
		}
	}
}

#[derive(Default)]
struct FakeState {
	script: VecDeque<Step>,
	requests: Vec<RecordedRequest>,
}

#[derive(Clone, Default)]
pub struct FakeHttpClient {
	state: Arc<Mutex<FakeState>>,
}
impl FakeHttpClient {
	pub fn scripted(steps: impl IntoIterator<Item = Step>) -> Self {
		let state = FakeState { script: steps.into_iter().collect(), requests: Vec::new() };

		Self { state: Arc::new(Mutex::new(state)) }
	}

	pub fn calls(&self) -> usize {
		self.state.lock().requests.len()
	}

	pub fn requests(&self) -> Vec<RecordedRequest> {
		self.state.lock().requests.clone()
	}
}
impl TokenHttpClient for FakeHttpClient {
	type Handle = FakeHttpHandle;
	type TransportError = FakeTransportError;

	fn handle(&self) -> Self::Handle {
		FakeHttpHandle { state: self.state.clone() }
	}
}

pub struct FakeHttpHandle {
	state: Arc<Mutex<FakeState>>,
}
impl<'a> AsyncHttpClient<'a> for FakeHttpHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future = Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send>>;

	fn call(&'a self, request: HttpRequest) -> Self::Future {
		let header = |name: HeaderName| {
			request.headers().get(name).and_then(|value| value.to_str().ok()).map(str::to_owned)
		};
		let recorded = RecordedRequest {
			authorization: header(AUTHORIZATION),
			content_type: header(CONTENT_TYPE),
			body: String::from_utf8_lossy(request.body()).into_owned(),
		};
		let step = {
			let mut state = self.state.lock();

			state.requests.push(recorded);
			state.script.pop_front()
		};
		let result = match step {
			Some(Step::Respond { status, content_type, body }) => {
				let mut response = HttpResponse::new(body.into_bytes());

				*response.status_mut() =
					StatusCode::from_u16(status).expect("Scripted status should be valid.");

				if let Some(content_type) = content_type {
					response
						.headers_mut()
						.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
				}

				Ok(response)
			},
			Some(Step::Fail(err)) => Err(HttpClientError::Reqwest(Box::new(err))),
			None => Err(HttpClientError::Other("script exhausted".into())),
		};

		Box::pin(future::ready(result))
	}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FakeTransportErrorMapper;
impl TransportErrorMapper<FakeTransportError> for FakeTransportErrorMapper {
	fn map_transport_error(
		&self,
		_method: ClientAuthMethod,
		err: HttpClientError<FakeTransportError>,
	) -> TransportError {
		match err {
			HttpClientError::Reqwest(inner) => match *inner {
				FakeTransportError::TimedOut => TransportError::timeout(*inner),
				FakeTransportError::Refused => TransportError::connect(*inner),
			},
			HttpClientError::Other(message) => TransportError::Other { message },
			other => TransportError::Other { message: format!("{other:?}") },
		}
	}
}

pub fn descriptor() -> ProviderDescriptor {
	let id = ProviderId::new("fake-provider").expect("Provider identifier should be valid.");

	ProviderDescriptor::builder(id)
		.token_endpoint(Url::parse(TOKEN_ENDPOINT).expect("Token endpoint should parse."))
		.build()
		.expect("Descriptor should build.")
}

pub fn broker(http_client: &FakeHttpClient) -> FakeBroker {
	Broker::with_http_client(descriptor(), http_client.clone(), FakeTransportErrorMapper)
}
