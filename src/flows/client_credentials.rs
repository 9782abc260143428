//! Client-credentials acquisition with ordered strategy fallback.
//!
//! [`Broker::acquire`] walks the descriptor's strategies in order, one network round trip
//! each, and stops at the first response that carries a usable access token. Failed attempts
//! only leave diagnostics behind; the last one becomes the caller-visible failure once the
//! list is exhausted.

// crates.io
use oauth2::AsyncHttpClient;
// self
use crate::{
	_prelude::*,
	auth::{Credentials, IssuedToken},
	error::{AcquisitionFailure, ConfigError, FailureKind, TransportError},
	flows::Broker,
	http::TokenHttpClient,
	oauth::{self, TransportErrorMapper},
	obs::{self, AttemptEvent, FlowOutcome, FlowSpan},
	payload::{self, FailureDetail, RawResponse},
	provider::ClientAuthMethod,
};

enum AttemptOutcome {
	Issued(IssuedToken),
	Failed(AttemptFailure),
}

struct AttemptFailure {
	kind: FailureKind,
	status: Option<u16>,
	content_type: String,
	detail: FailureDetail,
	transport: Option<TransportError>,
}
impl AttemptFailure {
	fn event(&self, method: ClientAuthMethod) -> AttemptEvent<'_> {
		let text = match &self.detail {
			FailureDetail::Text(text) => Some(text.as_str()),
			FailureDetail::Structured(_) | FailureDetail::NoBody => None,
		};

		AttemptEvent {
			method,
			status: self.status,
			content_type: &self.content_type,
			structured: matches!(self.detail, FailureDetail::Structured(_)),
			text,
			outcome: FlowOutcome::Rejected(self.kind),
		}
	}
}

impl<C, M> Broker<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Acquires a token using the descriptor's strategy order.
	pub async fn acquire(&self, credentials: &Credentials) -> Result<IssuedToken> {
		self.acquire_with(credentials, &self.descriptor.strategies).await
	}

	/// Acquires a token trying `strategies` in the given order.
	///
	/// Blank credentials or an empty strategy list fail with [`ConfigError`] before any
	/// request is sent. Otherwise at most `strategies.len()` sequential attempts are made.
	pub async fn acquire_with(
		&self,
		credentials: &Credentials,
		strategies: &[ClientAuthMethod],
	) -> Result<IssuedToken> {
		let span = FlowSpan::new(&self.descriptor.id, "client_credentials");

		obs::record_acquire_outcome(FlowOutcome::Attempt);

		let result = span.instrument(self.run_strategies(credentials, strategies)).await;

		match &result {
			Ok(_) => obs::record_acquire_outcome(FlowOutcome::Success),
			Err(_) => obs::record_acquire_outcome(FlowOutcome::Failure),
		}

		result
	}

	async fn run_strategies(
		&self,
		credentials: &Credentials,
		strategies: &[ClientAuthMethod],
	) -> Result<IssuedToken> {
		credentials.validate()?;

		let mut last = None;

		for method in strategies.iter().copied() {
			match self.attempt(method, credentials).await? {
				AttemptOutcome::Issued(token) => return Ok(token),
				AttemptOutcome::Failed(failure) => last = Some((method, failure)),
			}
		}

		let Some((method, failure)) = last else {
			return Err(ConfigError::NoStrategies.into());
		};

		obs::trace_exhausted(strategies.len(), failure.event(method));

		Err(AcquisitionFailure {
			kind: failure.kind,
			method,
			attempts: strategies.len(),
			status: failure.status,
			content_type: failure.content_type,
			detail: failure.detail,
			transport: failure.transport,
		}
		.into())
	}

	async fn attempt(
		&self,
		method: ClientAuthMethod,
		credentials: &Credentials,
	) -> Result<AttemptOutcome> {
		let request = oauth::build_token_request(
			&self.descriptor.token_endpoint,
			method,
			credentials,
			&self.descriptor.quirks,
		)?;
		let handle = self.http_client.handle();
		let sensitive = credentials.sensitive_values();
		let mut failure = match handle.call(request).await {
			Ok(response) => {
				let raw = RawResponse::capture(response);
				let parsed = raw.parse();
				let fields = self.descriptor.quirks.token_fields.as_slice();

				match payload::classify(&raw, &parsed, fields) {
					Ok(token) => {
						obs::trace_attempt(AttemptEvent {
							method,
							status: Some(raw.status),
							content_type: &raw.content_type,
							structured: true,
							text: None,
							outcome: FlowOutcome::Success,
						});
						obs::record_attempt_outcome(method, FlowOutcome::Success);

						return Ok(AttemptOutcome::Issued(token));
					},
					Err(kind) => AttemptFailure {
						kind,
						status: Some(raw.status),
						content_type: raw.content_type,
						detail: FailureDetail::from_payload(parsed),
						transport: None,
					},
				}
			},
			Err(err) => {
				let transport = self.transport_mapper.map_transport_error(method, err);

				AttemptFailure {
					kind: FailureKind::Transport,
					status: None,
					content_type: String::new(),
					detail: FailureDetail::Text(transport.to_string()),
					transport: Some(transport),
				}
			},
		};

		failure.detail.redact(sensitive.as_slice());

		obs::trace_attempt(failure.event(method));
		obs::record_attempt_outcome(method, FlowOutcome::Rejected(failure.kind));

		Ok(AttemptOutcome::Failed(failure))
	}
}
