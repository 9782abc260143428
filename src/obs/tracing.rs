// self
use crate::{
	_prelude::*,
	obs::FlowOutcome,
	provider::{ClientAuthMethod, ProviderId},
};

/// Maximum number of characters of an opaque body echoed into logs.
pub const BODY_PREVIEW_LIMIT: usize = 300;

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used around each acquisition.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provider + stage.
	pub fn new(provider: &ProviderId, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("credential_broker.acquire", provider = provider.as_ref(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (provider, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Fields describing one finished attempt; secrets never appear here.
#[derive(Clone, Copy, Debug)]
pub struct AttemptEvent<'a> {
	/// Strategy used for the attempt.
	pub method: ClientAuthMethod,
	/// HTTP status, absent for transport failures.
	pub status: Option<u16>,
	/// Response content type.
	pub content_type: &'a str,
	/// Whether a JSON object was parsed from the body.
	pub structured: bool,
	/// Opaque body text or transport message, already scrubbed of secrets.
	pub text: Option<&'a str>,
	/// Attempt outcome.
	pub outcome: FlowOutcome,
}

/// Emits a debug event for a finished attempt (when tracing is enabled).
pub fn trace_attempt(event: AttemptEvent<'_>) {
	#[cfg(feature = "tracing")]
	{
		let preview = event.text.map(body_preview);

		tracing::debug!(
			method = event.method.as_str(),
			status = event.status,
			content_type = event.content_type,
			has_json = event.structured,
			preview = preview.as_deref(),
			outcome = event.outcome.as_str(),
			"token endpoint attempt finished"
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = event;
	}
}

/// Emits a warning once every strategy has failed (when tracing is enabled).
pub fn trace_exhausted(attempts: usize, last: AttemptEvent<'_>) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(
			attempts,
			method = last.method.as_str(),
			status = last.status,
			outcome = last.outcome.as_str(),
			"no access token obtained from the token endpoint"
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (attempts, last);
	}
}

/// Truncates `text` to [`BODY_PREVIEW_LIMIT`] characters, marking the cut with `…`.
pub fn body_preview(text: &str) -> String {
	if text.chars().count() <= BODY_PREVIEW_LIMIT {
		return text.to_owned();
	}

	let mut buf = text.chars().take(BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	buf
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn flow_span_noop_without_tracing() {
		let provider = ProviderId::new("zakeke").expect("Provider fixture should be valid.");
		let _span = FlowSpan::new(&provider, "test");
		// Compile-time smoke test ensures the span exists even when tracing is disabled.
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let provider = ProviderId::new("zakeke").expect("Provider fixture should be valid.");
		let span = FlowSpan::new(&provider, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}

	#[test]
	fn preview_truncates_long_bodies() {
		let long = "x".repeat(BODY_PREVIEW_LIMIT + 20);
		let preview = body_preview(&long);

		assert_eq!(preview.chars().count(), BODY_PREVIEW_LIMIT + 1);
		assert!(preview.ends_with('…'));
		assert_eq!(body_preview("short"), "short");
	}
}
