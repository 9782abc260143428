//! Token endpoint response capture, parsing, and outcome classification.
//!
//! A response is captured once into a [`RawResponse`], interpreted as a [`ParsedPayload`]
//! (`Structured` JSON object or `Opaque` text), and then classified into either an
//! [`IssuedToken`] or a [`FailureKind`]. Nothing here touches the network.

// crates.io
use oauth2::{HttpResponse, http::header::CONTENT_TYPE};
use serde::Serializer;
use serde_json::{Map, Value};
// self
use crate::{_prelude::*, auth::IssuedToken, error::FailureKind};

/// Placeholder used for secrets scrubbed from diagnostics.
pub const REDACTED: &str = "<redacted>";

/// Response exactly as it came off the wire; immutable once captured.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
	/// HTTP status code.
	pub status: u16,
	/// `Content-Type` header value (empty when absent or not visible ASCII).
	pub content_type: String,
	/// Body decoded as UTF-8 (lossy).
	pub body: String,
}
impl RawResponse {
	/// Creates a response from already captured parts.
	pub fn new(status: u16, content_type: impl Into<String>, body: impl Into<String>) -> Self {
		Self { status, content_type: content_type.into(), body: body.into() }
	}

	/// Captures an HTTP response, consuming its body a single time.
	pub fn capture(response: HttpResponse) -> Self {
		let status = response.status().as_u16();
		let content_type = response
			.headers()
			.get(CONTENT_TYPE)
			.and_then(|value| value.to_str().ok())
			.unwrap_or_default()
			.to_owned();
		let body = String::from_utf8_lossy(response.body()).into_owned();

		Self { status, content_type, body }
	}

	/// Returns true for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns true when the content type declares a JSON media type.
	pub fn declares_json(&self) -> bool {
		let essence = self.content_type.split(';').next().unwrap_or_default().trim();
		let essence = essence.to_ascii_lowercase();

		essence.ends_with("/json") || essence.ends_with("+json")
	}

	/// Interprets the body, degrading to opaque text whenever it is not a JSON object.
	pub fn parse(&self) -> ParsedPayload {
		let json_like = self.declares_json() || self.body.trim_start().starts_with('{');

		if json_like && let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&self.body) {
			return ParsedPayload::Structured(map);
		}

		ParsedPayload::Opaque(self.body.clone())
	}
}

/// Interpretation of a response body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedPayload {
	/// Body parsed as a JSON object.
	Structured(Map<String, Value>),
	/// Body kept as text (non-JSON content type, parse failure, or non-object JSON).
	Opaque(String),
}
impl ParsedPayload {
	/// Returns true for [`ParsedPayload::Structured`].
	pub fn is_structured(&self) -> bool {
		matches!(self, Self::Structured(_))
	}

	/// Returns the first non-empty string found under `fields`, in order.
	pub fn access_token<S>(&self, fields: &[S]) -> Option<&str>
	where
		S: AsRef<str>,
	{
		let Self::Structured(map) = self else {
			return None;
		};

		fields
			.iter()
			.filter_map(|field| map.get(field.as_ref()).and_then(Value::as_str))
			.find(|token| !token.trim().is_empty())
	}

	/// Returns `expires_in` when it is a non-negative whole number (or a numeric string).
	pub fn expires_in(&self) -> Option<u64> {
		let Self::Structured(map) = self else {
			return None;
		};

		match map.get("expires_in")? {
			Value::Number(number) => number.as_u64().or_else(|| {
				number
					.as_f64()
					.filter(|secs| *secs >= 0.0 && secs.fract() == 0.0 && *secs <= u64::MAX as f64)
					.map(|secs| secs as u64)
			}),
			Value::String(text) => text.trim().parse().ok(),
			_ => None,
		}
	}
}

/// Classifies a captured response into a token or a failure kind.
///
/// Success requires a 2xx status, a structured payload, and a non-empty token under one of
/// `token_fields`. Non-2xx statuses are upstream rejections; anything else is malformed.
pub fn classify<S>(
	raw: &RawResponse,
	payload: &ParsedPayload,
	token_fields: &[S],
) -> Result<IssuedToken, FailureKind>
where
	S: AsRef<str>,
{
	if !raw.is_success() {
		return Err(FailureKind::UpstreamRejection);
	}

	payload
		.access_token(token_fields)
		.map(|token| IssuedToken::new(token, payload.expires_in()))
		.ok_or(FailureKind::MalformedResponse)
}

/// Diagnostic detail returned to callers after all strategies fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailureDetail {
	/// Structured payload from the final attempt.
	Structured(Map<String, Value>),
	/// Raw body text, or the transport message when no response arrived.
	Text(String),
	/// The final attempt returned an empty body.
	NoBody,
}
impl FailureDetail {
	/// Marker serialized for [`FailureDetail::NoBody`].
	pub const NO_BODY: &'static str = "no response body";

	/// Builds the detail for a response, preferring the parsed payload over raw text.
	pub fn from_payload(payload: ParsedPayload) -> Self {
		match payload {
			ParsedPayload::Structured(map) => Self::Structured(map),
			ParsedPayload::Opaque(text) if text.trim().is_empty() => Self::NoBody,
			ParsedPayload::Opaque(text) => Self::Text(text),
		}
	}

	/// Replaces every occurrence of `needles` (ignoring empty ones) with [`REDACTED`].
	pub fn redact<S>(&mut self, needles: &[S])
	where
		S: AsRef<str>,
	{
		let mut needles: Vec<&str> = needles
			.iter()
			.map(|needle| needle.as_ref())
			.filter(|needle| !needle.is_empty())
			.collect();

		// Longest first so overlapping needles redact the widest match.
		needles.sort_unstable_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
		needles.dedup();

		if needles.is_empty() {
			return;
		}

		match self {
			Self::Structured(map) =>
				for value in map.values_mut() {
					redact_value(value, &needles);
				},
			Self::Text(text) => redact_str(text, &needles),
			Self::NoBody => {},
		}
	}

	/// Converts the detail into a JSON value for caller-facing bodies.
	pub fn to_value(&self) -> Value {
		match self {
			Self::Structured(map) => Value::Object(map.clone()),
			Self::Text(text) => Value::String(text.clone()),
			Self::NoBody => Value::String(Self::NO_BODY.into()),
		}
	}
}
impl Serialize for FailureDetail {
	fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		match self {
			Self::Structured(map) => map.serialize(serializer),
			Self::Text(text) => serializer.serialize_str(text),
			Self::NoBody => serializer.serialize_str(Self::NO_BODY),
		}
	}
}

fn redact_value(value: &mut Value, needles: &[&str]) {
	match value {
		Value::String(text) => redact_str(text, needles),
		Value::Array(items) =>
			for item in items {
				redact_value(item, needles);
			},
		Value::Object(map) =>
			for item in map.values_mut() {
				redact_value(item, needles);
			},
		_ => {},
	}
}

// Single left-to-right pass over the original text; inserted markers are never rescanned.
fn redact_str(text: &mut String, needles: &[&str]) {
	if !needles.iter().any(|needle| text.contains(needle)) {
		return;
	}

	let mut buf = String::with_capacity(text.len());
	let mut rest = text.as_str();

	while let Some(c) = rest.chars().next() {
		if let Some(needle) = needles.iter().find(|needle| rest.starts_with(**needle)) {
			buf.push_str(REDACTED);
			rest = &rest[needle.len()..];
		} else {
			buf.push(c);
			rest = &rest[c.len_utf8()..];
		}
	}

	*text = buf;
}
