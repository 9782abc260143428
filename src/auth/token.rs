//! Normalized token payload republished to callers.

// self
use crate::{_prelude::*, auth::Secret};

/// Minimal token payload returned after a successful acquisition.
///
/// Only the access token and its lifetime survive normalization; every other upstream field is
/// dropped. Serializes as `{"access-token": "...", "expires_in": 3600}` (`null` when the
/// endpoint omitted the lifetime).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
	/// Bearer token issued by the endpoint; never empty.
	#[serde(rename = "access-token")]
	pub access_token: Secret,
	/// Lifetime in seconds, when the endpoint reported one.
	pub expires_in: Option<u64>,
}
impl IssuedToken {
	/// Wraps a token value and optional lifetime.
	pub fn new(access_token: impl Into<String>, expires_in: Option<u64>) -> Self {
		Self { access_token: Secret::new(access_token), expires_in }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn serializes_caller_contract_keys() {
		let token = IssuedToken::new("abc", Some(3600));
		let value = serde_json::to_value(&token).expect("Token should serialize.");

		assert_eq!(value, serde_json::json!({ "access-token": "abc", "expires_in": 3600 }));

		let value = serde_json::to_value(IssuedToken::new("abc", None))
			.expect("Token without lifetime should serialize.");

		assert_eq!(value, serde_json::json!({ "access-token": "abc", "expires_in": null }));
	}
}
