// self
use crate::_prelude::*;

/// Key names probed for the access token, in order of preference.
pub const DEFAULT_TOKEN_FIELDS: [&str; 2] = ["access-token", "access_token"];

/// Provider-specific quirks that influence request construction and response parsing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderQuirks {
	/// Fixed `access_type` marker appended to Basic-auth request bodies.
	pub access_type: Option<String>,
	/// Payload keys checked for the access token; the first non-empty string wins.
	pub token_fields: Vec<String>,
}
impl Default for ProviderQuirks {
	fn default() -> Self {
		Self {
			access_type: None,
			token_fields: DEFAULT_TOKEN_FIELDS.iter().map(|field| (*field).to_owned()).collect(),
		}
	}
}
