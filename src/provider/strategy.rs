//! Client authentication strategies for the token endpoint.
//!
//! A strategy decides where the client id and secret travel: an HTTP Basic
//! `Authorization` header, or extra fields in the form-encoded body. Strategies only
//! shape the request; dispatch and classification live in the broker.

// crates.io
use url::form_urlencoded::Serializer;
// self
use crate::{
	_prelude::*,
	auth::{Credentials, Secret},
	provider::ProviderQuirks,
};

/// Grant type sent with every token request.
pub const GRANT_TYPE: &str = "client_credentials";

/// Credential transmission method used for one attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	/// HTTP Basic `Authorization` header; the body carries only the grant type.
	BasicAuth,
	/// `client_id`/`client_secret` form fields next to the grant type.
	BodyCredentials,
}
impl ClientAuthMethod {
	/// Attempt order used when no explicit order is configured.
	pub const DEFAULT_ORDER: [Self; 2] = [Self::BasicAuth, Self::BodyCredentials];

	/// Returns a stable label suitable for span, log, or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ClientAuthMethod::BasicAuth => "basic_auth",
			ClientAuthMethod::BodyCredentials => "body_credentials",
		}
	}

	/// `Authorization` header value required by this strategy, if any.
	pub fn authorization(self, credentials: &Credentials) -> Option<Secret> {
		match self {
			ClientAuthMethod::BasicAuth => Some(credentials.basic_authorization()),
			ClientAuthMethod::BodyCredentials => None,
		}
	}

	/// Form fields sent by this strategy, in wire order.
	pub fn form_fields<'a>(
		self,
		credentials: &'a Credentials,
		quirks: &'a ProviderQuirks,
	) -> Vec<(&'static str, &'a str)> {
		let mut fields = vec![("grant_type", GRANT_TYPE)];

		match self {
			ClientAuthMethod::BasicAuth =>
				if let Some(marker) = quirks.access_type.as_deref() {
					fields.push(("access_type", marker));
				},
			ClientAuthMethod::BodyCredentials => {
				fields.push(("client_id", credentials.client_id()));
				fields.push(("client_secret", credentials.client_secret().expose()));
			},
		}

		fields
	}

	/// Encodes the form body; wrapped because it may contain the client secret.
	pub fn encode_form(self, credentials: &Credentials, quirks: &ProviderQuirks) -> Secret {
		let body = Serializer::new(String::new())
			.extend_pairs(self.form_fields(credentials, quirks))
			.finish();

		Secret::new(body)
	}
}
impl Display for ClientAuthMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for ClientAuthMethod {
	type Err = UnknownStrategyError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"basic_auth" | "basic" | "client_secret_basic" => Ok(Self::BasicAuth),
			"body_credentials" | "body" | "client_secret_post" => Ok(Self::BodyCredentials),
			_ => Err(UnknownStrategyError { value: s.to_owned() }),
		}
	}
}

/// Error returned when a strategy label is not recognized.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unknown client authentication strategy `{value}`.")]
pub struct UnknownStrategyError {
	/// Label that failed to parse.
	pub value: String,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn credentials() -> Credentials {
		Credentials::new("demo id", "p@ss&word=")
	}

	#[test]
	fn basic_auth_body_carries_only_grant_type() {
		let quirks = ProviderQuirks::default();
		let body = ClientAuthMethod::BasicAuth.encode_form(&credentials(), &quirks);

		assert_eq!(body.expose(), "grant_type=client_credentials");
		assert!(ClientAuthMethod::BasicAuth.authorization(&credentials()).is_some());
	}

	#[test]
	fn basic_auth_appends_access_type_marker() {
		let quirks = ProviderQuirks { access_type: Some("S2S".into()), ..Default::default() };
		let body = ClientAuthMethod::BasicAuth.encode_form(&credentials(), &quirks);

		assert_eq!(body.expose(), "grant_type=client_credentials&access_type=S2S");
	}

	#[test]
	fn body_credentials_form_encodes_fields() {
		let quirks = ProviderQuirks { access_type: Some("S2S".into()), ..Default::default() };
		let body = ClientAuthMethod::BodyCredentials.encode_form(&credentials(), &quirks);

		assert_eq!(
			body.expose(),
			"grant_type=client_credentials&client_id=demo+id&client_secret=p%40ss%26word%3D"
		);
		assert!(ClientAuthMethod::BodyCredentials.authorization(&credentials()).is_none());
	}

	#[test]
	fn labels_parse_with_aliases() {
		assert_eq!("basic".parse::<ClientAuthMethod>(), Ok(ClientAuthMethod::BasicAuth));
		assert_eq!(
			"client_secret_post".parse::<ClientAuthMethod>(),
			Ok(ClientAuthMethod::BodyCredentials)
		);
		assert!("bearer".parse::<ClientAuthMethod>().is_err());
		assert_eq!(ClientAuthMethod::BodyCredentials.to_string(), "body_credentials");
	}
}
