//! Confidential client credentials and the sources they are loaded from.
//!
//! Credentials are read once per acquisition, trimmed of surrounding whitespace, and
//! validated by the broker before any request leaves the process.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use url::form_urlencoded::byte_serialize;
// self
use crate::{_prelude::*, auth::Secret, error::ConfigError};

/// Environment variable holding the client identifier by default.
pub const DEFAULT_CLIENT_ID_VAR: &str = "ZAKEKE_CLIENT_ID";
/// Environment variable holding the client secret by default.
pub const DEFAULT_CLIENT_SECRET_VAR: &str = "ZAKEKE_CLIENT_SECRET";

/// Client identifier + secret pair used for the client-credentials grant.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
	client_id: String,
	client_secret: Secret,
}
impl Credentials {
	/// Builds a credential pair, trimming surrounding whitespace from both values.
	///
	/// Construction never fails; blank values are rejected by [`Credentials::validate`],
	/// which the broker calls before the first attempt.
	pub fn new(client_id: impl AsRef<str>, client_secret: impl AsRef<str>) -> Self {
		Self {
			client_id: client_id.as_ref().trim().to_owned(),
			client_secret: Secret::new(client_secret.as_ref().trim()),
		}
	}

	/// Client identifier.
	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	/// Client secret (redacted when formatted).
	pub fn client_secret(&self) -> &Secret {
		&self.client_secret
	}

	/// Ensures both fields are present.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.client_id.is_empty() {
			return Err(ConfigError::MissingCredential { field: "client_id" });
		}
		if self.client_secret.is_empty() {
			return Err(ConfigError::MissingCredential { field: "client_secret" });
		}

		Ok(())
	}

	/// Base64 encoding of `client_id:client_secret` as carried by HTTP Basic auth.
	pub fn basic_token(&self) -> Secret {
		Secret::new(
			STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret.expose())),
		)
	}

	/// Full `Authorization` header value for HTTP Basic auth.
	pub fn basic_authorization(&self) -> Secret {
		Secret::new(format!("Basic {}", self.basic_token().expose()))
	}

	/// Every encoding of the secret that may travel on the wire and must be scrubbed from
	/// diagnostics: the raw secret, its form-encoded form, and the Basic token.
	pub fn sensitive_values(&self) -> [Secret; 3] {
		let form_encoded =
			byte_serialize(self.client_secret.expose().as_bytes()).collect::<String>();

		[self.client_secret.clone(), Secret::new(form_encoded), self.basic_token()]
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("client_id", &self.client_id)
			.field("client_secret", &self.client_secret)
			.finish()
	}
}

/// Supplies credentials to the gateway at the start of every call.
pub trait CredentialSource
where
	Self: Send + Sync,
{
	/// Reads the current credential pair; missing values surface as empty fields.
	fn load(&self) -> Credentials;
}
impl CredentialSource for Credentials {
	fn load(&self) -> Credentials {
		self.clone()
	}
}

/// Reads credentials from named process environment variables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvCredentialSource {
	/// Variable holding the client identifier.
	pub client_id_var: String,
	/// Variable holding the client secret.
	pub client_secret_var: String,
}
impl EnvCredentialSource {
	/// Creates a source backed by the provided variable names.
	pub fn new(client_id_var: impl Into<String>, client_secret_var: impl Into<String>) -> Self {
		Self { client_id_var: client_id_var.into(), client_secret_var: client_secret_var.into() }
	}

	/// Resolves credentials through `lookup`, treating absent variables as empty.
	pub fn load_with<F>(&self, lookup: F) -> Credentials
	where
		F: Fn(&str) -> Option<String>,
	{
		let client_id = lookup(&self.client_id_var).unwrap_or_default();
		let client_secret = lookup(&self.client_secret_var).unwrap_or_default();

		Credentials::new(client_id, client_secret)
	}
}
impl Default for EnvCredentialSource {
	fn default() -> Self {
		Self::new(DEFAULT_CLIENT_ID_VAR, DEFAULT_CLIENT_SECRET_VAR)
	}
}
impl CredentialSource for EnvCredentialSource {
	fn load(&self) -> Credentials {
		self.load_with(|name| std::env::var(name).ok())
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashMap;
	// self
	use super::*;

	#[test]
	fn new_trims_and_validate_rejects_blank_fields() {
		let credentials = Credentials::new("  client \n", "\tsecret ");

		assert_eq!(credentials.client_id(), "client");
		assert_eq!(credentials.client_secret().expose(), "secret");
		assert!(credentials.validate().is_ok());
		assert!(matches!(
			Credentials::new("   ", "secret").validate(),
			Err(ConfigError::MissingCredential { field: "client_id" })
		));
		assert!(matches!(
			Credentials::new("client", "").validate(),
			Err(ConfigError::MissingCredential { field: "client_secret" })
		));
	}

	#[test]
	fn basic_authorization_decodes_to_input_pair() {
		let credentials = Credentials::new("demo-client", "s3cr3t:with:colons");
		let header = credentials.basic_authorization();
		let encoded = header
			.expose()
			.strip_prefix("Basic ")
			.expect("Header should carry the Basic scheme.");
		let decoded = STANDARD.decode(encoded).expect("Header should be valid base64.");

		assert_eq!(
			String::from_utf8(decoded).expect("Decoded credentials should be UTF-8."),
			"demo-client:s3cr3t:with:colons"
		);
	}

	#[test]
	fn debug_output_redacts_secret() {
		let rendered = format!("{:?}", Credentials::new("visible-id", "hidden-secret"));

		assert!(rendered.contains("visible-id"));
		assert!(!rendered.contains("hidden-secret"));
	}

	#[test]
	fn env_source_treats_missing_variables_as_empty() {
		let vars = HashMap::from([("APP_ID".to_owned(), " app ".to_owned())]);
		let source = EnvCredentialSource::new("APP_ID", "APP_SECRET");
		let credentials = source.load_with(|name| vars.get(name).cloned());

		assert_eq!(credentials.client_id(), "app");
		assert!(credentials.client_secret().is_empty());
		assert!(matches!(
			credentials.validate(),
			Err(ConfigError::MissingCredential { field: "client_secret" })
		));
	}

	#[test]
	fn env_source_defaults_to_zakeke_variables() {
		let source = EnvCredentialSource::default();

		assert_eq!(source.client_id_var, DEFAULT_CLIENT_ID_VAR);
		assert_eq!(source.client_secret_var, DEFAULT_CLIENT_SECRET_VAR);
	}
}
