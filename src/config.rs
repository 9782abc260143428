//! Explicit broker configuration.
//!
//! Everything the broker needs is carried by a [`BrokerConfig`] value instead of being read
//! from process-wide state. Defaults mirror the production deployment; JSON documents may
//! override any subset of fields.

// self
use crate::{
	_prelude::*,
	auth::EnvCredentialSource,
	error::ConfigError,
	gateway::CorsPolicy,
	provider::{
		ClientAuthMethod, DEFAULT_TOKEN_FIELDS, ProviderDescriptor, ProviderId, ProviderQuirks,
	},
};
#[cfg(feature = "reqwest")]
use crate::{
	flows::{Broker, ReqwestBroker},
	gateway::Gateway,
	http::ReqwestHttpClient,
	oauth::ReqwestTransportErrorMapper,
};

/// Token endpoint used when none is configured.
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://api.zakeke.com/token";
/// Provider identifier used when none is configured.
pub const DEFAULT_PROVIDER_ID: &str = "zakeke";
/// Per-attempt timeout, in seconds, used when none is configured.
pub const DEFAULT_ATTEMPT_TIMEOUT_SECS: u64 = 10;

/// Complete broker configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrokerConfig {
	/// Identifier used in spans and metric labels.
	pub provider_id: String,
	/// HTTPS token endpoint.
	pub token_endpoint: String,
	/// Strategies in attempt order.
	pub strategies: Vec<ClientAuthMethod>,
	/// Optional `access_type` marker for Basic-auth bodies.
	pub access_type: Option<String>,
	/// Payload keys probed for the access token, in order.
	pub token_fields: Vec<String>,
	/// Upper bound for each network attempt, in seconds.
	pub attempt_timeout_secs: u64,
	/// Environment variables holding the client credentials.
	pub credentials: EnvCredentialSource,
	/// CORS headers attached by the gateway.
	pub cors: CorsPolicy,
}
impl BrokerConfig {
	/// Parses a JSON document; errors name the offending field path.
	pub fn from_json_str(document: &str) -> Result<Self, ConfigError> {
		let mut deserializer = serde_json::Deserializer::from_str(document);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| ConfigError::Parse { source })
	}

	/// Per-attempt timeout as a [`Duration`].
	pub fn attempt_timeout(&self) -> Result<Duration, ConfigError> {
		if self.attempt_timeout_secs == 0 {
			return Err(ConfigError::InvalidTimeout);
		}

		Ok(Duration::from_secs(self.attempt_timeout_secs))
	}

	/// Validates the provider settings and produces a descriptor.
	pub fn descriptor(&self) -> Result<ProviderDescriptor, ConfigError> {
		let id = ProviderId::new(&self.provider_id)?;
		let token_endpoint = Url::parse(&self.token_endpoint)
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let quirks = ProviderQuirks {
			access_type: self.access_type.clone(),
			token_fields: self.token_fields.clone(),
		};

		Ok(ProviderDescriptor::builder(id)
			.token_endpoint(token_endpoint)
			.strategies(self.strategies.iter().copied())
			.quirks(quirks)
			.build()?)
	}

	/// Builds a reqwest-backed broker honoring the configured timeout.
	#[cfg(feature = "reqwest")]
	pub fn build_broker(&self) -> Result<ReqwestBroker, ConfigError> {
		Broker::with_timeout(self.descriptor()?, self.attempt_timeout()?)
	}

	/// Builds the caller-facing gateway reading credentials from the environment.
	#[cfg(feature = "reqwest")]
	pub fn build_gateway(
		&self,
	) -> Result<Gateway<ReqwestHttpClient, ReqwestTransportErrorMapper, EnvCredentialSource>, ConfigError>
	{
		Gateway::new(self.build_broker()?, self.credentials.clone()).with_cors(&self.cors)
	}
}
impl Default for BrokerConfig {
	fn default() -> Self {
		Self {
			provider_id: DEFAULT_PROVIDER_ID.into(),
			token_endpoint: DEFAULT_TOKEN_ENDPOINT.into(),
			strategies: ClientAuthMethod::DEFAULT_ORDER.to_vec(),
			access_type: None,
			token_fields: DEFAULT_TOKEN_FIELDS.iter().map(|field| (*field).to_owned()).collect(),
			attempt_timeout_secs: DEFAULT_ATTEMPT_TIMEOUT_SECS,
			credentials: EnvCredentialSource::default(),
			cors: CorsPolicy::default(),
		}
	}
}
