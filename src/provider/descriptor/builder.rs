// std
use std::iter::IntoIterator;
// self
use crate::{
	_prelude::*,
	provider::{ClientAuthMethod, ProviderDescriptor, ProviderId, ProviderQuirks},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ProviderDescriptorError {
	/// Token endpoint is mandatory.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// At least one strategy must be attempted.
	#[error("Descriptor must enable at least one client authentication strategy.")]
	NoStrategies,
	/// Each strategy may appear once in the attempt order.
	#[error("Strategy `{method}` appears more than once in the attempt order.")]
	DuplicateStrategy {
		/// Strategy listed twice.
		method: ClientAuthMethod,
	},
	/// Endpoints must use HTTPS.
	#[error("The token endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// At least one token field name is required.
	#[error("Descriptor must name at least one access token field.")]
	NoTokenFields,
	/// Token field names cannot be blank.
	#[error("Access token field names cannot be blank.")]
	BlankTokenField,
	/// The access-type marker cannot be blank when set.
	#[error("The access_type marker cannot be blank.")]
	BlankAccessType,
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Identifier for the descriptor being constructed.
	pub id: ProviderId,
	/// Token endpoint used for every attempt.
	pub token_endpoint: Option<Url>,
	/// Attempt order; starts as [`ClientAuthMethod::DEFAULT_ORDER`].
	pub strategies: Vec<ClientAuthMethod>,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder seeded with the provided identifier and the default attempt order.
	pub fn new(id: ProviderId) -> Self {
		Self {
			id,
			token_endpoint: None,
			strategies: ClientAuthMethod::DEFAULT_ORDER.to_vec(),
			quirks: ProviderQuirks::default(),
		}
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Replaces the attempt order.
	pub fn strategies<I>(mut self, strategies: I) -> Self
	where
		I: IntoIterator<Item = ClientAuthMethod>,
	{
		self.strategies = strategies.into_iter().collect();

		self
	}

	/// Sets the `access_type` marker sent with Basic-auth requests.
	pub fn access_type(mut self, marker: impl Into<String>) -> Self {
		self.quirks.access_type = Some(marker.into());

		self
	}

	/// Overrides the provider quirks.
	pub fn quirks(mut self, quirks: ProviderQuirks) -> Self {
		self.quirks = quirks;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let token_endpoint =
			self.token_endpoint.ok_or(ProviderDescriptorError::MissingTokenEndpoint)?;
		let descriptor = ProviderDescriptor {
			id: self.id,
			token_endpoint,
			strategies: self.strategies,
			quirks: self.quirks,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ProviderDescriptorError> {
		if self.strategies.is_empty() {
			return Err(ProviderDescriptorError::NoStrategies);
		}

		for (idx, method) in self.strategies.iter().enumerate() {
			if self.strategies[..idx].contains(method) {
				return Err(ProviderDescriptorError::DuplicateStrategy { method: *method });
			}
		}

		validate_endpoint(&self.token_endpoint)?;
		validate_quirks(&self.quirks)?;

		Ok(())
	}
}

fn validate_endpoint(url: &Url) -> Result<(), ProviderDescriptorError> {
	if url.scheme() != "https" {
		Err(ProviderDescriptorError::InsecureEndpoint { url: url.to_string() })
	} else {
		Ok(())
	}
}

fn validate_quirks(quirks: &ProviderQuirks) -> Result<(), ProviderDescriptorError> {
	if quirks.token_fields.is_empty() {
		return Err(ProviderDescriptorError::NoTokenFields);
	}
	if quirks.token_fields.iter().any(|field| field.trim().is_empty()) {
		return Err(ProviderDescriptorError::BlankTokenField);
	}
	if quirks.access_type.as_deref().is_some_and(|marker| marker.trim().is_empty()) {
		return Err(ProviderDescriptorError::BlankAccessType);
	}

	Ok(())
}
