//! Provider descriptor data structures shared by the broker and its configuration.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// Provider-specific quirk toggles.
pub mod quirks;

pub use builder::*;
pub use quirks::*;

// self
use crate::{
	_prelude::*,
	provider::{ClientAuthMethod, ProviderId},
};

/// Immutable provider descriptor consumed by the broker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Descriptor identifier.
	pub id: ProviderId,
	/// Token endpoint receiving every client-credentials request.
	pub token_endpoint: Url,
	/// Strategies in the order they are attempted.
	pub strategies: Vec<ClientAuthMethod>,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProviderId) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id)
	}

	/// Returns the strategy attempted first.
	pub fn primary_strategy(&self) -> Option<ClientAuthMethod> {
		self.strategies.first().copied()
	}
}
