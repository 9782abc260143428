//! Token acquisition orchestrated by the broker.

mod client_credentials;

// self
use crate::{
	_prelude::*, http::TokenHttpClient, oauth::TransportErrorMapper, provider::ProviderDescriptor,
};
#[cfg(feature = "reqwest")]
use crate::{
	error::ConfigError,
	http::{DEFAULT_ATTEMPT_TIMEOUT, ReqwestHttpClient},
	oauth::ReqwestTransportErrorMapper,
};

#[cfg(feature = "reqwest")]
/// Broker specialized for the crate's default reqwest transport stack.
pub type ReqwestBroker = Broker<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Obtains client-credentials tokens from a single provider descriptor.
///
/// The broker owns the HTTP client, transport error mapper, and provider descriptor so each
/// acquisition only needs the credential pair. It keeps no mutable state: every call builds
/// its requests, captures its responses, and discards them once the result is returned, so a
/// single broker can serve any number of concurrent callers.
#[derive(Clone)]
pub struct Broker<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound attempt.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before they are recorded.
	pub transport_mapper: Arc<M>,
	/// Provider descriptor that defines the endpoint, attempt order, and quirks.
	pub descriptor: ProviderDescriptor,
}
impl<C, M> Broker<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a broker that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		descriptor: ProviderDescriptor,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self { http_client: http_client.into(), transport_mapper: mapper.into(), descriptor }
	}
}
#[cfg(feature = "reqwest")]
impl Broker<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a broker with its own reqwest transport and the default per-attempt timeout.
	pub fn new(descriptor: ProviderDescriptor) -> Result<Self, ConfigError> {
		Self::with_timeout(descriptor, DEFAULT_ATTEMPT_TIMEOUT)
	}

	/// Creates a broker whose reqwest transport bounds each attempt by `timeout`.
	pub fn with_timeout(
		descriptor: ProviderDescriptor,
		timeout: Duration,
	) -> Result<Self, ConfigError> {
		Ok(Self::with_http_client(
			descriptor,
			ReqwestHttpClient::with_timeout(timeout)?,
			ReqwestTransportErrorMapper,
		))
	}
}
impl<C, M> Debug for Broker<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Broker").field("descriptor", &self.descriptor).finish()
	}
}
