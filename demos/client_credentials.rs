//! Demonstrates the gateway answering a caller with the default reqwest transport while the
//! token endpoint rejects Basic auth and accepts body credentials.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use credential_broker::{
	auth::Credentials,
	flows::Broker,
	gateway::Gateway,
	http::ReqwestHttpClient,
	oauth::{ReqwestTransportErrorMapper, oauth2::http::Method},
	provider::{ProviderDescriptor, ProviderId},
	reqwest::{Client, redirect::Policy},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let basic_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token").body("grant_type=client_credentials");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_client\"}");
		})
		.await;
	let body_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.body("grant_type=client_credentials&client_id=demo-client&client_secret=super-secret");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"bearer\",\"expires_in\":900}",
			);
		})
		.await;
	let descriptor = ProviderDescriptor::builder(ProviderId::new("demo-provider")?)
		.token_endpoint(Url::parse(&server.url("/token"))?)
		.build()?;
	let http_client = ReqwestHttpClient::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(Policy::none())
			.build()?,
	);
	let broker = <Broker<ReqwestHttpClient, ReqwestTransportErrorMapper>>::with_http_client(
		descriptor,
		http_client,
		ReqwestTransportErrorMapper,
	);
	let gateway = Gateway::new(broker, Credentials::new("demo-client", "super-secret"));
	let preflight = gateway.handle(&Method::OPTIONS).await;

	println!("Preflight answered with {}.", preflight.status());

	let response = gateway.handle(&Method::GET).await;

	println!("Caller received {}: {}", response.status(), response.body());

	basic_mock.assert_async().await;
	body_mock.assert_async().await;

	Ok(())
}
