//! Plugs an offline [`HttpTransport`] into the client to inspect signed requests.
//!
//! The transport answers every call with a canned body and prints the `Authorization` header
//! it received, which is handy when comparing signatures with another implementation.

// crates.io
use color_eyre::Result;
use http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use serde_json::Value;
// self
use oauth1_transport::{
	OAuth1Client, OAuth1Config,
	auth::AccessToken,
	http::{HttpTransport, InboundResponse, OutboundRequest, TransportFuture},
};

struct EchoTransport;
impl HttpTransport for EchoTransport {
	fn dispatch(&self, request: OutboundRequest) -> TransportFuture<'_, InboundResponse> {
		println!("{} {}", request.method, request.url);

		if let Some(authorization) = request.headers.get(AUTHORIZATION) {
			println!("Authorization: {}", authorization.to_str().unwrap_or("<binary>"));
		}

		Box::pin(async {
			Ok(InboundResponse::from_bytes(StatusCode::OK, HeaderMap::new(), r#"{"Status":"OK"}"#))
		})
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config =
		OAuth1Config::builder("demo-consumer-key", "demo-consumer-secret", "https://api.example.com")
			.api_base_path("/api.xro/2.0")
			.build()?;
	let client = OAuth1Client::with_transport(config, EchoTransport)?
		.with_access_token(AccessToken::new("demo-token", "demo-token-secret"));
	let reply: Value = client.get("/Invoices?page=1", None).await?;

	println!("Reply: {reply}.");

	let mut sink = Vec::new();
	let written = client.download_to("/Invoices/inv-1", "application/pdf", &mut sink).await?;

	println!("Downloaded {written} bytes.");

	Ok(())
}
