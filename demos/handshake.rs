//! Runs the three-legged handshake against a live API and persists the access token.
//!
//! 1. Set `OAUTH1_CONSUMER_KEY`, `OAUTH1_CONSUMER_SECRET`, and `OAUTH1_API_BASE_URL`.
//! 2. Open the printed URL, approve the application, and paste the verifier.
//! 3. The access token lands in `OAUTH1_STORE_PATH` (default `oauth1-session.json`), so the
//!    next run resumes the session and refreshes it instead of repeating the handshake.

// std
use std::{env, io, sync::Arc};
// crates.io
use color_eyre::Result;
use serde_json::Value;
// self
use oauth1_transport::{OAuth1Client, OAuth1Config, store::FileStore};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config = OAuth1Config::builder(
		env::var("OAUTH1_CONSUMER_KEY")?,
		env::var("OAUTH1_CONSUMER_SECRET")?,
		env::var("OAUTH1_API_BASE_URL")?,
	)
	.api_base_path("/api.xro/2.0")
	.callback_url("oob")
	.build()?;
	let store_path =
		env::var("OAUTH1_STORE_PATH").unwrap_or_else(|_| "oauth1-session.json".into());
	let client = OAuth1Client::new(config)?.with_store(Arc::new(FileStore::open(store_path)?));

	if client.credentials().await?.is_none() {
		let request_token = client.get_request_token().await?;

		println!("Authorize the application at {}.", client.build_authorise_url(&request_token)?);
		println!("Paste the verifier:");

		let mut verifier = String::new();

		io::stdin().read_line(&mut verifier)?;
		client.swap_request_token_for_access_token(&request_token, verifier.trim()).await?;
	}

	let organisation: Value = client.get("/Organisation", None).await?;

	println!("Connected to {}.", organisation["Organisations"][0]["Name"]);

	Ok(())
}
