#![cfg(all(feature = "reqwest", feature = "test"))]

// std
use std::collections::BTreeMap;
// crates.io
use http::{HeaderMap, HeaderValue, Method, StatusCode, header::AUTHORIZATION};
use httpmock::prelude::*;
use parking_lot::Mutex;
use percent_encoding::percent_decode_str;
use serde_json::{Value, json};
use time::{Duration, OffsetDateTime};
// self
use oauth1_transport::{
	OAuth1Client, OAuth1Config, ReqwestOAuth1Client,
	_preludet::build_reqwest_test_client,
	auth::{AccessToken, RequestToken},
	error::{Error, TransportError},
	ext::{ApiTransport, TokenHandshake},
	http::{HttpTransport, InboundResponse, OutboundRequest, TransportFuture},
	signing::{SigningRequest, TokenCredentials},
};

const BASE_PATH: &str = "/api.xro/2.0";

fn config(base_url: impl Into<String>) -> OAuth1Config {
	OAuth1Config::builder("consumer-key", "consumer-secret", base_url)
		.api_base_path(BASE_PATH)
		.build()
		.expect("Test configuration should be valid.")
}

fn client(server: &MockServer, token: AccessToken) -> ReqwestOAuth1Client {
	build_reqwest_test_client(config(server.base_url())).with_access_token(token)
}

#[derive(Default)]
struct Capture(Mutex<Vec<OutboundRequest>>);
impl HttpTransport for Capture {
	fn dispatch(&self, request: OutboundRequest) -> TransportFuture<'_, InboundResponse> {
		self.0.lock().push(request);

		Box::pin(async {
			Ok::<_, TransportError>(InboundResponse::from_bytes(
				StatusCode::OK,
				HeaderMap::new(),
				r#"{"Organisations":[{"Name":"Demo Company"}]}"#,
			))
		})
	}
}

fn oauth_params(authorization: &str) -> BTreeMap<String, String> {
	authorization
		.strip_prefix("OAuth ")
		.expect("Authorization should use the OAuth scheme.")
		.split(',')
		.map(|pair| {
			let (key, value) = pair.split_once('=').expect("Each parameter should be key=value.");
			let value = percent_decode_str(value.trim_matches('"'))
				.decode_utf8()
				.expect("Header values should decode as UTF-8.");

			(key.to_owned(), value.into_owned())
		})
		.collect()
}

#[tokio::test]
async fn get_merges_headers_and_parses_json() {
	let server = MockServer::start_async().await;
	let client = client(&server, AccessToken::new("tok", "tok-secret"));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api.xro/2.0/Contacts")
				.query_param("page", "2")
				.header("accept", "application/json")
				.header("if-modified-since", "Mon, 01 Jan 2024 00:00:00 GMT")
				.header_includes("user-agent", "oauth1-transport/")
				.header_includes("authorization", r#"oauth_token="tok""#);
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"Contacts":[{"Name":"A"}]}"#);
		})
		.await;
	let mut custom = HeaderMap::new();

	custom.insert("if-modified-since", HeaderValue::from_static("Mon, 01 Jan 2024 00:00:00 GMT"));

	let body: Value =
		client.get("/Contacts?page=2", Some(&custom)).await.expect("GET should succeed.");

	assert_eq!(body["Contacts"][0]["Name"], "A");

	mock.assert_async().await;
}

#[tokio::test]
async fn every_verb_surfaces_rejections_verbatim() {
	let server = MockServer::start_async().await;
	let client = client(&server, AccessToken::new("tok", "tok-secret"));
	let mock = server
		.mock_async(|when, then| {
			when.path("/api.xro/2.0/Items");
			then.status(400).body(r#"{"Message":"bad"}"#);
		})
		.await;
	let payload = json!({ "Code": "A1" });
	let results = [
		client.get::<Value>("/Items", None).await,
		client.put::<_, Value>("/Items", &payload, None).await,
		client.post::<_, Value>("/Items", &payload, None).await,
		client.patch::<_, Value>("/Items", &payload, None).await,
		client.delete::<Value>("/Items", None).await,
	];

	for result in results {
		match result.expect_err("Every verb should surface the 400.") {
			Error::UpstreamRejected { status, body, .. } => {
				assert_eq!(status, 400);
				assert_eq!(body, r#"{"Message":"bad"}"#);
			},
			other => panic!("Unexpected error: {other:?}"),
		}
	}

	mock.assert_calls_async(5).await;
}

#[tokio::test]
async fn post_sends_json_body() {
	let server = MockServer::start_async().await;
	let client = client(&server, AccessToken::new("tok", "tok-secret"));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api.xro/2.0/Items")
				.header("content-type", "application/json")
				.body(r#"{"Code":"A1"}"#);
			then.status(200).body(r#"{"Items":[{"ItemID":"i-1"}]}"#);
		})
		.await;
	let body: Value = client
		.post("/Items", &json!({ "Code": "A1" }), None)
		.await
		.expect("POST should succeed.");

	assert_eq!(body["Items"][0]["ItemID"], "i-1");

	mock.assert_async().await;
}

#[tokio::test]
async fn empty_delete_returns_empty_result() {
	let server = MockServer::start_async().await;
	let client = client(&server, AccessToken::new("tok", "tok-secret"));
	let mock = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/api.xro/2.0/Items/i-1");
			then.status(204);
		})
		.await;
	let deleted: Option<Value> =
		client.delete("/Items/i-1", None).await.expect("Empty DELETE should succeed.");

	assert!(deleted.is_none());

	mock.assert_async().await;
}

#[tokio::test]
async fn missing_access_token_never_hits_the_network() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(config(server.base_url()));
	let mock = server
		.mock_async(|when, then| {
			when.path("/api.xro/2.0/Items");
			then.status(200).body("{}");
		})
		.await;
	let err = client.get::<Value>("/Items", None).await.expect_err("No token, no call.");

	assert!(matches!(err, Error::MissingAccessToken));

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn unauthorized_call_refreshes_once_and_replays() {
	let server = MockServer::start_async().await;
	let client =
		client(&server, AccessToken::new("AT-1", "secret-1").with_session_handle("SH-1"));
	let stale = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api.xro/2.0/Invoices")
				.header_includes("authorization", r#"oauth_token="AT-1""#);
			then.status(401).body("oauth_problem=token_expired");
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/AccessToken")
				.header_includes("authorization", r#"oauth_session_handle="SH-1""#);
			then.status(200).body("oauth_token=AT-2&oauth_token_secret=secret-2&oauth_expires_in=1800");
		})
		.await;
	let fresh = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api.xro/2.0/Invoices")
				.header_includes("authorization", r#"oauth_token="AT-2""#);
			then.status(200).body(r#"{"Invoices":[]}"#);
		})
		.await;
	let body: Value = client.get("/Invoices", None).await.expect("Replay should succeed.");

	assert_eq!(body["Invoices"], json!([]));

	stale.assert_calls_async(1).await;
	refresh.assert_calls_async(1).await;
	fresh.assert_calls_async(1).await;
}

#[tokio::test]
async fn concurrent_expired_calls_share_one_refresh() {
	let server = MockServer::start_async().await;
	let expired = AccessToken::new("AT-1", "secret-1")
		.with_session_handle("SH-1")
		.with_expires_at(OffsetDateTime::now_utc() - Duration::minutes(1));
	let client = client(&server, expired);
	let other = client.clone();
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/AccessToken");
			then.status(200)
				.delay(std::time::Duration::from_millis(100))
				.body("oauth_token=AT-2&oauth_token_secret=secret-2&oauth_expires_in=1800");
		})
		.await;
	let api = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api.xro/2.0/Invoices")
				.header_includes("authorization", r#"oauth_token="AT-2""#);
			then.status(200).body(r#"{"Invoices":[]}"#);
		})
		.await;
	let (first, second) = tokio::join!(
		client.get::<Value>("/Invoices", None),
		other.get::<Value>("/Invoices", None),
	);

	first.expect("First concurrent call should succeed.");
	second.expect("Second concurrent call should succeed.");

	let stored = client
		.credentials()
		.await
		.expect("Fetch should succeed.")
		.expect("The refreshed token should be stored.");

	assert_eq!(stored.token, "AT-2");

	refresh.assert_calls_async(1).await;
	api.assert_calls_async(2).await;
}

#[tokio::test]
async fn refresh_without_expiry_is_not_repeated() {
	let server = MockServer::start_async().await;
	let expired = AccessToken::new("AT-1", "secret-1")
		.with_session_handle("SH-1")
		.with_expires_at(OffsetDateTime::now_utc() - Duration::minutes(1));
	let client = client(&server, expired);
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/AccessToken");
			then.status(200).body("oauth_token=AT-2&oauth_token_secret=secret-2");
		})
		.await;
	let api = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api.xro/2.0/Items")
				.header_includes("authorization", r#"oauth_token="AT-2""#);
			then.status(200).body(r#"{"Items":[]}"#);
		})
		.await;

	for _ in 0..3 {
		client.get::<Value>("/Items", None).await.expect("Call after refresh should succeed.");
	}

	let stored = client
		.credentials()
		.await
		.expect("Fetch should succeed.")
		.expect("The refreshed token should be stored.");

	assert_eq!(stored.token, "AT-2");
	assert_eq!(stored.expires_at, None);
	assert_eq!(stored.session_handle.as_ref().map(|h| h.expose()), Some("SH-1"));

	refresh.assert_calls_async(1).await;
	api.assert_calls_async(3).await;
}

#[tokio::test]
async fn signature_recomputes_from_captured_request() {
	let client = OAuth1Client::with_transport(config("https://api.example.com"), Capture::default())
		.expect("Client should build.")
		.with_access_token(AccessToken::new("tok", "tok-secret"));
	let _: Value = client
		.get("/Contacts?where=Name%3D%22A%20B%22&page=2", None)
		.await
		.expect("Captured GET should succeed.");

	let requests = client.transport.0.lock();
	let request = &requests[0];
	let authorization = request
		.headers
		.get(AUTHORIZATION)
		.and_then(|v| v.to_str().ok())
		.expect("The call should be signed.");
	let params = oauth_params(authorization);
	let timestamp = params["oauth_timestamp"].parse().expect("Timestamp should be numeric.");
	let recomputed = client
		.signer()
		.sign_with(
			SigningRequest::new(
				&Method::GET,
				&request.url,
				Some(TokenCredentials { token: "tok", secret: "tok-secret" }),
			),
			&params["oauth_nonce"],
			timestamp,
		)
		.expect("Recomputing the signature should succeed.");

	assert_eq!(params["oauth_signature"], recomputed.signature);
	assert_eq!(params["oauth_signature_method"], "HMAC-SHA1");
	assert_eq!(params["oauth_version"], "1.0A");
	assert_eq!(params["oauth_nonce"].len(), 32);
	assert!(recomputed.base_string.ends_with("%26page%3D2%26where%3DName%253D%2522A%2520B%2522"));
}

async fn organisation_name<A>(api: &A) -> Result<String, Error>
where
	A: ApiTransport,
{
	let body: Value = api.get("/Organisation", None).await?;

	Ok(body["Organisations"][0]["Name"].as_str().unwrap_or_default().to_owned())
}

#[tokio::test]
async fn capabilities_drive_generic_wrappers() {
	let client = OAuth1Client::with_transport(config("https://api.example.com"), Capture::default())
		.expect("Client should build.")
		.with_access_token(AccessToken::new("tok", "tok-secret"));
	let name = organisation_name(&client).await.expect("Generic wrapper should succeed.");
	let handshake: &dyn TokenHandshake = &client;
	let url = handshake
		.build_authorise_url(&RequestToken::new("RT-1", "s"))
		.expect("Authorize URL should build.");

	assert_eq!(name, "Demo Company");
	assert_eq!(url, "https://api.example.com/oauth/Authorize?oauth_token=RT-1");
	assert_eq!(
		client.transport.0.lock()[0].url.as_str(),
		"https://api.example.com/api.xro/2.0/Organisation"
	);
}
