//! HTTP API of the relay.
//!
//! | Method | Path | |
//! |---|---|---|
//! | POST | `/api/v2/relay` | relay a meta-signed transaction |
//! | GET | `/api/v2/networks` | list supported networks |
//! | GET | `/api/v2/networks/{name}/nonce/{address}` | current meta nonce of an account |
//! | GET | `/health` | liveness |

use alloy::primitives::Address;
use axum::{
	body::Bytes,
	extract::{Path, State},
	http::StatusCode,
	response::Json,
	routing::{get, post},
	Router,
};
use relay_core::{RelayError, RelayRequestHandler};
use relay_types::{RelayOutcome, RelayRequest, RelayResponseBody, RequestShapeError};
use std::{future::Future, str::FromStr, sync::Arc, time::Duration};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<RelayResponseBody>)>;

/// Builds the API router around `handler`.
pub fn router(handler: Arc<RelayRequestHandler>, request_timeout: Duration) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/api/v2/relay", post(relay))
		.route("/api/v2/networks", get(list_networks))
		.route("/api/v2/networks/{name}/nonce/{address}", get(get_nonce))
		.with_state(handler)
		.layer(TraceLayer::new_for_http())
		.layer(TimeoutLayer::new(request_timeout))
		.layer(CorsLayer::permissive())
}

/// Binds `host:port` and serves `app` until `shutdown` completes.
pub async fn serve<F>(app: Router, host: &str, port: u16, shutdown: F) -> anyhow::Result<()>
where
	F: Future<Output = ()> + Send + 'static,
{
	let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
	info!("Relay API listening on {}:{}", host, port);

	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown)
		.await?;

	Ok(())
}

fn reply(outcome: RelayOutcome) -> (StatusCode, Json<RelayResponseBody>) {
	let status =
		StatusCode::from_u16(outcome.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
	(status, Json(outcome.body))
}

async fn health() -> Json<serde_json::Value> {
	Json(serde_json::json!({ "status": "ok" }))
}

/// The body is taken raw so that a missing, `null` or non-object body is
/// answered by the handler rather than by the JSON extractor.
async fn relay(
	State(handler): State<Arc<RelayRequestHandler>>,
	body: Bytes,
) -> (StatusCode, Json<RelayResponseBody>) {
	let request = RelayRequest::from_body(&body);
	reply(handler.handle(request).await)
}

async fn list_networks(
	State(handler): State<Arc<RelayRequestHandler>>,
) -> Json<serde_json::Value> {
	Json(serde_json::json!({ "networks": handler.registry().summaries() }))
}

async fn get_nonce(
	State(handler): State<Arc<RelayRequestHandler>>,
	Path((name, address)): Path<(String, String)>,
) -> ApiResult<serde_json::Value> {
	let network = handler
		.registry()
		.resolve(&name)
		.ok_or_else(|| reply(RelayError::from(RequestShapeError::UnknownBlockchain(name.clone())).into_outcome()))?;
	let account = Address::from_str(&address)
		.map_err(|_| reply(RelayOutcome::error(400, format!("Invalid address '{}'", address))))?;

	let client = handler
		.clients()
		.client_for(&network)
		.await
		.map_err(|e| reply(RelayError::from(e).into_outcome()))?;
	let nonce = client
		.get_nonce(account)
		.await
		.map_err(|e| reply(RelayError::from(e).into_outcome()))?;

	Ok(Json(serde_json::json!({
		"network": name,
		"address": account.to_string(),
		"nonce": nonce.to_string(),
	})))
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy::{
		primitives::{address, U256},
		signers::local::PrivateKeySigner,
	};
	use axum::{body::Body, http::Request};
	use relay_chains::{
		testing::MockRelayClient, NetworkRegistry, RelayClientFactory, RelayContractClient,
	};
	use relay_core::HandlerSettings;
	use relay_envelope::testing::EnvelopeBuilder;
	use relay_types::{NetworkConfig, SubmissionError};
	use tower::ServiceExt;

	const RELAY: Address = address!("0x326c977e6efc84e512bb9c30f76e30c160ed06fb");

	fn app() -> (Router, Arc<MockRelayClient>) {
		let mut registry = NetworkRegistry::new();
		registry
			.register(
				"test",
				NetworkConfig::new("1337", "http://localhost:8545", RELAY.to_string()),
			)
			.unwrap();

		let mock = Arc::new(MockRelayClient::new());
		let client = mock.clone();
		let factory =
			RelayClientFactory::new(move |_| Ok(client.clone() as Arc<dyn RelayContractClient>));
		let handler = RelayRequestHandler::new(
			Arc::new(registry),
			Arc::new(factory),
			HandlerSettings::default(),
		);

		(router(Arc::new(handler), Duration::from_secs(5)), mock)
	}

	async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
		let response = app.oneshot(request).await.unwrap();
		let status = response.status();
		let body = axum::body::to_bytes(response.into_body(), usize::MAX)
			.await
			.unwrap();
		let json = if body.is_empty() {
			serde_json::Value::Null
		} else {
			serde_json::from_slice(&body).unwrap()
		};
		(status, json)
	}

	fn post_relay(body: impl Into<Body>) -> Request<Body> {
		Request::builder()
			.method("POST")
			.uri("/api/v2/relay")
			.header("content-type", "application/json")
			.body(body.into())
			.unwrap()
	}

	fn get(uri: &str) -> Request<Body> {
		Request::builder().uri(uri).body(Body::empty()).unwrap()
	}

	#[tokio::test]
	async fn test_health() {
		let (app, _) = app();
		let (status, body) = send(app, get("/health")).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["status"], "ok");
	}

	#[tokio::test]
	async fn test_relay_without_body() {
		let (app, _) = app();
		for body in ["", "null"] {
			let (status, json) = send(app.clone(), post_relay(body)).await;
			assert_eq!(status, StatusCode::BAD_REQUEST);
			assert_eq!(json["status"], "error");
			assert!(json["message"].as_str().unwrap().contains("no body"));
		}
	}

	#[tokio::test]
	async fn test_relay_missing_fields() {
		let (app, _) = app();

		let (status, json) = send(app.clone(), post_relay("{}")).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert!(json["message"].as_str().unwrap().contains("metaSignedTx"));

		let (status, json) = send(app, post_relay(r#"{"metaSignedTx":"0x123"}"#)).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert!(json["message"].as_str().unwrap().contains("blockchain"));
	}

	#[tokio::test]
	async fn test_relay_invalid_signature() {
		let (app, mock) = app();
		let body = serde_json::json!({ "metaSignedTx": "0x123", "blockchain": "test" });

		let (status, json) = send(app, post_relay(body.to_string())).await;
		assert_eq!(status, StatusCode::FORBIDDEN);
		assert!(json["message"]
			.as_str()
			.unwrap()
			.contains("Meta signature invalid"));
		assert!(mock.submissions().is_empty());
	}

	#[tokio::test]
	async fn test_relay_success() {
		let (app, mock) = app();
		let envelope = EnvelopeBuilder::new(PrivateKeySigner::random(), RELAY)
			.register_call(address!("0x1111111111111111111111111111111111111111"), U256::from(7));
		let body = serde_json::json!({
			"metaSignedTx": envelope.build_hex(),
			"blockchain": "test",
		});

		let (status, json) = send(app, post_relay(body.to_string())).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(json["status"], "success");
		assert!(json["txHash"].as_str().unwrap().starts_with("0x"));
		assert!(json.get("message").is_none());
		assert_eq!(mock.submissions().len(), 1);
	}

	#[tokio::test]
	async fn test_relay_chain_failure() {
		let (app, mock) = app();
		mock.fail_submissions(SubmissionError::Transport("connection refused".into()));
		let envelope = EnvelopeBuilder::new(PrivateKeySigner::random(), RELAY)
			.register_call(address!("0x1111111111111111111111111111111111111111"), U256::from(7));
		let body = serde_json::json!({
			"metaSignedTx": envelope.build_hex(),
			"blockchain": "test",
		});

		let (status, json) = send(app, post_relay(body.to_string())).await;
		assert_eq!(status, StatusCode::BAD_GATEWAY);
		assert!(json["message"].as_str().unwrap().contains("connection refused"));
	}

	#[tokio::test]
	async fn test_list_networks() {
		let (app, _) = app();
		let (status, json) = send(app, get("/api/v2/networks")).await;

		assert_eq!(status, StatusCode::OK);
		assert_eq!(json["networks"][0]["name"], "test");
		assert_eq!(json["networks"][0]["id"], "1337");
	}

	#[tokio::test]
	async fn test_get_nonce() {
		let (app, mock) = app();
		let account = address!("0x2222222222222222222222222222222222222222");
		mock.set_nonce(account, U256::from(3));

		let (status, json) =
			send(app.clone(), get(&format!("/api/v2/networks/test/nonce/{account}"))).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(json["nonce"], "3");

		let (status, _) = send(app.clone(), get(&format!("/api/v2/networks/other/nonce/{account}"))).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);

		let (status, json) = send(app.clone(), get("/api/v2/networks/test/nonce/0x1234")).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert!(json["message"].as_str().unwrap().contains("Invalid address"));

		mock.fail_nonce_reads(SubmissionError::Transport("connection refused".into()));
		let (status, _) = send(app, get(&format!("/api/v2/networks/test/nonce/{account}"))).await;
		assert_eq!(status, StatusCode::BAD_GATEWAY);
	}
}
