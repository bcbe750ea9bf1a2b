use std::sync::Arc;
use std::time::Duration;

use common::context::Handler;
use serde_json::Value;
use tokio::task::JoinHandle;

use super::global::{mock_global_state, MockGlobal};
use crate::api::jwt::{AuthJwtPayload, JwtState};
use crate::config::AppConfig;
use crate::global::ApiState;
use crate::store::Store;

mod account;
mod jwt;

/// A running API over a [`super::store::MemoryStore`].
struct TestServer {
	global: Arc<MockGlobal>,
	handler: Handler,
	handle: JoinHandle<anyhow::Result<()>>,
	client: reqwest::Client,
	base: String,
}

impl TestServer {
	async fn start(config: AppConfig) -> Self {
		let base = format!("http://{}", config.api.bind_address);
		let (global, handler) = mock_global_state(config);

		let handle = tokio::spawn(crate::api::run(global.clone()));

		// We need to wait for the server to start
		tokio::time::sleep(Duration::from_millis(300)).await;

		Self {
			global,
			handler,
			handle,
			client: reqwest::Client::new(),
			base,
		}
	}

	fn url(&self, path: &str) -> String {
		format!("{}{}", self.base, path)
	}

	/// Inserts a user straight into the store and signs a token for them.
	async fn user(&self, username: &str) -> (i64, String) {
		let id = self.global.store().insert_user(username);
		let user = self
			.global
			.store()
			.user_by_id(id)
			.await
			.expect("failed to load user")
			.expect("user missing");

		let token = AuthJwtPayload::new(&self.global, &user)
			.serialize(&self.global)
			.expect("failed to sign token");

		(id, token)
	}

	async fn send(&self, method: reqwest::Method, path: &str, token: Option<&str>, body: Option<Value>) -> (u16, Value) {
		let mut req = self.client.request(method, self.url(path));

		if let Some(token) = token {
			req = req.bearer_auth(token);
		}

		if let Some(body) = body {
			req = req.json(&body);
		}

		let resp = req.send().await.expect("failed to send request");
		let status = resp.status().as_u16();
		let body = resp.json().await.expect("failed to read body");

		(status, body)
	}

	async fn get(&self, path: &str, token: &str) -> (u16, Value) {
		self.send(reqwest::Method::GET, path, Some(token), None).await
	}

	async fn post(&self, path: &str, token: &str, body: Value) -> (u16, Value) {
		self.send(reqwest::Method::POST, path, Some(token), Some(body)).await
	}

	async fn put(&self, path: &str, token: &str, body: Value) -> (u16, Value) {
		self.send(reqwest::Method::PUT, path, Some(token), Some(body)).await
	}

	async fn delete(&self, path: &str, token: &str) -> (u16, Value) {
		self.send(reqwest::Method::DELETE, path, Some(token), None).await
	}

	async fn shutdown(self) {
		// The client uses Keep-Alive, so we need to drop it to release the global context
		drop(self.global);
		drop(self.client);

		tokio::time::timeout(Duration::from_secs(1), self.handler.cancel())
			.await
			.expect("failed to cancel context");

		tokio::time::timeout(Duration::from_secs(1), self.handle)
			.await
			.expect("failed to cancel api")
			.expect("api failed")
			.expect("api failed");
	}
}
