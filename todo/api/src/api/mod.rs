use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use common::http::{error_body, RouteError};
use common::make_response;
use hyper::server::conn::Http;
use hyper::service::{service_fn, Service};
use hyper::{Body, Request, Response, StatusCode};
use routerify::{RequestServiceBuilder, Router};
use tokio::net::TcpSocket;
use tokio::select;

use self::error::ApiError;
use crate::config::ApiConfig;
use crate::global::ApiGlobal;

pub mod account;
pub mod auth;
pub mod error;
pub mod ext;
pub mod health;
pub mod jwt;
pub mod middleware;
pub mod request_context;
pub mod response;
pub mod teams;
pub mod todos;

async fn preflight(_: Request<Body>) -> error::Result<Response<Body>> {
	Ok(Response::builder()
		.status(StatusCode::NO_CONTENT)
		.body(Body::empty())
		.expect("failed to build response"))
}

async fn not_found(_: Request<Body>) -> error::Result<Response<Body>> {
	Ok(make_response!(StatusCode::NOT_FOUND, error_body("not found")))
}

pub fn routes<G: ApiGlobal>(global: &Arc<G>) -> Router<Body, RouteError<ApiError>> {
	let weak = Arc::downgrade(global);
	Router::builder()
		.data(weak)
		.err_handler_with_info(common::http::error_handler::<ApiError>)
		.middleware(middleware::logging::request_log_middleware(global))
		// Counted before the token is checked so bad credentials still use up
		// the quota.
		.middleware(middleware::ratelimit::ratelimit_middleware(global))
		.middleware(middleware::auth::auth_middleware(global))
		.middleware(middleware::ratelimit::ratelimit_headers_middleware(global))
		.middleware(middleware::cors::cors_middleware(global))
		.options("/*", preflight)
		.get("/health", health::health)
		.post("/api/auth/register", account::register::<G>)
		.post("/api/auth/login", account::login::<G>)
		.get("/api/auth/profile", account::profile::<G>)
		.get("/api/auth/verify", account::verify)
		.get("/api/teams", teams::list::<G>)
		.post("/api/teams", teams::create::<G>)
		.put("/api/teams/:id", teams::update::<G>)
		.delete("/api/teams/:id", teams::delete::<G>)
		.get("/api/teams/:id/members", teams::members::<G>)
		.post("/api/teams/:id/members", teams::add_member::<G>)
		.delete("/api/teams/:id/members/:userId", teams::remove_member::<G>)
		.get("/api/todos", todos::list::<G>)
		.post("/api/todos", todos::create::<G>)
		.put("/api/todos/:id", todos::update::<G>)
		.delete("/api/todos/:id", todos::delete::<G>)
		.any(not_found)
		.build()
		.expect("failed to build router")
}

pub async fn run<G: ApiGlobal>(global: Arc<G>) -> anyhow::Result<()> {
	let config = global.config::<ApiConfig>();

	tracing::info!("API listening on {}", config.bind_address);
	let socket = if config.bind_address.is_ipv6() {
		TcpSocket::new_v6()?
	} else {
		TcpSocket::new_v4()?
	};

	socket.set_reuseaddr(true)?;
	socket.bind(config.bind_address)?;
	let listener = socket.listen(1024)?;

	let request_timeout = config.request_timeout();

	// The router only keeps a Weak reference to the global state, so open
	// keep-alive connections do not hold up shutdown.
	let request_service =
		Arc::new(RequestServiceBuilder::new(routes(&global)).expect("failed to build request service"));

	loop {
		select! {
			_ = global.ctx().done() => {
				return Ok(());
			},
			r = listener.accept() => {
				let (socket, addr) = r?;

				tracing::debug!("Accepted connection from {}", addr);

				let request_service = request_service.clone();
				let service = service_fn(move |req| {
					let mut service = request_service.build(addr);

					async move {
						match tokio::time::timeout(request_timeout, service.call(req)).await {
							Ok(resp) => resp,
							Err(_) => {
								tracing::warn!(%addr, "request timed out");
								Ok(make_response!(StatusCode::SERVICE_UNAVAILABLE, error_body("request timed out")))
							}
						}
					}
				});

				let conn: Pin<Box<dyn Future<Output = hyper::Result<()>> + Send>> =
					Box::pin(Http::new().serve_connection(socket, service));
				tokio::spawn(async move {
					conn.await.ok();
				});
			},
		}
	}
}
