use std::net::IpAddr;

use common::context::Context;
use common::global::{GlobalConfig, GlobalConfigProvider, GlobalCtx};
use common::ratelimiter::RateLimiter;

use crate::config::{ApiConfig, AppConfig, JwtConfig};
use crate::store::Store;

pub trait ApiState {
	type Store: Store;

	fn store(&self) -> &Self::Store;
	fn auth_limiter(&self) -> &RateLimiter<IpAddr>;
	fn api_limiter(&self) -> &RateLimiter<IpAddr>;
}

pub trait ApiGlobal:
	GlobalCtx
	+ GlobalConfigProvider<ApiConfig>
	+ GlobalConfigProvider<JwtConfig>
	+ GlobalConfig
	+ ApiState
	+ Send
	+ Sync
	+ 'static
{
}

impl<T> ApiGlobal for T where
	T: GlobalCtx
		+ GlobalConfigProvider<ApiConfig>
		+ GlobalConfigProvider<JwtConfig>
		+ GlobalConfig
		+ ApiState
		+ Send
		+ Sync
		+ 'static
{
}

/// The process wide state, generic over the store so tests can swap it out.
pub struct GlobalState<S> {
	ctx: Context,
	config: AppConfig,
	store: S,
	auth_limiter: RateLimiter<IpAddr>,
	api_limiter: RateLimiter<IpAddr>,
}

impl<S: Store> GlobalState<S> {
	pub fn new(config: AppConfig, ctx: Context, store: S) -> Self {
		Self {
			auth_limiter: RateLimiter::new((&config.rate_limit.auth).into()),
			api_limiter: RateLimiter::new((&config.rate_limit.api).into()),
			ctx,
			config,
			store,
		}
	}
}

impl<S> GlobalCtx for GlobalState<S> {
	#[inline(always)]
	fn ctx(&self) -> &Context {
		&self.ctx
	}
}

impl<S> GlobalConfig for GlobalState<S> {}

impl<S> GlobalConfigProvider<ApiConfig> for GlobalState<S> {
	#[inline(always)]
	fn provide_config(&self) -> &ApiConfig {
		&self.config.api
	}
}

impl<S> GlobalConfigProvider<JwtConfig> for GlobalState<S> {
	#[inline(always)]
	fn provide_config(&self) -> &JwtConfig {
		&self.config.jwt
	}
}

impl<S: Store> ApiState for GlobalState<S> {
	type Store = S;

	#[inline(always)]
	fn store(&self) -> &S {
		&self.store
	}

	#[inline(always)]
	fn auth_limiter(&self) -> &RateLimiter<IpAddr> {
		&self.auth_limiter
	}

	#[inline(always)]
	fn api_limiter(&self) -> &RateLimiter<IpAddr> {
		&self.api_limiter
	}
}
