//! Custom middlewares

use axum::{
	body::Body,
	extract::State,
	http::{HeaderValue, Request, header, response::Response},
	middleware::Next,
};

use crate::extract::{Auth, RequestId};
use crate::prelude::*;
use confman_types::auth_adapter::AuthCtx;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
const MAX_REQUEST_ID_LEN: usize = 64;

fn bearer_token(req: &Request<Body>) -> Option<&str> {
	let auth_header = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
	let token = auth_header.strip_prefix("Bearer ")?.trim();
	if token.is_empty() { None } else { Some(token) }
}

/// Resolves the bearer token to an active user and stores it as `Auth` in the request
pub async fn require_auth(
	State(app): State<App>,
	mut req: Request<Body>,
	next: Next,
) -> CmResult<Response<Body>> {
	let token = bearer_token(&req).ok_or(Error::Unauthorized)?;
	let user_id = app.auth_adapter.verify_access_token(token).await?;

	match app.auth_adapter.read_user(&user_id).await? {
		Some(user) if user.is_active => {}
		_ => {
			debug!(user_id = %user_id, "Token of missing or inactive user");
			return Err(Error::Unauthorized);
		}
	}

	req.extensions_mut().insert(Auth(AuthCtx { user_id }));

	Ok(next.run(req).await)
}

/// Propagates the caller's `X-Request-Id` or assigns a new one
pub async fn request_id(mut req: Request<Body>, next: Next) -> Response<Body> {
	let req_id = req
		.headers()
		.get(REQUEST_ID_HEADER)
		.and_then(|h| h.to_str().ok())
		.filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN)
		.map_or_else(|| uuid::Uuid::new_v4().simple().to_string(), String::from);

	req.extensions_mut().insert(RequestId(req_id.clone()));
	let mut res = next.run(req).await;
	if let Ok(value) = HeaderValue::from_str(&req_id) {
		res.headers_mut().insert(REQUEST_ID_HEADER, value);
	}
	res
}

// vim: ts=4
