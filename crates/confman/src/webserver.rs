//! Request logging

use axum::{
	body::Body,
	http::{Request, response::Response},
	middleware::Next,
};
use std::time::Instant;

use crate::prelude::*;
use confman_core::extract::RequestId;

/// Logs every request and its response status with the elapsed milliseconds
pub async fn log_request(req: Request<Body>, next: Next) -> Response<Body> {
	let start = Instant::now();
	let req_id = req.extensions().get::<RequestId>().map(|r| r.0.clone()).unwrap_or_default();
	info!("REQ [{}] {} {}", &req_id, req.method(), req.uri().path());

	let res = next.run(req).await;

	let status = res.status();
	if status.is_client_error() || status.is_server_error() {
		warn!("RES: {} tm:{:?}", &status, start.elapsed().as_millis());
	} else {
		info!("RES: {} tm:{:?}", &status, start.elapsed().as_millis());
	}

	res
}

// vim: ts=4
