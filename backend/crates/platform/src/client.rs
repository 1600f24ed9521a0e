//! Client identification utilities
//!
//! Used for request logging: the JWT middleware and the panic-recovery layer
//! both record where a request came from.

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use std::net::{IpAddr, SocketAddr};

/// Extract client IP address from headers
///
/// Checks X-Forwarded-For header first (for reverse proxy setups),
/// then falls back to direct connection IP.
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|xff| xff.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok())
        .or(direct_ip)
}

/// Client IP for a request, using the `ConnectInfo` extension when the server
/// was started with `into_make_service_with_connect_info`.
pub fn request_client_ip<B>(req: &Request<B>) -> Option<IpAddr> {
    let direct = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());
    extract_client_ip(req.headers(), direct)
}
