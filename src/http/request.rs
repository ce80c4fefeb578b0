//! Request guards for the metrics listener.
//!
//! Header size limits are enforced before the handler runs.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};

/// Total size of all header names and values, in bytes.
pub fn header_bytes<B>(request: &Request<B>) -> usize {
    request
        .headers()
        .iter()
        .map(|(name, value)| name.as_str().len() + value.len())
        .sum()
}

/// Reject requests whose headers exceed `max_header_bytes`.
pub async fn limit_header_size(
    State(max_header_bytes): State<usize>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let size = header_bytes(&request);
    if size > max_header_bytes {
        tracing::warn!(size, limit = max_header_bytes, "Rejecting oversized request headers");
        return Err(StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_bytes() {
        let request = Request::builder()
            .header("accept", "text/plain")
            .header("x-a", "1")
            .body(())
            .unwrap();

        assert_eq!(header_bytes(&request), "accept".len() + "text/plain".len() + 4);
    }
}
