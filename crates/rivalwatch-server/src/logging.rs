use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use rand::Rng;
use std::fmt::Write;
use std::time::Instant;

/// Per-request trace id, stored in request extensions.
#[derive(Clone, Debug)]
pub struct TraceId(pub String);

impl std::ops::Deref for TraceId {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

/// 16 hex characters from 8 random bytes.
fn generate_trace_id() -> String {
    let bytes: [u8; 8] = rand::thread_rng().gen();
    let mut s = String::with_capacity(16);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

const MAX_BODY_LOG_CHARS: usize = 200;

/// Paths whose bodies carry personal data (emails, names).
fn is_sensitive(path: &str) -> bool {
    path.starts_with("/login") || path.starts_with("/signup")
}

/// Truncates at a char boundary at or below `max` bytes.
fn truncate_body(bytes: &[u8], max: usize) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) if s.len() > max => {
            let mut end = max;
            while end > 0 && !s.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", &s[..end])
        }
        Ok(s) => s.to_string(),
        Err(_) => "<non-utf8 body>".to_string(),
    }
}

fn format_elapsed(elapsed_us: u128) -> String {
    if elapsed_us < 1000 {
        format!("{elapsed_us}µs")
    } else if elapsed_us < 1_000_000 {
        format!("{}ms", elapsed_us / 1000)
    } else {
        format!("{:.1}s", elapsed_us as f64 / 1_000_000.0)
    }
}

/// Logs every request/response pair and tags the response with `X-Trace-Id`.
///
/// Request bodies are only logged for non-sensitive POSTs; response bodies
/// only for JSON responses. HTML pages are never logged.
pub async fn request_logging(mut req: Request, next: Next) -> Response {
    let trace_id = generate_trace_id();
    req.extensions_mut().insert(TraceId(trace_id.clone()));

    let method = req.method().clone();
    let uri = req.uri().clone();
    let path = uri.path().to_string();
    let url = match uri.query() {
        Some(q) if !q.is_empty() => format!("{path}?{q}"),
        _ => path.clone(),
    };
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let sensitive = is_sensitive(&path);
    let (req, req_body_snippet) = if !sensitive && method == "POST" {
        let (parts, body) = req.into_parts();
        let body_bytes = axum::body::to_bytes(body, 1024 * 1024)
            .await
            .unwrap_or_default();
        let snippet = truncate_body(&body_bytes, MAX_BODY_LOG_CHARS);
        (Request::from_parts(parts, Body::from(body_bytes)), snippet)
    } else {
        (req, String::new())
    };

    if req_body_snippet.is_empty() {
        tracing::info!(
            trace_id = %trace_id,
            method = %method,
            path = %url,
            ua = %user_agent,
            "--> request"
        );
    } else {
        tracing::info!(
            trace_id = %trace_id,
            method = %method,
            path = %url,
            body = %req_body_snippet,
            ua = %user_agent,
            "--> request"
        );
    }

    let start = Instant::now();
    let response = next.run(req).await;
    let elapsed = format_elapsed(start.elapsed().as_micros());
    let status = response.status();

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));

    let mut response = if is_json && !sensitive {
        let (parts, body) = response.into_parts();
        let body_bytes = axum::body::to_bytes(body, usize::MAX)
            .await
            .unwrap_or_default();
        let snippet = truncate_body(&body_bytes, MAX_BODY_LOG_CHARS);
        log_response(&trace_id, status, &elapsed, &snippet);
        Response::from_parts(parts, Body::from(body_bytes))
    } else {
        log_response(&trace_id, status, &elapsed, "");
        response
    };

    if let Ok(val) = HeaderValue::from_str(&trace_id) {
        response.headers_mut().insert("X-Trace-Id", val);
    }
    response
}

fn log_response(trace_id: &str, status: axum::http::StatusCode, elapsed: &str, body: &str) {
    let status_code = status.as_u16();
    if status.is_server_error() {
        tracing::error!(trace_id = %trace_id, status = status_code, elapsed = %elapsed, body = %body, "<-- response");
    } else if status.is_client_error() {
        tracing::warn!(trace_id = %trace_id, status = status_code, elapsed = %elapsed, body = %body, "<-- response");
    } else if body.is_empty() {
        tracing::info!(trace_id = %trace_id, status = status_code, elapsed = %elapsed, "<-- response");
    } else {
        tracing::info!(trace_id = %trace_id, status = status_code, elapsed = %elapsed, body = %body, "<-- response");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_ids_are_sixteen_hex_chars() {
        let id = generate_trace_id();
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_body("héllo".as_bytes(), 2), "h...");
        assert_eq!(truncate_body(b"short", 10), "short");
        assert_eq!(truncate_body(&[0xff, 0xfe], 10), "<non-utf8 body>");
    }

    #[test]
    fn auth_forms_are_sensitive() {
        assert!(is_sensitive("/login"));
        assert!(is_sensitive("/signup"));
        assert!(!is_sensitive("/signals/refresh"));
    }
}
