//! Development server for the negotiated routes.
//!
//! This module provides a lightweight HTTP server for local development,
//! built on `tiny_http` with the following features:
//!
//! - The published routes answered from a fresh document store on every
//!   request, so content edits show up without a rebuild
//! - Static file serving from the build output directory for everything
//!   else, with automatic `index.html` resolution
//! - Graceful shutdown on Ctrl+C
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   GET /api/posts.json       ┌──────────────────┐
//! │   Request    │── GET /blog/<slug>.json ───►│   Fresh store    │
//! │   loop       │   GET /blog/<slug>.md       │   per request    │
//! └──────┬───────┘                             └──────────────────┘
//!        │ anything else
//!        ▼
//!   config.build.output
//!   (static fallthrough)
//! ```

use crate::{
    config::SiteConfig,
    log,
    negotiate::{BLOG_NAMESPACE, NegotiationError, listing, post},
    store::DocStore,
};
use anyhow::{Context, Result};
use std::{fs, io::Cursor, net::SocketAddr, path::{Component, Path}, sync::Arc};
use tiny_http::{Header, Request, Response, Server, StatusCode};

// ============================================================================
// Constants
// ============================================================================

/// Content type for every JSON representation.
const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Content type for the raw markdown representation.
const MARKDOWN_CONTENT_TYPE: &str = "text/markdown; charset=utf-8";

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

// ============================================================================
// Server Entry Point
// ============================================================================

/// Start the development server.
///
/// This function:
/// 1. Binds to the configured interface and port (with auto-retry on port conflict)
/// 2. Sets up Ctrl+C handler for graceful shutdown
/// 3. Enters the main request handling loop
///
/// The server blocks until Ctrl+C is received.
pub fn serve_site(config: &'static SiteConfig) -> Result<()> {
    let interface: std::net::IpAddr = config.serve.interface.parse()?;
    let base_port = config.serve.port;
    let base_url = config.base_url()?;

    let (server, addr) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    // Set up Ctrl+C handler for graceful shutdown
    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "http://{}", addr);

    // Handle requests in main thread (blocks until Ctrl+C)
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, config, base_url) {
            log!("serve"; "request error: {e}");
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(
    interface: std::net::IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(Server, SocketAddr)> {
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(_) if offset + 1 < max_retries => {
                // Will retry silently
                continue;
            }
            Err(e) => {
                // Last attempt failed
                return Err(anyhow::anyhow!(
                    "Failed to bind after {} attempts (ports {}-{}): {}",
                    max_retries,
                    base_port,
                    port,
                    e
                ));
            }
        }
    }
    unreachable!()
}

// ============================================================================
// Request Handling
// ============================================================================

/// A published route recognized by the content negotiation layer.
#[derive(Debug, PartialEq, Eq)]
enum Route<'a> {
    /// `GET /api/posts.json`
    Listing,
    /// `GET /blog/<slug>.json`
    PostJson(&'a str),
    /// `GET /blog/<slug>.md`
    PostMarkdown(&'a str),
}

/// Handle a single HTTP request.
///
/// Request resolution order:
/// 1. Negotiated route → derive the representation from content
/// 2. Exact file match in output → serve file
/// 3. Directory with index.html → serve index.html
/// 4. Nothing found → 404
fn handle_request(request: Request, config: &'static SiteConfig, base_url: &str) -> Result<()> {
    // Decode URL-encoded characters (e.g., %20 → space)
    let url_path = urlencoding::decode(request.url())
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();

    // Strip query string (e.g., ?t=123456) before resolving path
    let path_without_query = url_path.split('?').next().unwrap_or(&url_path);
    let request_path = path_without_query.trim_matches('/');

    match negotiate_route(request_path) {
        Some(route) => serve_negotiated(request, config, base_url, &route),
        None => serve_static(request, config, request_path),
    }
}

/// Match a request path against the published routes.
fn negotiate_route(path: &str) -> Option<Route<'_>> {
    if path == "api/posts.json" {
        return Some(Route::Listing);
    }

    let rest = path.strip_prefix(BLOG_NAMESPACE)?.strip_prefix('/')?;
    if let Some(slug) = rest.strip_suffix(".json") {
        return Some(Route::PostJson(slug));
    }
    if let Some(slug) = rest.strip_suffix(".md") {
        return Some(Route::PostMarkdown(slug));
    }

    None
}

/// Answer a negotiated route from a fresh document store.
///
/// A missing post is a plain 404. Any other failure is a 500 with the
/// cause logged server-side only.
fn serve_negotiated(
    request: Request,
    config: &'static SiteConfig,
    base_url: &str,
    route: &Route<'_>,
) -> Result<()> {
    match render_route(&config.build.content, base_url, route) {
        Ok((body, content_type)) => {
            let response = Response::from_string(body)
                .with_header(Header::from_bytes("Content-Type", content_type).unwrap());
            request.respond(response)?;
            Ok(())
        }
        Err(err) if err.is_not_found() => serve_not_found(request),
        Err(err) => {
            log!("error"; "{} ({}): {:#}", request.url(), err.status(), anyhow::Error::from(err));
            serve_internal_error(request)
        }
    }
}

/// Derive the representation for one route from the content directory.
fn render_route(
    content: &Path,
    base_url: &str,
    route: &Route<'_>,
) -> Result<(String, &'static str), NegotiationError> {
    let store = DocStore::open(content)?;

    match route {
        Route::Listing => {
            let posts = listing::list_posts(&store, base_url);
            Ok((listing::to_json(&posts)?, JSON_CONTENT_TYPE))
        }
        Route::PostJson(slug) => {
            let data = post::assemble(&store, base_url, slug)?;
            Ok((post::to_json(&data)?, JSON_CONTENT_TYPE))
        }
        Route::PostMarkdown(slug) => Ok((post::raw_post(&store, slug)?, MARKDOWN_CONTENT_TYPE)),
    }
}

/// Serve a request from the static output directory.
fn serve_static(request: Request, config: &'static SiteConfig, request_path: &str) -> Result<()> {
    if escapes_output_dir(request_path) {
        return serve_not_found(request);
    }

    let local_path = config.build.output.join(request_path);

    // Try to serve the file directly
    if local_path.is_file() {
        return serve_file(request, &local_path);
    }

    // If it's a directory, try index.html
    if local_path.is_dir() {
        let index_path = local_path.join("index.html");
        if index_path.is_file() {
            return serve_file(request, &index_path);
        }
    }

    serve_not_found(request)
}

/// Whether a request path would resolve outside the output directory.
///
/// The decoded path is joined onto the output dir as-is, so any `..`
/// component could climb out of it.
fn escapes_output_dir(request_path: &str) -> bool {
    Path::new(request_path)
        .components()
        .any(|component| matches!(component, Component::ParentDir))
}

// ============================================================================
// Response Helpers
// ============================================================================

/// Serve a file with appropriate content type.
fn serve_file(request: Request, path: &Path) -> Result<()> {
    let content = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let content_type = guess_content_type(path);

    let response = Response::from_data(content)
        .with_header(Header::from_bytes("Content-Type", content_type).unwrap());

    request.respond(response)?;
    Ok(())
}

/// Serve 404 Not Found response.
fn serve_not_found(request: Request) -> Result<()> {
    let response = Response::new(
        StatusCode(404),
        vec![Header::from_bytes("Content-Type", "text/plain").unwrap()],
        Cursor::new("Not Found"),
        Some(9),
        None,
    );
    request.respond(response)?;
    Ok(())
}

/// Serve 500 Internal Server Error response.
fn serve_internal_error(request: Request) -> Result<()> {
    let response = Response::new(
        StatusCode(500),
        vec![Header::from_bytes("Content-Type", "text/plain").unwrap()],
        Cursor::new("Internal Server Error"),
        Some(21),
        None,
    );
    request.respond(response)?;
    Ok(())
}

// ============================================================================
// Content Type Detection
// ============================================================================

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        // Web content
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => JSON_CONTENT_TYPE,
        Some("xml") => "application/xml; charset=utf-8",

        // Images
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",

        // Documents
        Some("txt") => "text/plain; charset=utf-8",
        Some("md") => MARKDOWN_CONTENT_TYPE,

        // Default binary
        _ => "application/octet-stream",
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const BASE_URL: &str = "http://127.0.0.1:4321";

    fn content_dir(posts: &[(&str, &str)]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        let blog = tmp.path().join("blog");
        fs::create_dir_all(&blog).unwrap();
        for (name, contents) in posts {
            fs::write(blog.join(name), contents).unwrap();
        }
        tmp
    }

    // ------------------------------------------------------------------------
    // Route matching
    // ------------------------------------------------------------------------

    #[test]
    fn test_negotiate_route_listing() {
        assert_eq!(negotiate_route("api/posts.json"), Some(Route::Listing));
    }

    #[test]
    fn test_negotiate_route_post_json() {
        assert_eq!(
            negotiate_route("blog/first-post.json"),
            Some(Route::PostJson("first-post"))
        );
    }

    #[test]
    fn test_negotiate_route_post_markdown() {
        assert_eq!(
            negotiate_route("blog/first-post.md"),
            Some(Route::PostMarkdown("first-post"))
        );
    }

    #[test]
    fn test_negotiate_route_nested_slug() {
        assert_eq!(
            negotiate_route("blog/2024/retro.json"),
            Some(Route::PostJson("2024/retro"))
        );
    }

    #[test]
    fn test_negotiate_route_rejects_other_paths() {
        assert_eq!(negotiate_route(""), None);
        assert_eq!(negotiate_route("api/posts.md"), None);
        assert_eq!(negotiate_route("blog"), None);
        assert_eq!(negotiate_route("blog/post.html"), None);
        assert_eq!(negotiate_route("bloggers/post.json"), None);
        assert_eq!(negotiate_route("index.html"), None);
    }

    #[test]
    fn test_static_paths_cannot_escape_output_dir() {
        assert!(escapes_output_dir("../signpost.toml"));
        assert!(escapes_output_dir("assets/../../secret.key"));
        assert!(!escapes_output_dir("assets/app.css"));
        assert!(!escapes_output_dir("blog/index.html"));
        assert!(!escapes_output_dir(""));
        // dotted names are not traversal
        assert!(!escapes_output_dir(".well-known/keys.txt"));
        assert!(!escapes_output_dir("..config"));
    }

    // ------------------------------------------------------------------------
    // Route rendering
    // ------------------------------------------------------------------------

    #[test]
    fn test_render_route_listing() {
        let tmp = content_dir(&[("alpha.md", "---\ntitle: Alpha\n---\n\nBody")]);

        let (body, content_type) = render_route(tmp.path(), BASE_URL, &Route::Listing).unwrap();

        assert_eq!(content_type, "application/json; charset=utf-8");
        assert!(body.contains("\"slug\": \"alpha\""));
        assert!(body.contains("\"url\": \"http://127.0.0.1:4321/blog/alpha/\""));
    }

    #[test]
    fn test_render_route_post_json() {
        let tmp = content_dir(&[("alpha.md", "---\ntitle: Alpha\n---\n\nBody")]);

        let (body, content_type) =
            render_route(tmp.path(), BASE_URL, &Route::PostJson("alpha")).unwrap();

        assert_eq!(content_type, "application/json; charset=utf-8");
        assert!(body.contains("\"title\": \"Alpha\""));
        assert!(body.contains("\"markdown\""));
    }

    #[test]
    fn test_render_route_markdown_byte_exact() {
        let raw = "---\ntitle: Alpha\n---\n\nBody with trailing newline\n";
        let tmp = content_dir(&[("alpha.md", raw)]);

        let (body, content_type) =
            render_route(tmp.path(), BASE_URL, &Route::PostMarkdown("alpha")).unwrap();

        assert_eq!(content_type, "text/markdown; charset=utf-8");
        assert_eq!(body, raw);
    }

    #[test]
    fn test_render_route_missing_post_is_not_found() {
        let tmp = content_dir(&[]);

        let err = render_route(tmp.path(), BASE_URL, &Route::PostJson("ghost")).unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.status(), 404);
    }

    #[test]
    fn test_render_route_broken_signature_is_internal() {
        // Signature block present but missing the stx half.
        let raw = "---\ntitle: Signed\nsignatures:\n  btc:\n    signer: \"1A1zP1\"\n    signature: \"H9L5yLFjti+fNXJ\"\n    signatureHex: \"1f2d\"\n    messageHash: \"9c12\"\n    format: \"legacy\"\n---\n\nBody";
        let tmp = content_dir(&[("signed.md", raw)]);

        let err = render_route(tmp.path(), BASE_URL, &Route::PostJson("signed")).unwrap_err();

        assert!(!err.is_not_found());
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn test_render_route_sees_fresh_content() {
        let tmp = content_dir(&[("alpha.md", "---\ntitle: Old\n---\n\nOld body")]);

        let (first, _) = render_route(tmp.path(), BASE_URL, &Route::PostJson("alpha")).unwrap();
        assert!(first.contains("\"title\": \"Old\""));

        fs::write(
            tmp.path().join("blog/alpha.md"),
            "---\ntitle: New\n---\n\nNew body",
        )
        .unwrap();

        let (second, _) = render_route(tmp.path(), BASE_URL, &Route::PostJson("alpha")).unwrap();
        assert!(second.contains("\"title\": \"New\""));
    }

    // ------------------------------------------------------------------------
    // Content type detection
    // ------------------------------------------------------------------------

    #[test]
    fn test_guess_content_type() {
        assert_eq!(
            guess_content_type(Path::new("post.json")),
            "application/json; charset=utf-8"
        );
        assert_eq!(
            guess_content_type(Path::new("post.md")),
            "text/markdown; charset=utf-8"
        );
        assert_eq!(
            guess_content_type(Path::new("index.html")),
            "text/html; charset=utf-8"
        );
        assert_eq!(
            guess_content_type(Path::new("blob.bin")),
            "application/octet-stream"
        );
    }
}
