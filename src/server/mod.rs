//! Preview server with live reload
//!
//! Serves the generated tree and adds the dynamic parts of the blog: preview
//! mode (pages rendered live against a preview ref held in a cookie),
//! on-demand builds of posts missing from the last generation and the
//! "load more" endpoint used by the listing page.

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        Path, Query, State, WebSocketUpgrade,
    },
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::PostSummary;
use crate::generator::Generator;
use crate::helpers;
use crate::loader::{self, ContentRef, FallbackPolicy};
use crate::prismic::{ContentClient, ContentError};
use crate::Site;

/// Cookie holding the preview ref
pub const PREVIEW_COOKIE: &str = "io.prismic.preview";

lazy_static! {
    static ref SLUG_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
}

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
</body>
"#;

/// Server state
pub struct ServerState {
    site: Site,
    client: ContentClient,
    generator: Generator,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
    /// Serializes on-demand post builds
    build_lock: Mutex<()>,
}

impl ServerState {
    pub fn new(site: &Site, live_reload: bool) -> Result<Self> {
        let (reload_tx, _) = broadcast::channel::<()>(16);

        Ok(Self {
            site: site.clone(),
            client: site.client()?,
            generator: Generator::new(site)?,
            reload_tx,
            live_reload,
            build_lock: Mutex::new(()),
        })
    }

    fn public_dir(&self) -> &PathBuf {
        &self.site.public_dir
    }
}

/// Build the application router; site routes live under `config.root`
pub fn router(state: Arc<ServerState>) -> Router {
    let root = helpers::url_for(&state.site.config, "/");
    let at = |path: &str| format!("{}{}", root, path);

    Router::new()
        .route(&root, get(home_handler))
        .route(&at("post/:slug"), get(post_handler))
        .route(&at("api/posts"), get(load_more_handler))
        .route(&at("api/preview"), get(preview_handler))
        .route(&at("api/exit-preview"), get(exit_preview_handler))
        .route("/__livereload", get(livereload_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
///
/// `built_ref` is the master ref the tree in `public/` was generated from.
pub async fn start(
    site: &Site,
    ip: &str,
    port: u16,
    watch: bool,
    open: bool,
    built_ref: Option<String>,
) -> Result<()> {
    let state = Arc::new(ServerState::new(site, watch)?);
    let reload_tx = state.reload_tx.clone();
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    if watch {
        println!("Live reload enabled. Polling for content changes...");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let site = site.clone();
        tokio::spawn(async move {
            let result = crate::commands::generate::watch_content(&site, built_ref, move || {
                println!("Regenerated, reloading browsers");
                let _ = reload_tx.send(());
            })
            .await;
            if let Err(e) = result {
                tracing::error!("Content watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn preview_ref(jar: &CookieJar) -> Option<String> {
    jar.get(PREVIEW_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

/// Listing page; rendered live in preview mode, served from disk otherwise
async fn home_handler(
    State(state): State<Arc<ServerState>>,
    jar: CookieJar,
    request: Request<Body>,
) -> Response {
    let Some(reference) = preview_ref(&jar) else {
        return fallback_handler(State(state), request).await;
    };

    let content = ContentRef::Preview(reference);
    match loader::load_home(&state.client, &state.site.config, &content).await {
        Ok(props) => rendered(&state, state.generator.render_home(&props)),
        Err(e) => content_error(&state, e),
    }
}

async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
    jar: CookieJar,
) -> Response {
    if !SLUG_RE.is_match(&slug) {
        return not_found(&state);
    }
    let config = &state.site.config;

    if let Some(reference) = preview_ref(&jar) {
        let content = ContentRef::Preview(reference);
        return match loader::load_post(&state.client, config, &slug, &content).await {
            Ok(props) => rendered(&state, state.generator.render_post(&props)),
            Err(e) => content_error(&state, e),
        };
    }

    let file = state.generator.post_output_path(&slug);
    if !file.exists() {
        if loader::fallback_policy(config) == FallbackPolicy::NotFound {
            return not_found(&state);
        }

        let _guard = state.build_lock.lock().await;
        // Built by a concurrent request while waiting
        if !file.exists() {
            tracing::info!("Building post on demand: {}", slug);
            let content = match ContentRef::pin(&state.client).await {
                Ok(content) => content,
                Err(e) => return content_error(&state, e),
            };
            let props = match loader::load_post(&state.client, config, &slug, &content).await {
                Ok(props) => props,
                Err(e) => return content_error(&state, e),
            };
            if let Err(e) = state.generator.write_post(&props) {
                return internal_error(e);
            }
        }
    }

    serve_html_file(&state, &file).await
}

#[derive(Debug, Deserialize)]
struct LoadMoreQuery {
    page: String,
}

#[derive(Debug, Serialize)]
struct LoadMoreResponse {
    results: Vec<PostSummary>,
    next_page: Option<String>,
    /// Items rendered with the listing partial
    html: String,
}

async fn load_more_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<LoadMoreQuery>,
) -> Response {
    let pagination = match loader::home::load_more(&state.client, &query.page).await {
        Ok(pagination) => pagination,
        Err(e) => return content_error(&state, e),
    };

    let html = match state.generator.render_post_list(&pagination.results) {
        Ok(html) => html,
        Err(e) => return internal_error(e),
    };

    Json(LoadMoreResponse {
        results: pagination.results,
        next_page: pagination.next_page,
        html,
    })
    .into_response()
}

#[derive(Debug, Deserialize)]
struct PreviewQuery {
    token: String,
    #[serde(rename = "documentId")]
    document_id: Option<String>,
}

/// Enter preview mode and redirect to the previewed document
async fn preview_handler(
    State(state): State<Arc<ServerState>>,
    jar: CookieJar,
    Query(query): Query<PreviewQuery>,
) -> Response {
    let config = &state.site.config;
    let location = match &query.document_id {
        Some(id) => match state.client.get_by_id(id, Some(&query.token)).await {
            Ok(doc) => helpers::resolve_document_link(config, &doc.doc_type, doc.uid.as_deref()),
            Err(e) => {
                tracing::warn!("Could not resolve preview document {}: {}", id, e);
                helpers::url_for(config, "/")
            }
        },
        None => helpers::url_for(config, "/"),
    };

    let cookie = Cookie::build((PREVIEW_COOKIE, query.token))
        .path("/")
        .http_only(true);
    (jar.add(cookie), Redirect::temporary(&location)).into_response()
}

/// Leave preview mode
async fn exit_preview_handler(State(state): State<Arc<ServerState>>, jar: CookieJar) -> Response {
    let jar = jar.remove(Cookie::build(PREVIEW_COOKIE).path("/"));
    let home = helpers::url_for(&state.site.config, "/");
    (jar, Redirect::temporary(&home)).into_response()
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Serve files from the public directory
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    mut request: Request<Body>,
) -> Response {
    let root = helpers::url_for(&state.site.config, "/");
    let Some(relative) = site_relative(&root, request.uri().path()).map(str::to_string) else {
        return not_found(&state);
    };

    let file_path = if relative.is_empty() {
        state.public_dir().join("index.html")
    } else {
        let candidate = state.public_dir().join(&relative);
        if candidate.is_dir() {
            candidate.join("index.html")
        } else {
            candidate
        }
    };

    let is_html = file_path
        .extension()
        .map(|ext| ext == "html" || ext == "htm")
        .unwrap_or(false);

    if is_html {
        return serve_html_file(&state, &file_path).await;
    }

    if root != "/" {
        match format!("/{}", relative).parse() {
            Ok(uri) => *request.uri_mut() = uri,
            Err(_) => return not_found(&state),
        }
    }

    let mut service = ServeDir::new(state.public_dir()).append_index_html_on_directories(true);
    match service.try_call(request).await {
        Ok(response) if response.status() == StatusCode::NOT_FOUND => not_found(&state),
        Ok(response) => response.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

/// Request path relative to the site root, `None` outside it
fn site_relative<'a>(root: &str, path: &'a str) -> Option<&'a str> {
    if path == root.trim_end_matches('/') {
        return Some("");
    }
    path.strip_prefix(root)
}

async fn serve_html_file(state: &ServerState, file_path: &std::path::Path) -> Response {
    match tokio::fs::read_to_string(file_path).await {
        Ok(content) => html_page(state, content, StatusCode::OK),
        Err(_) => not_found(state),
    }
}

fn html_page(state: &ServerState, html: String, status: StatusCode) -> Response {
    let html = if state.live_reload {
        inject_live_reload(&html)
    } else {
        html
    };
    (status, Html(html)).into_response()
}

fn rendered(state: &ServerState, html: Result<String>) -> Response {
    match html {
        Ok(html) => html_page(state, html, StatusCode::OK),
        Err(e) => internal_error(e),
    }
}

fn not_found(state: &ServerState) -> Response {
    match state.generator.render_not_found() {
        Ok(html) => html_page(state, html, StatusCode::NOT_FOUND),
        Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

fn internal_error(err: anyhow::Error) -> Response {
    tracing::error!("Render failed: {}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
}

fn content_error(state: &ServerState, err: ContentError) -> Response {
    match &err {
        ContentError::NotFound(what) => {
            tracing::debug!("Document not found: {}", what);
            not_found(state)
        }
        ContentError::ForeignCursor(_) | ContentError::Url(_) => {
            tracing::warn!("Rejected cursor: {}", err);
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
        _ => {
            tracing::error!("Content API request failed: {}", err);
            (StatusCode::BAD_GATEWAY, "Content API unavailable").into_response()
        }
    }
}

/// Inject live reload script into HTML content
fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replace("</body>", LIVE_RELOAD_SCRIPT)
    } else {
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
