//!
//! suivi HTTP server
//! -----------------
//! Axum routes over the identity, permission and view layers.
//!
//! Responsibilities:
//! - Login/logout with a signed session cookie and a per-session CSRF token.
//! - Per-resource permission, list and detail endpoints for the dashboard pages.
//! - Create/update/delete endpoints gated by CSRF and by the controller's capability checks.
//! - Seed loading and startup logs.

use std::net::SocketAddr;
use std::path::Path as FsPath;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::config::{AppConfig, TableSettings};
use crate::error::{AppError, AppResult};
use crate::identity::{
    resolve_session, CookieJar, CurrentUser, LocalAuthProvider, LoginRequest, Permission, RequestContext, Role,
    SessionManager, UserDirectory,
};
use crate::permissions::{define_permissions, Resource};
use crate::rpc::{load_seed, InMemoryRpc, Record};
use crate::table::{SortDirection, SortSpec, TableState};
use crate::view::{resource_spec, DetailOutcome, Redirects, ResourceController};

/// Shared server state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: Arc<SessionManager>,
    pub auth: Arc<LocalAuthProvider>,
    pub rpc: Arc<InMemoryRpc>,
    pub tables: Arc<TableSettings>,
}

impl AppState {
    pub fn new(config: AppConfig, users: UserDirectory, rpc: InMemoryRpc) -> AppResult<Self> {
        let sessions = match config.session_secret.as_deref() {
            Some(secret) if !secret.is_empty() => {
                SessionManager::new(config.session_ttl_secs, &config.cookie_name, secret.as_bytes().to_vec())
            }
            _ => SessionManager::with_random_secret(config.session_ttl_secs, &config.cookie_name)?,
        };
        let tables = TableSettings::new(config.table_defaults());
        Ok(Self {
            config: Arc::new(config),
            sessions: Arc::new(sessions),
            auth: Arc::new(LocalAuthProvider::new(users)),
            rpc: Arc::new(rpc),
            tables: Arc::new(tables),
        })
    }

    pub fn with_tables(mut self, tables: TableSettings) -> Self {
        self.tables = Arc::new(tables);
        self
    }

    fn controller(&self, resource: Resource) -> ResourceController<InMemoryRpc> {
        ResourceController::new(resource_spec(resource), self.rpc.clone(), self.tables.effective(resource)).with_redirects(
            Redirects { forbidden: self.config.forbidden_redirect.clone(), login: self.config.login_redirect.clone() },
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!("request failed: {}", self);
        }
        (status, Json(json!({"status": "error", "error": self}))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "suivi ok" }))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/api/me", get(me))
        .route("/api/{resource}/permissions", get(permissions))
        .route("/api/{resource}", get(list).post(create))
        .route("/api/{resource}/{id}", get(detail).put(update).delete(remove))
        .with_state(state)
}

/// Load the seed (if any), bind and serve until the listener fails.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let users = UserDirectory::new();
    let rpc = InMemoryRpc::new();
    match config.seed_file.as_deref() {
        Some(path) => {
            load_seed(FsPath::new(path), &rpc, &users).await?;
        }
        None => warn!(target: "startup", "no seed file configured; nobody can sign in"),
    }
    let addr: SocketAddr = format!("{}:{}", config.http_host, config.http_port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.http_host, config.http_port))?;
    let state = AppState::new(config, users, rpc)?;

    info!(target: "startup", "Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

fn cookie_jar(headers: &HeaderMap) -> CookieJar {
    let raw: Vec<&str> = headers.get_all(header::COOKIE).iter().filter_map(|v| v.to_str().ok()).collect();
    CookieJar::parse(&raw.join("; "))
}

fn cookie_header(value: String) -> AppResult<HeaderValue> {
    HeaderValue::from_str(&value).map_err(|e| AppError::internal("cookie_header".to_string(), e.to_string()))
}

fn set_session_cookie(cfg: &AppConfig, token: &str) -> AppResult<HeaderValue> {
    let secure = if cfg.cookie_secure { "; Secure" } else { "" };
    cookie_header(format!(
        "{}={}; Max-Age={}; HttpOnly{}; SameSite=Strict; Path=/",
        cfg.cookie_name, token, cfg.session_ttl_secs, secure
    ))
}

fn clear_session_cookie(cfg: &AppConfig) -> AppResult<HeaderValue> {
    let secure = if cfg.cookie_secure { "; Secure" } else { "" };
    cookie_header(format!(
        "{}=deleted; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly{}; SameSite=Strict; Path=/",
        cfg.cookie_name, secure
    ))
}

async fn request_context(state: &AppState, headers: &HeaderMap) -> RequestContext {
    resolve_session(&cookie_jar(headers), &*state.sessions)
        .await
        .into_context()
        .with_request_id(uuid::Uuid::new_v4().to_string())
}

/// Signed-in context for a state-changing request whose CSRF header matches the session.
async fn mutation_context(state: &AppState, headers: &HeaderMap) -> AppResult<RequestContext> {
    let ctx = request_context(state, headers).await;
    if !ctx.is_authenticated() {
        return Err(AppError::unauthenticated("no_session", "sign in to continue"));
    }
    require_csrf(state, headers)?;
    Ok(ctx)
}

/// Returns the session token when the `x-csrf-token` header matches it.
fn require_csrf(state: &AppState, headers: &HeaderMap) -> AppResult<String> {
    let jar = cookie_jar(headers);
    let token = jar.get(&state.config.cookie_name).unwrap_or_default();
    let provided = headers.get("x-csrf-token").and_then(|v| v.to_str().ok()).unwrap_or_default();
    if state.sessions.check_csrf(token, provided) {
        return Ok(token.to_string());
    }
    warn!(target: "session", "csrf check failed");
    Err(AppError::forbidden("invalid_csrf", "missing or invalid csrf token"))
}

fn known_resource(name: &str) -> AppResult<Resource> {
    Resource::parse(name).ok_or_else(|| {
        warn!(target: "permission", "route names unknown resource '{}'", name);
        AppError::configuration("unknown_resource".to_string(), format!("no resource named '{}'", name))
    })
}

async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> AppResult<Response> {
    // argon2 verification is CPU-bound; keep it off the async workers
    let (auth, sessions, attempt) = (state.auth.clone(), state.sessions.clone(), req.clone());
    let verdict = tokio::task::spawn_blocking(move || auth.login(&sessions, &attempt))
        .await
        .map_err(|e| AppError::internal("login_task".to_string(), e.to_string()))?;
    let session = verdict.map_err(|e| {
        info!(target: "session", "login refused for '{}': {}", req.username, e);
        AppError::unauthenticated("invalid_credentials", "unknown user or wrong password")
    })?;
    let permission = Role::parse(&session.data.role).map(|role| Permission::new(session.data.user_id.clone(), role));
    let user = CurrentUser { id: session.data.user_id.clone(), display_name: session.data.display_name.clone() };
    info!(target: "session", "login user={} role={}", user.id, session.data.role);

    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, set_session_cookie(&state.config, &session.token)?);
    let body = json!({"status": "ok", "csrf": session.csrf, "user": user, "permission": permission});
    Ok((StatusCode::OK, headers, Json(body)).into_response())
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    let token = require_csrf(&state, &headers)?;
    state.sessions.logout(&token);
    let mut h = HeaderMap::new();
    h.insert(header::SET_COOKIE, clear_session_cookie(&state.config)?);
    Ok((StatusCode::OK, h, Json(json!({"status": "ok"}))).into_response())
}

async fn me(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Json<serde_json::Value>> {
    let ctx = request_context(&state, &headers).await;
    if !ctx.is_authenticated() {
        return Err(AppError::unauthenticated("no_session", "sign in to continue"));
    }
    let csrf = cookie_jar(&headers).get(&state.config.cookie_name).and_then(|t| state.sessions.csrf_for(t));
    Ok(Json(json!({"status": "ok", "user": ctx.current_user, "permission": ctx.permission, "csrf": csrf})))
}

async fn permissions(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    headers: HeaderMap,
) -> Json<serde_json::Value> {
    let ctx = request_context(&state, &headers).await;
    let caps = define_permissions(ctx.permission.as_ref(), &resource);
    Json(json!({"status": "ok", "resource": resource, "permissions": caps}))
}

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    search: Option<String>,
    page: Option<usize>,
    sort: Option<String>,
    dir: Option<String>,
}

impl ListParams {
    fn into_state(self) -> TableState {
        let mut table = TableState::default();
        if let Some(q) = self.search.as_deref() {
            table.set_search(q);
        }
        let direction = self.dir.as_deref().and_then(SortDirection::parse).unwrap_or_default();
        table.set_sort(self.sort.filter(|k| !k.is_empty()).map(|key| SortSpec { key, direction }));
        if let Some(p) = self.page {
            table.go_to(p);
        }
        table
    }
}

async fn list(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> AppResult<Json<serde_json::Value>> {
    let resource = known_resource(&resource)?;
    let ctx = request_context(&state, &headers).await;
    let outcome = state.controller(resource).list(&ctx, &params.into_state()).await?;
    Ok(Json(json!({"status": "ok", "data": outcome})))
}

async fn detail(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let resource = known_resource(&resource)?;
    let ctx = request_context(&state, &headers).await;
    match state.controller(resource).detail(&ctx, &id).await? {
        DetailOutcome::Redirect { to } => Ok((StatusCode::SEE_OTHER, [(header::LOCATION, to)]).into_response()),
        DetailOutcome::View { view } => Ok(Json(json!({"status": "ok", "data": view})).into_response()),
    }
}

async fn create(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<Record>,
) -> AppResult<Response> {
    let resource = known_resource(&resource)?;
    let ctx = mutation_context(&state, &headers).await?;
    let record = state.controller(resource).create(&ctx, payload).await?;
    Ok((StatusCode::CREATED, Json(json!({"status": "ok", "data": record}))).into_response())
}

async fn update(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(payload): Json<Record>,
) -> AppResult<Json<serde_json::Value>> {
    let resource = known_resource(&resource)?;
    let ctx = mutation_context(&state, &headers).await?;
    let record = state.controller(resource).update(&ctx, &id, payload).await?;
    Ok(Json(json!({"status": "ok", "data": record})))
}

async fn remove(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> AppResult<Json<serde_json::Value>> {
    let resource = known_resource(&resource)?;
    let ctx = mutation_context(&state, &headers).await?;
    let record = state.controller(resource).delete(&ctx, &id).await?;
    Ok(Json(json!({"status": "ok", "data": record})))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_attributes_follow_config() {
        let mut cfg = AppConfig::default();
        let v = set_session_cookie(&cfg, "abc.def").unwrap();
        let s = v.to_str().unwrap();
        assert!(s.starts_with("suivi_session=abc.def;"));
        assert!(s.contains("HttpOnly") && s.contains("SameSite=Strict") && s.contains("Secure"));

        cfg.cookie_secure = false;
        let cleared = clear_session_cookie(&cfg).unwrap();
        assert!(cleared.to_str().unwrap().contains("Expires=Thu, 01 Jan 1970"));
        assert!(!cleared.to_str().unwrap().contains("Secure"));
    }

    #[test]
    fn list_params_build_table_state() {
        let p = ListParams { search: Some(" ada ".into()), page: Some(3), sort: Some("name".into()), dir: Some("desc".into()) };
        let t = p.into_state();
        assert_eq!(t.search, "ada");
        assert_eq!(t.page, 3);
        assert_eq!(t.sort, Some(SortSpec { key: "name".into(), direction: SortDirection::Desc }));
        assert_eq!(ListParams::default().into_state(), TableState::default());
    }

    #[test]
    fn cookies_across_multiple_headers() {
        let mut h = HeaderMap::new();
        h.append(header::COOKIE, HeaderValue::from_static("a=1"));
        h.append(header::COOKIE, HeaderValue::from_static("suivi_session=tok"));
        assert_eq!(cookie_jar(&h).get("suivi_session"), Some("tok"));
    }
}
