//! Route handlers and the router.

use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE, ORIGIN};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use signpost::core::{
    Location, LocationDetail, LocationPatch, Method as Verb, NewUser, SubjectId, User, UserPatch,
    View, ViewPatch,
};
use signpost::perms::PathClass;
use signpost::{Bootstrap, Creation, RegistryError};

use crate::auth::{AuthUser, Authenticated, TOKEN_HEADER};
use crate::config::ServerConfig;
use crate::error::{ApiError, ApiResult};
use crate::events;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;

/// Build the full application router.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/admin", get(bootstrap_admin))
        .route("/auth", get(issue_token))
        .route("/events", get(events::feed))
        .route("/locations", get(list_locations).post(create_location))
        .route(
            "/locations/{name}",
            get(get_location)
                .patch(update_location)
                .delete(delete_location),
        )
        .route("/views", get(list_views).post(create_view))
        .route(
            "/views/{name}",
            get(get_view).patch(update_view).delete(delete_view),
        )
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{domain}/{name}",
            get(get_user)
                .patch(update_user)
                .put(replace_user)
                .delete(delete_user),
        )
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.body_limit))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(cors())
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::OPTIONS,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            ORIGIN,
            ACCEPT,
            HeaderName::from_static("x-requested-with"),
            CONTENT_TYPE,
            HeaderName::from_static(TOKEN_HEADER),
        ])
}

/// Reply for a create request. A pre-existing record is returned under `err`.
fn creation_reply<R: Serialize>(creation: Creation<R>, created: &str, exists: &str) -> Json<Value> {
    match creation {
        Creation::Created(record) => Json(json!({ "msg": created, "data": record })),
        Creation::Existing(record) => Json(json!({ "err": exists, "data": record })),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

async fn index(Authenticated(principal): Authenticated) -> Json<Value> {
    Json(json!({ "msg": "API Initialized!", "auth-user": principal.subject() }))
}

#[derive(Debug, Deserialize)]
struct AdminQuery {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
}

async fn bootstrap_admin(
    State(state): State<AppState>,
    AuthUser(eid): AuthUser,
    Query(query): Query<AdminQuery>,
) -> ApiResult<Json<Value>> {
    let new = NewUser {
        eid,
        name: query.name,
        email: query.email,
        enabled: true,
    };
    let reply = match state.registry.bootstrap_admin(new).await? {
        Bootstrap::Created(user) => json!({ "msg": "Admin successfully added!", "user": user }),
        Bootstrap::AlreadyPresent => json!({ "msg": "Admin already created" }),
    };
    Ok(Json(reply))
}

async fn issue_token(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
) -> ApiResult<Json<Value>> {
    let token = state.registry.issue_token(subject).await?;
    Ok(Json(json!({
        "msg": "Token issued",
        "expires_at": token.expires_at(),
        "token": token.into_string(),
    })))
}

// ─────────────────────────────────────────────────────────────────────────────
// Locations
// ─────────────────────────────────────────────────────────────────────────────

async fn list_locations(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
) -> ApiResult<Json<Vec<Location>>> {
    Ok(Json(state.registry.list_locations(&principal).await?))
}

async fn create_location(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    body: Result<ApiJson<Location>, ApiError>,
) -> ApiResult<Json<Value>> {
    let registry = &state.registry;
    registry.authorize(Verb::Post, PathClass::Locations, &principal, None)?;
    let ApiJson(location) = body?;
    let creation = registry.create_location(&principal, location).await?;
    Ok(creation_reply(
        creation,
        "Location successfully created!",
        "Location already exists!",
    ))
}

async fn get_location(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath(name): ApiPath<String>,
) -> ApiResult<Json<Option<LocationDetail>>> {
    Ok(Json(state.registry.get_location(&principal, &name).await?))
}

async fn update_location(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath(name): ApiPath<String>,
    body: Result<ApiJson<LocationPatch>, ApiError>,
) -> ApiResult<Json<Value>> {
    state
        .registry
        .authorize(Verb::Patch, PathClass::Locations, &principal, None)?;
    let ApiJson(patch) = body?;
    let changes = patch.clone();
    let location = state
        .registry
        .update_location(&principal, &name, patch)
        .await?;
    Ok(Json(json!({
        "msg": "Location successfully updated!",
        "data": location,
        "changes": changes,
    })))
}

async fn delete_location(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath(name): ApiPath<String>,
) -> ApiResult<Json<Value>> {
    state.registry.delete_location(&principal, &name).await?;
    Ok(Json(json!({ "msg": "Location successfully deleted!" })))
}

// ─────────────────────────────────────────────────────────────────────────────
// Views
// ─────────────────────────────────────────────────────────────────────────────

async fn list_views(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
) -> ApiResult<Json<Vec<View>>> {
    Ok(Json(state.registry.list_views(&principal).await?))
}

async fn create_view(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    body: Result<ApiJson<View>, ApiError>,
) -> ApiResult<Json<Value>> {
    let registry = &state.registry;
    registry.authorize(Verb::Post, PathClass::Views, &principal, None)?;
    let ApiJson(view) = body?;
    let creation = registry.create_view(&principal, view).await?;
    Ok(creation_reply(
        creation,
        "View successfully created!",
        "View already exists!",
    ))
}

async fn get_view(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath(name): ApiPath<String>,
) -> ApiResult<Json<Option<View>>> {
    Ok(Json(state.registry.get_view(&principal, &name).await?))
}

async fn update_view(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath(name): ApiPath<String>,
    body: Result<ApiJson<ViewPatch>, ApiError>,
) -> ApiResult<Json<Value>> {
    state
        .registry
        .authorize(Verb::Patch, PathClass::Views, &principal, None)?;
    let ApiJson(patch) = body?;
    let changes = patch.clone();
    let view = state.registry.update_view(&principal, &name, patch).await?;
    Ok(Json(json!({
        "msg": "View successfully updated!",
        "data": view,
        "changes": changes,
    })))
}

async fn delete_view(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath(name): ApiPath<String>,
) -> ApiResult<Json<Value>> {
    state.registry.delete_view(&principal, &name).await?;
    Ok(Json(json!({ "msg": "View successfully deleted!" })))
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

fn path_subject(domain: &str, name: &str) -> ApiResult<SubjectId> {
    SubjectId::from_parts(domain, name).map_err(|e| ApiError::from(RegistryError::from(e)))
}

async fn list_users(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.registry.list_users(&principal).await?))
}

async fn create_user(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    body: Result<ApiJson<NewUser>, ApiError>,
) -> ApiResult<Json<Value>> {
    let registry = &state.registry;
    registry.authorize(Verb::Post, PathClass::Users, &principal, None)?;
    let ApiJson(new) = body?;
    let creation = registry.create_user(&principal, new).await?;
    Ok(creation_reply(
        creation,
        "User successfully added!",
        "User already exists!",
    ))
}

async fn get_user(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath((domain, name)): ApiPath<(String, String)>,
) -> ApiResult<Json<Option<User>>> {
    let eid = path_subject(&domain, &name)?;
    Ok(Json(state.registry.get_user(&principal, &eid).await?))
}

async fn update_user(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath((domain, name)): ApiPath<(String, String)>,
    body: Result<ApiJson<UserPatch>, ApiError>,
) -> ApiResult<Json<Value>> {
    let eid = path_subject(&domain, &name)?;
    state
        .registry
        .authorize(Verb::Patch, PathClass::Users, &principal, Some(&eid))?;
    let ApiJson(patch) = body?;
    let user = state.registry.update_user(&principal, &eid, patch).await?;
    Ok(Json(json!({ "msg": "User successfully updated!", "data": user })))
}

async fn replace_user(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath((domain, name)): ApiPath<(String, String)>,
    body: Result<ApiJson<UserPatch>, ApiError>,
) -> ApiResult<Json<Value>> {
    let eid = path_subject(&domain, &name)?;
    state
        .registry
        .authorize(Verb::Put, PathClass::Users, &principal, Some(&eid))?;
    let ApiJson(patch) = body?;
    let user = state.registry.replace_user(&principal, &eid, patch).await?;
    Ok(Json(json!({ "msg": "User successfully updated!", "data": user })))
}

async fn delete_user(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath((domain, name)): ApiPath<(String, String)>,
) -> ApiResult<Json<Value>> {
    let eid = path_subject(&domain, &name)?;
    state.registry.delete_user(&principal, &eid).await?;
    Ok(Json(json!({ "msg": "User successfully deleted!" })))
}
