use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::auth::{IdentityProvider, SESSION_COOKIE};
use super::domain::{Area, InquiryId, InquiryStatus, ListingId, ListingStatus, UserId};
use super::query::{ListingQuery, StatusFilter};
use super::service::{
    ApplicationForm, InquiryForm, ListingForm, MarketplaceError, MarketplaceService,
};
use super::store::MarketplaceStore;

/// Router builder exposing the marketplace HTTP endpoints.
pub fn marketplace_router<S, P>(service: Arc<MarketplaceService<S, P>>) -> Router
where
    S: MarketplaceStore + 'static,
    P: IdentityProvider + 'static,
{
    Router::new()
        .route(
            "/api/v1/session",
            post(create_session_handler::<S, P>).get(session_info_handler::<S, P>),
        )
        .route("/api/v1/listings", get(search_handler::<S, P>))
        .route("/api/v1/listings/:listing_id", get(detail_handler::<S, P>))
        .route(
            "/api/v1/listings/:listing_id/inquiries",
            post(inquiry_handler::<S, P>),
        )
        .route("/api/v1/landlords/apply", post(apply_handler::<S, P>))
        .route(
            "/api/v1/landlords/listings",
            post(create_listing_handler::<S, P>),
        )
        .route(
            "/api/v1/landlords/inquiries/:inquiry_id/status",
            post(inquiry_status_handler::<S, P>),
        )
        .route(
            "/api/v1/admin/landlords/:landlord_id/listings",
            get(listings_of_record_handler::<S, P>),
        )
        .route(
            "/api/v1/admin/landlords/:landlord_id/approve",
            post(approve_handler::<S, P>),
        )
        .route(
            "/api/v1/admin/landlords/:landlord_id/reject",
            post(reject_handler::<S, P>),
        )
        .route(
            "/api/v1/admin/landlords/:landlord_id/suspend",
            post(suspend_handler::<S, P>),
        )
        .with_state(service)
}

/// Pull the session credential out of the Cookie header, if any.
pub(crate) fn session_credential(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

fn error_response(error: MarketplaceError) -> Response {
    let status = match &error {
        MarketplaceError::Unauthenticated => StatusCode::UNAUTHORIZED,
        MarketplaceError::Forbidden(_) => StatusCode::FORBIDDEN,
        MarketplaceError::NotFound => StatusCode::NOT_FOUND,
        MarketplaceError::Conflict(_) => StatusCode::CONFLICT,
        MarketplaceError::Validation(_) => StatusCode::BAD_REQUEST,
        MarketplaceError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        MarketplaceError::MutationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = Json(json!({ "error": error.to_string() }));
    (status, body).into_response()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionRequest {
    #[serde(default)]
    pub(crate) id_token: String,
}

pub(crate) async fn create_session_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    Json(request): Json<SessionRequest>,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: IdentityProvider + 'static,
{
    if request.id_token.is_empty() {
        return error_response(MarketplaceError::Validation(
            "missing ID token".to_string(),
        ));
    }

    match service.create_session(&request.id_token) {
        Ok(issued) => {
            let max_age = service.session_ttl().num_seconds();
            let cookie = format!(
                "{SESSION_COOKIE}={}; Max-Age={max_age}; Path=/; HttpOnly; SameSite=Lax",
                issued.credential
            );
            let body = Json(json!({ "success": true, "uid": issued.claims.subject.0 }));
            (StatusCode::OK, [(header::SET_COOKIE, cookie)], body).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn session_info_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    headers: HeaderMap,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: IdentityProvider + 'static,
{
    let credential = session_credential(&headers);
    let body = match service.current_session(credential.as_deref()) {
        Some(claims) => json!({ "user": { "uid": claims.subject.0, "email": claims.email } }),
        None => json!({ "user": serde_json::Value::Null }),
    };
    (StatusCode::OK, Json(body)).into_response()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchParams {
    pub(crate) status: Option<String>,
    pub(crate) area: Option<String>,
    pub(crate) min_price: Option<u32>,
    pub(crate) max_price: Option<u32>,
    pub(crate) min_bedrooms: Option<u8>,
}

fn listing_query(params: SearchParams) -> Result<ListingQuery, MarketplaceError> {
    let status = match params.status.as_deref() {
        None => StatusFilter::default(),
        Some("all") => StatusFilter::Any,
        Some(value) => ListingStatus::parse(value)
            .map(StatusFilter::Only)
            .ok_or_else(|| MarketplaceError::Validation(format!("unknown status '{value}'")))?,
    };
    let area = match params.area.as_deref() {
        None | Some("all") => None,
        Some(value) => Some(
            Area::parse(value)
                .ok_or_else(|| MarketplaceError::Validation(format!("unknown area '{value}'")))?,
        ),
    };

    Ok(ListingQuery {
        status,
        area,
        min_price: params.min_price,
        max_price: params.max_price,
        min_bedrooms: params.min_bedrooms,
    })
}

pub(crate) async fn search_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    Query(params): Query<SearchParams>,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: IdentityProvider + 'static,
{
    let query = match listing_query(params) {
        Ok(query) => query,
        Err(error) => return error_response(error),
    };

    match service.search_listings(&query) {
        Ok(listings) => (StatusCode::OK, Json(json!({ "listings": listings }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn detail_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    Path(listing_id): Path<String>,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: IdentityProvider + 'static,
{
    match service.listing_detail(&ListingId(listing_id)) {
        Ok(detail) => (StatusCode::OK, Json(json!({ "listing": detail }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn inquiry_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    Path(listing_id): Path<String>,
    headers: HeaderMap,
    Json(form): Json<InquiryForm>,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: IdentityProvider + 'static,
{
    let credential = session_credential(&headers);
    let claims = service.current_session(credential.as_deref());

    match service.submit_inquiry(claims.as_ref(), &ListingId(listing_id), form) {
        Ok(inquiry) => (
            StatusCode::OK,
            Json(json!({ "success": true, "inquiryId": inquiry.id.0 })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn apply_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    headers: HeaderMap,
    Json(form): Json<ApplicationForm>,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: IdentityProvider + 'static,
{
    let credential = session_credential(&headers);
    let claims = match service.verify_session(credential.as_deref()) {
        Ok(claims) => claims,
        Err(error) => return error_response(error),
    };

    match service.submit_application(&claims, form) {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "success": true, "message": "application submitted" })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_listing_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    headers: HeaderMap,
    Json(form): Json<ListingForm>,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: IdentityProvider + 'static,
{
    let credential = session_credential(&headers);
    let claims = match service.verify_session(credential.as_deref()) {
        Ok(claims) => claims,
        Err(error) => return error_response(error),
    };

    match service.create_listing(&claims, form) {
        Ok(listing) => (
            StatusCode::OK,
            Json(json!({ "success": true, "listingId": listing.id.0 })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct InquiryStatusRequest {
    pub(crate) status: InquiryStatus,
}

pub(crate) async fn inquiry_status_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    Path(inquiry_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<InquiryStatusRequest>,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: IdentityProvider + 'static,
{
    let credential = session_credential(&headers);
    let claims = match service.verify_session(credential.as_deref()) {
        Ok(claims) => claims,
        Err(error) => return error_response(error),
    };

    match service.update_inquiry_status(&claims, &InquiryId(inquiry_id), request.status) {
        Ok(inquiry) => (
            StatusCode::OK,
            Json(json!({ "success": true, "status": inquiry.status.label() })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn listings_of_record_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    Path(landlord_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: IdentityProvider + 'static,
{
    let credential = session_credential(&headers);
    let claims = match service.verify_session(credential.as_deref()) {
        Ok(claims) => claims,
        Err(error) => return error_response(error),
    };

    match service.listings_of_record(&claims, &UserId(landlord_id)) {
        Ok(listings) => (StatusCode::OK, Json(json!({ "listings": listings }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn approve_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    Path(landlord_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: IdentityProvider + 'static,
{
    let credential = session_credential(&headers);
    let claims = match service.verify_session(credential.as_deref()) {
        Ok(claims) => claims,
        Err(error) => return error_response(error),
    };

    match service.approve_landlord(&claims, &UserId(landlord_id)) {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "success": true, "message": "landlord application approved" })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reject_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    Path(landlord_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: IdentityProvider + 'static,
{
    let credential = session_credential(&headers);
    let claims = match service.verify_session(credential.as_deref()) {
        Ok(claims) => claims,
        Err(error) => return error_response(error),
    };

    match service.reject_landlord(&claims, &UserId(landlord_id)) {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "success": true, "message": "landlord application rejected" })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SuspendRequest {
    pub(crate) suspend: bool,
}

pub(crate) async fn suspend_handler<S, P>(
    State(service): State<Arc<MarketplaceService<S, P>>>,
    Path(landlord_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<SuspendRequest>,
) -> Response
where
    S: MarketplaceStore + 'static,
    P: IdentityProvider + 'static,
{
    let credential = session_credential(&headers);
    let claims = match service.verify_session(credential.as_deref()) {
        Ok(claims) => claims,
        Err(error) => return error_response(error),
    };

    match service.set_landlord_suspension(&claims, &UserId(landlord_id), request.suspend) {
        Ok(()) => {
            let message = if request.suspend {
                "landlord suspended"
            } else {
                "landlord reinstated"
            };
            (
                StatusCode::OK,
                Json(json!({ "success": true, "message": message })),
            )
                .into_response()
        }
        Err(error) => error_response(error),
    }
}
