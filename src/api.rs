//! HTTP surface over the commerce store.
//!
//! The caller's actor comes from the `x-actor-id` header; a missing or blank
//! header means guest. Each request opens a store for that actor over the
//! shared storage. Requests are serialized through a single gate so two
//! mutations never interleave; the store itself runs on the blocking pool
//! because storage I/O is synchronous.

use std::convert::Infallible;
use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRequestParts, Path, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use validator::Validate;

use crate::domain::aggregates::{CheckoutContact, OrderConfirmation, WishlistEntry};
use crate::domain::catalog::Product;
use crate::domain::promotion::{PromoOutcome, PromoRejection};
use crate::domain::value_objects::ActorId;
use crate::identity::FixedIdentity;
use crate::store::{CartSummary, CommerceStore};
use crate::{SharedStorage, StorefrontError};

pub const ACTOR_HEADER: &str = "x-actor-id";

#[derive(Clone)]
pub struct AppState {
    storage: SharedStorage,
    gate: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(storage: SharedStorage) -> Self { Self { storage, gate: Arc::new(Mutex::new(())) } }

    async fn with_store<T, F>(&self, actor: ActorId, f: F) -> ApiResult<T>
    where
        F: FnOnce(&mut CommerceStore<SharedStorage>) -> T + Send + 'static,
        T: Send + 'static,
    {
        let guard = self.gate.clone().lock_owned().await;
        let storage = self.storage.clone();
        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            let mut store = CommerceStore::open(storage, &FixedIdentity::new(actor));
            f(&mut store)
        })
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "opensase-storefront"})) }))
        .route("/api/v1/cart", get(get_cart).delete(clear_cart))
        .route("/api/v1/cart/items", post(add_to_cart))
        .route("/api/v1/cart/items/:product_id", put(update_quantity).delete(remove_from_cart))
        .route("/api/v1/cart/items/:product_id/save-for-later", post(save_for_later))
        .route("/api/v1/cart/items/:product_id/move-to-cart", post(move_to_cart))
        .route("/api/v1/cart/promo", post(apply_promo).delete(remove_promo))
        .route("/api/v1/wishlist", get(get_wishlist).post(add_to_wishlist).delete(clear_wishlist))
        .route("/api/v1/wishlist/:product_id", delete(remove_from_wishlist))
        .route("/api/v1/wishlist/:product_id/move-to-cart", post(move_wishlist_to_cart))
        .route("/api/v1/recently-viewed", get(get_recently_viewed).post(add_to_recently_viewed).delete(clear_recently_viewed))
        .route("/api/v1/checkout", post(checkout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// =============================================================================
// Actor extraction
// =============================================================================

pub struct Actor(pub ActorId);

#[async_trait]
impl<St: Send + Sync> FromRequestParts<St> for Actor {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &St) -> Result<Self, Self::Rejection> {
        let actor = parts.headers.get(ACTOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| ActorId::new(v).ok())
            .unwrap_or_default();
        Ok(Actor(actor))
    }
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    Storefront(StorefrontError),
    PromoRejected(PromoRejection),
    EmptyCart,
    Internal(String),
}

impl From<StorefrontError> for ApiError {
    fn from(err: StorefrontError) -> Self { ApiError::Storefront(err) }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self { ApiError::Storefront(err.into()) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Storefront(err @ StorefrontError::Validation(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, serde_json::json!({"error": err.to_string()}))
            }
            ApiError::Storefront(err) => {
                tracing::error!(error = %err, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, serde_json::json!({"error": err.to_string()}))
            }
            ApiError::PromoRejected(reason) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                serde_json::json!({"error": reason.to_string(), "outcome": PromoOutcome::Rejected { reason }}),
            ),
            ApiError::EmptyCart => (StatusCode::CONFLICT, serde_json::json!({"error": "cart has no active items"})),
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "store task failed");
                (StatusCode::INTERNAL_SERVER_ERROR, serde_json::json!({"error": "internal error"}))
            }
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Requests / responses
// =============================================================================

#[derive(Debug, Deserialize)] pub struct AddToCartRequest { pub product: Product, #[serde(default = "one")] pub quantity: u32 }
#[derive(Debug, Deserialize)] pub struct UpdateQuantityRequest { pub quantity: i64 }
#[derive(Debug, Deserialize)] pub struct PromoRequest { pub code: String }
#[derive(Debug, Deserialize)] pub struct ProductRequest { pub product: Product }
#[derive(Debug, Deserialize)] pub struct CheckoutRequest { pub contact: CheckoutContact }
#[derive(Debug, Serialize)] pub struct PromoResponse { pub outcome: PromoOutcome, pub cart: CartSummary }

fn one() -> u32 { 1 }

/// Negative requests collapse to zero, which removes the line.
fn clamp_quantity(quantity: i64) -> u32 { u32::try_from(quantity.max(0)).unwrap_or(u32::MAX) }

// =============================================================================
// Cart
// =============================================================================

async fn get_cart(State(s): State<AppState>, Actor(actor): Actor) -> ApiResult<Json<CartSummary>> {
    Ok(Json(s.with_store(actor, |store| store.summary()).await?))
}

async fn clear_cart(State(s): State<AppState>, Actor(actor): Actor) -> ApiResult<Json<CartSummary>> {
    Ok(Json(s.with_store(actor, |store| { store.clear_cart(); store.summary() }).await?))
}

async fn add_to_cart(State(s): State<AppState>, Actor(actor): Actor, Json(r): Json<AddToCartRequest>) -> ApiResult<(StatusCode, Json<CartSummary>)> {
    r.product.validate()?;
    let summary = s.with_store(actor, move |store| { store.add_to_cart(&r.product, r.quantity); store.summary() }).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

async fn update_quantity(State(s): State<AppState>, Actor(actor): Actor, Path(id): Path<String>, Json(r): Json<UpdateQuantityRequest>) -> ApiResult<Json<CartSummary>> {
    let quantity = clamp_quantity(r.quantity);
    Ok(Json(s.with_store(actor, move |store| { store.update_quantity(&id, quantity); store.summary() }).await?))
}

async fn remove_from_cart(State(s): State<AppState>, Actor(actor): Actor, Path(id): Path<String>) -> ApiResult<Json<CartSummary>> {
    Ok(Json(s.with_store(actor, move |store| { store.remove_from_cart(&id); store.summary() }).await?))
}

async fn save_for_later(State(s): State<AppState>, Actor(actor): Actor, Path(id): Path<String>) -> ApiResult<Json<CartSummary>> {
    Ok(Json(s.with_store(actor, move |store| { store.save_for_later(&id); store.summary() }).await?))
}

async fn move_to_cart(State(s): State<AppState>, Actor(actor): Actor, Path(id): Path<String>) -> ApiResult<Json<CartSummary>> {
    Ok(Json(s.with_store(actor, move |store| { store.move_to_cart(&id); store.summary() }).await?))
}

async fn apply_promo(State(s): State<AppState>, Actor(actor): Actor, Json(r): Json<PromoRequest>) -> ApiResult<Json<PromoResponse>> {
    let (outcome, cart) = s.with_store(actor, move |store| (store.apply_promo_code(&r.code), store.summary())).await?;
    match outcome {
        PromoOutcome::Rejected { reason } => Err(ApiError::PromoRejected(reason)),
        outcome => Ok(Json(PromoResponse { outcome, cart })),
    }
}

async fn remove_promo(State(s): State<AppState>, Actor(actor): Actor) -> ApiResult<Json<CartSummary>> {
    Ok(Json(s.with_store(actor, |store| { store.remove_promo_code(); store.summary() }).await?))
}

// =============================================================================
// Wishlist
// =============================================================================

async fn get_wishlist(State(s): State<AppState>, Actor(actor): Actor) -> ApiResult<Json<Vec<WishlistEntry>>> {
    Ok(Json(s.with_store(actor, |store| store.wishlist().entries().to_vec()).await?))
}

async fn add_to_wishlist(State(s): State<AppState>, Actor(actor): Actor, Json(r): Json<ProductRequest>) -> ApiResult<(StatusCode, Json<Vec<WishlistEntry>>)> {
    r.product.validate()?;
    let entries = s.with_store(actor, move |store| { store.add_to_wishlist(&r.product); store.wishlist().entries().to_vec() }).await?;
    Ok((StatusCode::CREATED, Json(entries)))
}

async fn remove_from_wishlist(State(s): State<AppState>, Actor(actor): Actor, Path(id): Path<String>) -> ApiResult<StatusCode> {
    s.with_store(actor, move |store| store.remove_from_wishlist(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_wishlist(State(s): State<AppState>, Actor(actor): Actor) -> ApiResult<StatusCode> {
    s.with_store(actor, |store| store.clear_wishlist()).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn move_wishlist_to_cart(State(s): State<AppState>, Actor(actor): Actor, Path(id): Path<String>) -> ApiResult<Json<CartSummary>> {
    Ok(Json(s.with_store(actor, move |store| { store.move_wishlist_to_cart(&id); store.summary() }).await?))
}

// =============================================================================
// Recently viewed
// =============================================================================

async fn get_recently_viewed(State(s): State<AppState>, Actor(actor): Actor) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(s.with_store(actor, |store| store.recently_viewed().products().to_vec()).await?))
}

async fn add_to_recently_viewed(State(s): State<AppState>, Actor(actor): Actor, Json(r): Json<ProductRequest>) -> ApiResult<Json<Vec<Product>>> {
    r.product.validate()?;
    Ok(Json(s.with_store(actor, move |store| { store.add_to_recently_viewed(&r.product); store.recently_viewed().products().to_vec() }).await?))
}

async fn clear_recently_viewed(State(s): State<AppState>, Actor(actor): Actor) -> ApiResult<StatusCode> {
    s.with_store(actor, |store| store.clear_recently_viewed()).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Checkout
// =============================================================================

async fn checkout(State(s): State<AppState>, Actor(actor): Actor, Json(r): Json<CheckoutRequest>) -> ApiResult<(StatusCode, Json<OrderConfirmation>)> {
    r.contact.validate()?;
    let order = s.with_store(actor, move |store| store.checkout(r.contact)).await?.ok_or(ApiError::EmptyCart)?;
    Ok((StatusCode::CREATED, Json(order)))
}
