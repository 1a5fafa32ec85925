use crate::{
    abstract_trait::{
        checkout::DynCheckoutService,
        order::service::{DynOrderCommandService, DynOrderQueryService},
    },
    domain::{
        requests::{
            checkout::CheckoutRequest,
            order::{FindAllOrder, UpdateOrderStatusRequest, UpdatePaymentStatusRequest},
        },
        response::{
            checkout::{CheckoutResponse, PartialOrder},
            order::{OrderDetailResponse, OrderResponse, OrderStatsResponse},
        },
    },
    errors::CheckoutError,
    middleware::{
        jwt::auth_middleware,
        rate_limit::rate_limit_middleware,
        role::{admin_only, buyer_only},
        validate::SimpleValidatedJson,
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Extension, Path, Query},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, patch, post},
};
use shared::{
    domain::{ApiResponse, ApiResponsePagination, Identity},
    errors::HttpError,
};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/orders/checkout",
    tag = "Order",
    security(("bearer_auth" = [])),
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order placed", body = ApiResponse<CheckoutResponse>),
        (status = 207, description = "Order header created but some lines failed", body = PartialOrder),
        (status = 400, description = "Validation error, empty cart or unavailable items"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Buyer role required"),
        (status = 500, description = "Error creating order")
    )
)]
pub async fn checkout(
    Extension(service): Extension<DynCheckoutService>,
    Extension(identity): Extension<Identity>,
    SimpleValidatedJson(body): SimpleValidatedJson<CheckoutRequest>,
) -> Result<impl IntoResponse, CheckoutError> {
    let response = service.place_order(identity.user_id, &body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Order",
    security(("bearer_auth" = [])),
    params(FindAllOrder),
    responses(
        (status = 200, description = "Orders visible to the caller", body = ApiResponsePagination<Vec<OrderResponse>>),
        (status = 400, description = "Invalid pagination"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_orders(
    Extension(service): Extension<DynOrderQueryService>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<FindAllOrder>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_all(identity, &params).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Order",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with its lines", body = ApiResponse<OrderDetailResponse>),
        (status = 403, description = "Order belongs to someone else"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn get_order(
    Extension(service): Extension<DynOrderQueryService>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_by_id(identity, id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/status",
    tag = "Order",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Transition not allowed"),
        (status = 403, description = "Not allowed to update this order"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn update_order_status(
    Extension(service): Extension<DynOrderCommandService>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    SimpleValidatedJson(body): SimpleValidatedJson<UpdateOrderStatusRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.update_status(identity, id, &body).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/payment",
    tag = "Order",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdatePaymentStatusRequest,
    responses(
        (status = 200, description = "Payment status updated", body = ApiResponse<OrderResponse>),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn update_payment_status(
    Extension(service): Extension<DynOrderCommandService>,
    Path(id): Path<Uuid>,
    SimpleValidatedJson(body): SimpleValidatedJson<UpdatePaymentStatusRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.update_payment_status(id, &body).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/orders/stats/summary",
    tag = "Order",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order counts and amounts for the caller", body = ApiResponse<OrderStatsResponse>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_order_stats(
    Extension(service): Extension<DynOrderQueryService>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.stats(identity).await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn order_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route(
            "/api/orders/checkout",
            post(checkout).layer(middleware::from_fn(buyer_only)),
        )
        .route("/api/orders", get(get_orders))
        .route("/api/orders/stats/summary", get(get_order_stats))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/orders/{id}/status", patch(update_order_status))
        .route(
            "/api/orders/{id}/payment",
            patch(update_payment_status).layer(middleware::from_fn(admin_only)),
        )
        .route_layer(middleware::from_fn(auth_middleware))
        .route_layer(middleware::from_fn(rate_limit_middleware))
        .layer(Extension(app_state.di_container.checkout_service.clone()))
        .layer(Extension(app_state.di_container.order_query_service.clone()))
        .layer(Extension(app_state.di_container.order_command_service.clone()))
        .layer(Extension(app_state.rate_limit.clone()))
        .layer(Extension(app_state.jwt_config.clone()))
}
