//! HTTP handlers for Orders API

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse,
    },
};
use domain_spectacles::SpectacleRepository;
use domain_users::UserRepository;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::OrderResult;
use crate::models::{
    CreateOrder, CreateOrderResponse, Order, OrderItem, OrderLine, OrderStatus, OrderWithUser,
    ShippingAddress, UserOrder,
};
use crate::repository::OrderRepository;
use crate::service::OrderService;

/// OpenAPI documentation for Orders API
#[derive(OpenApi)]
#[openapi(
    paths(create_order, list_user_orders, get_order, cancel_order),
    components(
        schemas(
            Order, OrderItem, OrderStatus, ShippingAddress, CreateOrder, CreateOrderResponse,
            UserOrder, OrderLine, OrderWithUser
        ),
        responses(
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            NotFoundResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Orders", description = "Checkout, order history and cancellation")
    )
)]
pub struct ApiDoc;

type Service<O, U, P> = State<Arc<OrderService<O, U, P>>>;

pub fn router<O, U, P>(service: Arc<OrderService<O, U, P>>) -> Router
where
    O: OrderRepository + 'static,
    U: UserRepository + 'static,
    P: SpectacleRepository + 'static,
{
    Router::new()
        .route("/", post(create_order))
        .route("/user/{user_id}", get(list_user_orders))
        .route("/{id}", get(get_order))
        .route("/{id}/cancel", post(cancel_order).patch(cancel_order))
        .with_state(service)
}

/// Place an order
#[utoipa::path(
    post,
    path = "",
    tag = "Orders",
    request_body = CreateOrder,
    responses(
        (status = 201, description = "Order created successfully", body = CreateOrderResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_order<O, U, P>(
    State(service): Service<O, U, P>,
    ValidatedJson(input): ValidatedJson<CreateOrder>,
) -> OrderResult<impl IntoResponse>
where
    O: OrderRepository,
    U: UserRepository,
    P: SpectacleRepository,
{
    let order = service.create_order(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            success: true,
            message: "Order created successfully".to_string(),
            order,
        }),
    ))
}

/// Orders of one user, newest first
#[utoipa::path(
    get,
    path = "/user/{user_id}",
    tag = "Orders",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Orders of the user", body = Vec<UserOrder>),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_user_orders<O, U, P>(
    State(service): Service<O, U, P>,
    UuidPath(user_id): UuidPath,
) -> OrderResult<Json<Vec<UserOrder>>>
where
    O: OrderRepository,
    U: UserRepository,
    P: SpectacleRepository,
{
    Ok(Json(service.list_user_orders(user_id).await?))
}

/// An order together with its owner
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Orders",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order found", body = OrderWithUser),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_order<O, U, P>(
    State(service): Service<O, U, P>,
    UuidPath(id): UuidPath,
) -> OrderResult<Json<OrderWithUser>>
where
    O: OrderRepository,
    U: UserRepository,
    P: SpectacleRepository,
{
    Ok(Json(service.get_order(id).await?))
}

/// Cancel an order.
///
/// Any status can be cancelled, including one already shipped or cancelled.
#[utoipa::path(
    method(patch, post),
    path = "/{id}/cancel",
    tag = "Orders",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order cancelled", body = Order),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn cancel_order<O, U, P>(
    State(service): Service<O, U, P>,
    UuidPath(id): UuidPath,
) -> OrderResult<Json<Order>>
where
    O: OrderRepository,
    U: UserRepository,
    P: SpectacleRepository,
{
    Ok(Json(service.cancel_order(id).await?))
}
