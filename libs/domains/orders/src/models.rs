use chrono::{DateTime, Duration, Utc};
use database::mongodb::ids::uuid_as_string;
use domain_users::UserResponse;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Days between placing an order and its estimated delivery
pub const DELIVERY_DAYS: i64 = 7;

/// Order lifecycle
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

/// One line of an order, priced at checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(with = "uuid_as_string")]
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i64,
    /// Unit price
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(length(min = 1, message = "Street is required"))]
    pub street: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[validate(length(min = 1, message = "Postal code is required"))]
    pub postal_code: String,
    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,
    #[serde(default)]
    pub phone: String,
}

/// Order entity, stored in the `orders` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", alias = "id", with = "uuid_as_string")]
    pub id: Uuid,
    #[serde(with = "uuid_as_string")]
    pub user_id: Uuid,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub discount_amount: f64,
    pub gift_card_amount: f64,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub status: OrderStatus,
    pub estimated_delivery: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// A new Pending order due [`DELIVERY_DAYS`] after now
    pub fn new(input: CreateOrder) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id: input.user_id,
            items: input.items,
            total_amount: input.total_amount,
            discount_amount: input.discount_amount.unwrap_or(0.0),
            gift_card_amount: input.gift_card_amount.unwrap_or(0.0),
            shipping_address: input.shipping_address,
            payment_method: input.payment_method,
            status: OrderStatus::Pending,
            estimated_delivery: now + Duration::days(DELIVERY_DAYS),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Body of `POST /orders`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    pub user_id: Uuid,
    #[validate(length(min = 1, message = "An order needs at least one item"), nested)]
    pub items: Vec<OrderItem>,
    #[validate(range(min = 0.0, message = "Total amount cannot be negative"))]
    pub total_amount: f64,
    #[validate(range(min = 0.0, message = "Discount amount cannot be negative"))]
    pub discount_amount: Option<f64>,
    #[validate(range(min = 0.0, message = "Gift card amount cannot be negative"))]
    pub gift_card_amount: Option<f64>,
    #[validate(nested)]
    pub shipping_address: ShippingAddress,
    #[validate(length(min = 1, message = "Payment method is required"))]
    pub payment_method: String,
}

/// Response of `POST /orders`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderResponse {
    pub success: bool,
    pub message: String,
    pub order: Order,
}

/// Order line with the catalog name of its product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: Uuid,
    /// `null` once the product has left the catalog
    pub product_name: Option<String>,
    pub quantity: i64,
    pub price: f64,
}

/// Entry of `GET /orders/user/{userId}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserOrder {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderLine>,
    pub total_amount: f64,
    pub discount_amount: f64,
    pub gift_card_amount: f64,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub status: OrderStatus,
    pub estimated_delivery: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserOrder {
    /// Attach product names; ids missing from `names` get `None`
    pub fn from_order(order: Order, names: &HashMap<Uuid, Option<String>>) -> Self {
        let items = order
            .items
            .into_iter()
            .map(|item| OrderLine {
                product_name: names.get(&item.product_id).cloned().flatten(),
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.price,
            })
            .collect();

        Self {
            id: order.id,
            user_id: order.user_id,
            items,
            total_amount: order.total_amount,
            discount_amount: order.discount_amount,
            gift_card_amount: order.gift_card_amount,
            shipping_address: order.shipping_address,
            payment_method: order.payment_method,
            status: order.status,
            estimated_delivery: order.estimated_delivery,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// Response of `GET /orders/{orderId}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderWithUser {
    #[serde(flatten)]
    pub order: Order,
    /// Owner of the order; `null` if the account was deleted
    pub user: Option<UserResponse>,
}
