//! Order types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::id::{OrderId, ProductId, UserId};
use crate::types::price::Price;
use crate::types::product::CartLine;

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Placed,
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

/// Error parsing an [`OrderStatus`] from its wire form.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown order status: {0}")]
pub struct OrderStatusParseError(pub String);

impl OrderStatus {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Placed => "PLACED",
            Self::Pending => "PENDING",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parse from the wire representation.
    ///
    /// # Errors
    ///
    /// Returns [`OrderStatusParseError`] for unrecognized values.
    pub fn parse(s: &str) -> Result<Self, OrderStatusParseError> {
        match s {
            "PLACED" => Ok(Self::Placed),
            "PENDING" => Ok(Self::Pending),
            "SHIPPED" => Ok(Self::Shipped),
            "DELIVERED" => Ok(Self::Delivered),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(OrderStatusParseError(other.to_string())),
        }
    }
}

/// One line of an order, denormalized so past orders render even after the
/// product is deleted from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    /// Unit price at the time the order was placed.
    pub price: Price,
}

/// A placed order as returned by the order service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "orderId")]
    pub id: OrderId,
    pub user_id: UserId,
    pub total_amount: Price,
    #[serde(rename = "orderStatus")]
    pub status: OrderStatus,
    #[serde(rename = "orderDate")]
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// A new order to submit; the server assigns the identifier and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub user_id: UserId,
    pub total_amount: Price,
    #[serde(rename = "orderStatus")]
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
}

impl OrderDraft {
    /// Build a draft from cart lines, totaling the line prices.
    #[must_use]
    pub fn from_cart(user_id: UserId, lines: &[CartLine]) -> Self {
        let total_amount = lines
            .iter()
            .fold(Price::ZERO, |acc, line| acc.plus(line.line_total()));

        Self {
            user_id,
            total_amount,
            status: OrderStatus::Placed,
            items: lines
                .iter()
                .map(|line| OrderItem {
                    product_id: line.product.id,
                    product_name: line.product.name.clone(),
                    quantity: line.quantity,
                    price: line.product.price,
                })
                .collect(),
        }
    }
}
