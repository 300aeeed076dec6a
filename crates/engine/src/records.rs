//! Typed records returned by the query layer.
//!
//! Every report is built from these fixed-field structs; the server only
//! serializes them. Joined records flatten the order fields next to the owner
//! columns, the same way a `SELECT orders.*, users.name AS user_name` row looks.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use crate::{MoneyCents, orders, users};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: i32,
    pub product: String,
    pub quantity: i32,
    pub total: MoneyCents,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        Self {
            id: model.id,
            product: model.product,
            quantity: model.quantity,
            total: MoneyCents::new(model.total_minor),
            user_id: model.user_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// A user together with all of its orders (possibly none).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserWithOrders {
    #[serde(flatten)]
    pub user: User,
    pub orders: Vec<Order>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWithUserName {
    #[serde(flatten)]
    pub order: Order,
    pub user_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWithUserInfo {
    #[serde(flatten)]
    pub order: Order,
    pub user_name: String,
    pub user_email: String,
}

/// Sales aggregated per user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSales {
    pub id: i32,
    pub name: String,
    pub total_sales: MoneyCents,
    pub order_count: i64,
}

/// Sales aggregated per product name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSales {
    pub product: String,
    pub total_quantity: i64,
    pub total_sales: MoneyCents,
    pub order_count: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromQueryResult)]
pub struct ActiveUser {
    pub id: i32,
    pub name: String,
    pub order_count: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralStats {
    pub user_count: u64,
    pub order_count: u64,
    pub total_sales: MoneyCents,
    /// `None` when there are no orders.
    pub average_sale: Option<MoneyCents>,
    /// User with the most orders, lowest id on ties. `None` when there are no
    /// orders.
    pub most_active_user: Option<ActiveUser>,
}

/// Product, quantity and total of a single order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product: String,
    pub quantity: i32,
    pub total: MoneyCents,
}

/// Order lines keyed by owning user id.
pub type OrdersByUser = BTreeMap<i32, Vec<OrderLine>>;

/// Rows written by the fixture loader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureSummary {
    pub users: usize,
    pub orders: usize,
}
