//! Deterministic demo rows.
//!
//! [`Engine::load_fixtures`] inserts [`USERS`] then [`ORDERS`] in a single
//! transaction. It is meant to run once against an empty store: nothing is
//! deduplicated, a second run inserts every row again.

use chrono::{SubsecRound, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, TransactionTrait};

use crate::{Engine, EngineError, FixtureSummary, ResultEngine, ops::with_tx, orders, users};

pub struct UserFixture {
    pub name: &'static str,
    pub email: &'static str,
    pub phone: Option<&'static str>,
}

pub struct OrderFixture {
    pub product: &'static str,
    pub quantity: i32,
    pub total_minor: i64,
    /// Position of the owner in [`USERS`].
    pub user: usize,
}

pub const USERS: [UserFixture; 5] = [
    UserFixture {
        name: "Juan Pérez",
        email: "juan@gmail.com",
        phone: Some("555-1234"),
    },
    UserFixture {
        name: "María García",
        email: "maria@gmail.com",
        phone: Some("555-5678"),
    },
    UserFixture {
        name: "Carlos López",
        email: "carlos@gmail.com",
        phone: Some("555-9012"),
    },
    UserFixture {
        name: "Ana Martínez",
        email: "ana@gmail.com",
        phone: Some("555-3456"),
    },
    UserFixture {
        name: "Roberto Fernández",
        email: "roberto@gmail.com",
        phone: Some("555-7890"),
    },
];

const fn order(product: &'static str, quantity: i32, total_minor: i64, user: usize) -> OrderFixture {
    OrderFixture {
        product,
        quantity,
        total_minor,
        user,
    }
}

pub const ORDERS: [OrderFixture; 12] = [
    order("Laptop Dell", 1, 120_000, 0),
    order("Mouse Logitech", 2, 5_000, 0),
    order("Teclado Mecánico", 1, 15_000, 1),
    order("Monitor Samsung", 1, 30_000, 1),
    order("Smartphone iPhone", 1, 99_900, 2),
    order("Auriculares Sony", 1, 20_000, 2),
    order("Tablet iPad", 1, 60_000, 3),
    order("Cargador USB-C", 3, 7_500, 3),
    order("Cámara Canon", 1, 80_000, 4),
    order("Memoria USB", 5, 10_000, 4),
    order("Laptop Dell", 1, 120_000, 1),
    order("Mouse Logitech", 1, 2_500, 2),
];

impl Engine {
    /// Insert the fixture rows and report how many were written.
    pub async fn load_fixtures(&self) -> ResultEngine<FixtureSummary> {
        let now = Utc::now().trunc_subsecs(0);

        let summary = with_tx!(self, |db_tx| {
            let mut user_ids = Vec::with_capacity(USERS.len());
            for fixture in &USERS {
                let user = users::ActiveModel {
                    id: ActiveValue::NotSet,
                    name: ActiveValue::Set(fixture.name.to_string()),
                    email: ActiveValue::Set(fixture.email.to_string()),
                    phone: ActiveValue::Set(fixture.phone.map(str::to_string)),
                    created_at: ActiveValue::Set(now),
                    updated_at: ActiveValue::Set(now),
                }
                .insert(&db_tx)
                .await?;
                user_ids.push(user.id);
            }

            for fixture in &ORDERS {
                let user_id = *user_ids.get(fixture.user).ok_or_else(|| {
                    EngineError::InvalidArgument(format!(
                        "order fixture \"{}\" references unknown user #{}",
                        fixture.product, fixture.user
                    ))
                })?;
                orders::ActiveModel {
                    id: ActiveValue::NotSet,
                    product: ActiveValue::Set(fixture.product.to_string()),
                    quantity: ActiveValue::Set(fixture.quantity),
                    total_minor: ActiveValue::Set(fixture.total_minor),
                    user_id: ActiveValue::Set(user_id),
                    created_at: ActiveValue::Set(now),
                    updated_at: ActiveValue::Set(now),
                }
                .insert(&db_tx)
                .await?;
            }

            Ok::<_, EngineError>(FixtureSummary {
                users: USERS.len(),
                orders: ORDERS.len(),
            })
        })?;

        tracing::info!(
            users = summary.users,
            orders = summary.orders,
            "fixtures loaded"
        );
        Ok(summary)
    }
}
