//! Hand-written SQL versions of the exercise reports.
//!
//! Nothing here goes through the entity definitions: statements are plain SQL
//! and rows are mapped with `FromQueryResult`, so a mismatch with the ORM
//! catalog points at a query bug on one side.

use sea_orm::{ConnectionTrait, DatabaseConnection, FromQueryResult, Statement, Value, prelude::*};

use crate::{
    Engine, MoneyCents, Order, OrderLine, OrderWithUserInfo, OrderWithUserName, OrdersByUser,
    ResultEngine, User,
};

use super::check_range;

const ORDERS_FOR_USER: &str = "SELECT id, product, quantity, total_minor, user_id, created_at, updated_at \
     FROM orders WHERE user_id = ? ORDER BY id";

const ORDERS_WITH_USER_INFO: &str = "SELECT orders.id, orders.product, orders.quantity, orders.total_minor, \
     orders.user_id, orders.created_at, orders.updated_at, \
     users.name AS user_name, users.email AS user_email \
     FROM orders INNER JOIN users ON orders.user_id = users.id \
     ORDER BY orders.id";

const ORDERS_IN_RANGE: &str = "SELECT id, product, quantity, total_minor, user_id, created_at, updated_at \
     FROM orders WHERE total_minor BETWEEN ? AND ? ORDER BY id";

const USERS_STARTING_WITH: &str = "SELECT id, name, email, phone, created_at, updated_at \
     FROM users WHERE instr(name, ?) = 1 ORDER BY id";

const ORDER_COUNT_FOR_USER: &str = "SELECT COUNT(*) AS count FROM orders WHERE user_id = ?";

const ORDERS_SORTED_BY_TOTAL_DESC: &str = "SELECT orders.id, orders.product, orders.quantity, orders.total_minor, \
     orders.user_id, orders.created_at, orders.updated_at, \
     users.name AS user_name, users.email AS user_email \
     FROM orders INNER JOIN users ON orders.user_id = users.id \
     ORDER BY orders.total_minor DESC, orders.id ASC";

const SUM_OF_ALL_TOTALS: &str = "SELECT COALESCE(SUM(total_minor), 0) AS total_minor FROM orders";

const CHEAPEST_ORDER: &str = "SELECT orders.id, orders.product, orders.quantity, orders.total_minor, \
     orders.user_id, orders.created_at, orders.updated_at, users.name AS user_name \
     FROM orders INNER JOIN users ON orders.user_id = users.id \
     ORDER BY orders.total_minor ASC, orders.id ASC LIMIT 1";

const ORDERS_GROUPED_BY_USER: &str = "SELECT users.id AS user_id, orders.product, orders.quantity, orders.total_minor \
     FROM orders INNER JOIN users ON orders.user_id = users.id \
     ORDER BY users.id, orders.id";

#[derive(FromQueryResult)]
struct OrderRow {
    id: i32,
    product: String,
    quantity: i32,
    total_minor: i64,
    user_id: i32,
    created_at: DateTimeUtc,
    updated_at: DateTimeUtc,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            product: row.product,
            quantity: row.quantity,
            total: MoneyCents::new(row.total_minor),
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromQueryResult)]
struct OrderUserRow {
    id: i32,
    product: String,
    quantity: i32,
    total_minor: i64,
    user_id: i32,
    created_at: DateTimeUtc,
    updated_at: DateTimeUtc,
    user_name: String,
    user_email: String,
}

impl From<OrderUserRow> for OrderWithUserInfo {
    fn from(row: OrderUserRow) -> Self {
        let order = OrderRow {
            id: row.id,
            product: row.product,
            quantity: row.quantity,
            total_minor: row.total_minor,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        };
        Self {
            order: order.into(),
            user_name: row.user_name,
            user_email: row.user_email,
        }
    }
}

#[derive(FromQueryResult)]
struct OrderUserNameRow {
    id: i32,
    product: String,
    quantity: i32,
    total_minor: i64,
    user_id: i32,
    created_at: DateTimeUtc,
    updated_at: DateTimeUtc,
    user_name: String,
}

impl From<OrderUserNameRow> for OrderWithUserName {
    fn from(row: OrderUserNameRow) -> Self {
        let order = OrderRow {
            id: row.id,
            product: row.product,
            quantity: row.quantity,
            total_minor: row.total_minor,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        };
        Self {
            order: order.into(),
            user_name: row.user_name,
        }
    }
}

#[derive(FromQueryResult)]
struct UserRow {
    id: i32,
    name: String,
    email: String,
    phone: Option<String>,
    created_at: DateTimeUtc,
    updated_at: DateTimeUtc,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromQueryResult)]
struct OrderLineRow {
    user_id: i32,
    product: String,
    quantity: i32,
    total_minor: i64,
}

#[derive(FromQueryResult)]
struct CountRow {
    count: i64,
}

#[derive(FromQueryResult)]
struct SumRow {
    total_minor: i64,
}

/// Raw SQL view over the engine's database, see [`Engine::raw_sql`].
pub struct RawSql<'a> {
    database: &'a DatabaseConnection,
}

impl Engine {
    /// Hand-written SQL implementation of the exercise reports.
    pub fn raw_sql(&self) -> RawSql<'_> {
        RawSql {
            database: &self.database,
        }
    }
}

impl RawSql<'_> {
    fn statement(&self, sql: &str, values: Vec<Value>) -> Statement {
        Statement::from_sql_and_values(self.database.get_database_backend(), sql, values)
    }

    pub async fn orders_for_user(&self, user_id: i32) -> ResultEngine<Vec<Order>> {
        let rows = OrderRow::find_by_statement(self.statement(ORDERS_FOR_USER, vec![user_id.into()]))
            .all(self.database)
            .await?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    pub async fn orders_with_user_info(&self) -> ResultEngine<Vec<OrderWithUserInfo>> {
        let rows = OrderUserRow::find_by_statement(self.statement(ORDERS_WITH_USER_INFO, vec![]))
            .all(self.database)
            .await?;
        Ok(rows.into_iter().map(OrderWithUserInfo::from).collect())
    }

    pub async fn orders_in_range(&self, lo: MoneyCents, hi: MoneyCents) -> ResultEngine<Vec<Order>> {
        check_range(lo, hi)?;
        let stmt = self.statement(ORDERS_IN_RANGE, vec![lo.cents().into(), hi.cents().into()]);
        let rows = OrderRow::find_by_statement(stmt).all(self.database).await?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    pub async fn users_starting_with(&self, prefix: &str) -> ResultEngine<Vec<User>> {
        let rows = UserRow::find_by_statement(self.statement(USERS_STARTING_WITH, vec![prefix.into()]))
            .all(self.database)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    pub async fn order_count_for_user(&self, user_id: i32) -> ResultEngine<u64> {
        let count = CountRow::find_by_statement(self.statement(ORDER_COUNT_FOR_USER, vec![user_id.into()]))
            .one(self.database)
            .await?
            .map_or(0, |row| row.count);
        Ok(u64::try_from(count).unwrap_or_default())
    }

    pub async fn orders_sorted_by_total_desc(&self) -> ResultEngine<Vec<OrderWithUserInfo>> {
        let rows = OrderUserRow::find_by_statement(self.statement(ORDERS_SORTED_BY_TOTAL_DESC, vec![]))
            .all(self.database)
            .await?;
        Ok(rows.into_iter().map(OrderWithUserInfo::from).collect())
    }

    pub async fn sum_of_all_totals(&self) -> ResultEngine<MoneyCents> {
        let total = SumRow::find_by_statement(self.statement(SUM_OF_ALL_TOTALS, vec![]))
            .one(self.database)
            .await?
            .map_or(0, |row| row.total_minor);
        Ok(MoneyCents::new(total))
    }

    pub async fn cheapest_order(&self) -> ResultEngine<Option<OrderWithUserName>> {
        let row = OrderUserNameRow::find_by_statement(self.statement(CHEAPEST_ORDER, vec![]))
            .one(self.database)
            .await?;
        Ok(row.map(OrderWithUserName::from))
    }

    pub async fn orders_grouped_by_user(&self) -> ResultEngine<OrdersByUser> {
        let rows = OrderLineRow::find_by_statement(self.statement(ORDERS_GROUPED_BY_USER, vec![]))
            .all(self.database)
            .await?;

        let mut grouped = OrdersByUser::new();
        for row in rows {
            grouped.entry(row.user_id).or_default().push(OrderLine {
                product: row.product,
                quantity: row.quantity,
                total: MoneyCents::new(row.total_minor),
            });
        }
        Ok(grouped)
    }
}
