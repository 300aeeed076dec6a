//! Canonical query catalog, expressed with the sea-orm entity API.

use sea_orm::{
    Condition, FromQueryResult, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, prelude::*, sea_query::Expr,
};

use crate::{
    ActiveUser, Engine, GeneralStats, MoneyCents, Order, OrderLine, OrderWithUserInfo,
    OrderWithUserName, OrdersByUser, ProductSales, ResultEngine, User, UserSales,
    UserWithOrders, orders, users,
};

use super::check_range;

// `instr` and `substr` compare bytes, unlike SQLite's ASCII case-folding
// `LIKE`, and do not give `%`/`_` any special meaning.
const NAME_CONTAINS: &str = r#"instr("users"."name", ?) > 0"#;
const EMAIL_CONTAINS: &str = r#"instr("users"."email", ?) > 0"#;
const NAME_STARTS_WITH: &str = r#"substr("users"."name", 1, length(?)) = ?"#;

#[derive(FromQueryResult)]
struct UserSalesRow {
    id: i32,
    name: String,
    total_sales_minor: i64,
    order_count: i64,
}

#[derive(FromQueryResult)]
struct ProductSalesRow {
    product: String,
    total_quantity: i64,
    total_sales_minor: i64,
    order_count: i64,
}

#[derive(FromQueryResult)]
struct TotalRow {
    total_minor: Option<i64>,
}

fn with_orders(rows: Vec<(users::Model, Vec<orders::Model>)>) -> Vec<UserWithOrders> {
    rows.into_iter()
        .map(|(user, user_orders)| UserWithOrders {
            user: user.into(),
            orders: user_orders.into_iter().map(Order::from).collect(),
        })
        .collect()
}

fn with_user_info(rows: Vec<(orders::Model, Option<users::Model>)>) -> Vec<OrderWithUserInfo> {
    rows.into_iter()
        .filter_map(|(order, user)| {
            let user = user?;
            Some(OrderWithUserInfo {
                order: order.into(),
                user_name: user.name,
                user_email: user.email,
            })
        })
        .collect()
}

impl Engine {
    /// Every user with its orders. Users without orders carry an empty list.
    pub async fn users_with_orders(&self) -> ResultEngine<Vec<UserWithOrders>> {
        let rows = users::Entity::find()
            .find_with_related(orders::Entity)
            .order_by_asc(users::Column::Id)
            .order_by_asc(orders::Column::Id)
            .all(&self.database)
            .await?;
        Ok(with_orders(rows))
    }

    /// Orders of `user_id` with the owner's name. Unknown users yield an empty
    /// list.
    pub async fn orders_by_user(&self, user_id: i32) -> ResultEngine<Vec<OrderWithUserName>> {
        let rows = orders::Entity::find()
            .find_also_related(users::Entity)
            .filter(orders::Column::UserId.eq(user_id))
            .order_by_asc(orders::Column::Id)
            .all(&self.database)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(order, user)| {
                Some(OrderWithUserName {
                    order: order.into(),
                    user_name: user?.name,
                })
            })
            .collect())
    }

    /// Sales per user, biggest spender first. Users without orders are left
    /// out.
    pub async fn sales_totals_by_user(&self) -> ResultEngine<Vec<UserSales>> {
        let rows = users::Entity::find()
            .select_only()
            .column(users::Column::Id)
            .column(users::Column::Name)
            .column_as(orders::Column::TotalMinor.sum(), "total_sales_minor")
            .column_as(orders::Column::Id.count(), "order_count")
            .join(JoinType::InnerJoin, users::Relation::Orders.def())
            .group_by(users::Column::Id)
            .group_by(users::Column::Name)
            .order_by_desc(Expr::cust("total_sales_minor"))
            .order_by_asc(users::Column::Id)
            .into_model::<UserSalesRow>()
            .all(&self.database)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| UserSales {
                id: row.id,
                name: row.name,
                total_sales: MoneyCents::new(row.total_sales_minor),
                order_count: row.order_count,
            })
            .collect())
    }

    /// Products by units sold, ties in order of first appearance.
    pub async fn top_products(&self) -> ResultEngine<Vec<ProductSales>> {
        let rows = orders::Entity::find()
            .select_only()
            .column(orders::Column::Product)
            .column_as(orders::Column::Quantity.sum(), "total_quantity")
            .column_as(orders::Column::TotalMinor.sum(), "total_sales_minor")
            .column_as(orders::Column::Id.count(), "order_count")
            .group_by(orders::Column::Product)
            .order_by_desc(Expr::cust("total_quantity"))
            .order_by_asc(orders::Column::Id.min())
            .into_model::<ProductSalesRow>()
            .all(&self.database)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| ProductSales {
                product: row.product,
                total_quantity: row.total_quantity,
                total_sales: MoneyCents::new(row.total_sales_minor),
                order_count: row.order_count,
            })
            .collect())
    }

    /// Users whose name or email contains `term` (case-sensitive), with their
    /// orders. An empty term matches everybody.
    pub async fn search_users(&self, term: &str) -> ResultEngine<Vec<UserWithOrders>> {
        let rows = users::Entity::find()
            .find_with_related(orders::Entity)
            .filter(
                Condition::any()
                    .add(Expr::cust_with_values(NAME_CONTAINS, [term]))
                    .add(Expr::cust_with_values(EMAIL_CONTAINS, [term])),
            )
            .order_by_asc(users::Column::Id)
            .order_by_asc(orders::Column::Id)
            .all(&self.database)
            .await?;
        Ok(with_orders(rows))
    }

    /// Number of rows in `users`.
    pub async fn user_count(&self) -> ResultEngine<u64> {
        Ok(users::Entity::find().count(&self.database).await?)
    }

    pub async fn general_stats(&self) -> ResultEngine<GeneralStats> {
        let user_count = self.user_count().await?;
        let order_count = orders::Entity::find().count(&self.database).await?;
        let total_sales = self.sum_of_all_totals().await?;

        let most_active_user = users::Entity::find()
            .select_only()
            .column(users::Column::Id)
            .column(users::Column::Name)
            .column_as(orders::Column::Id.count(), "order_count")
            .join(JoinType::InnerJoin, users::Relation::Orders.def())
            .group_by(users::Column::Id)
            .group_by(users::Column::Name)
            .order_by_desc(Expr::cust("order_count"))
            .order_by_asc(users::Column::Id)
            .into_model::<ActiveUser>()
            .one(&self.database)
            .await?;

        Ok(GeneralStats {
            user_count,
            order_count,
            total_sales,
            average_sale: total_sales.average(order_count),
            most_active_user,
        })
    }

    pub async fn orders_for_user(&self, user_id: i32) -> ResultEngine<Vec<Order>> {
        let rows = orders::Entity::find()
            .filter(orders::Column::UserId.eq(user_id))
            .order_by_asc(orders::Column::Id)
            .all(&self.database)
            .await?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    pub async fn orders_with_user_info(&self) -> ResultEngine<Vec<OrderWithUserInfo>> {
        let rows = orders::Entity::find()
            .find_also_related(users::Entity)
            .order_by_asc(orders::Column::Id)
            .all(&self.database)
            .await?;
        Ok(with_user_info(rows))
    }

    /// Orders with `lo <= total <= hi`.
    pub async fn orders_in_range(&self, lo: MoneyCents, hi: MoneyCents) -> ResultEngine<Vec<Order>> {
        check_range(lo, hi)?;
        let rows = orders::Entity::find()
            .filter(orders::Column::TotalMinor.between(lo.cents(), hi.cents()))
            .order_by_asc(orders::Column::Id)
            .all(&self.database)
            .await?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    /// Users whose name starts with `prefix` (case-sensitive).
    pub async fn users_starting_with(&self, prefix: &str) -> ResultEngine<Vec<User>> {
        let rows = users::Entity::find()
            .filter(Expr::cust_with_values(NAME_STARTS_WITH, [prefix, prefix]))
            .order_by_asc(users::Column::Id)
            .all(&self.database)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    pub async fn order_count_for_user(&self, user_id: i32) -> ResultEngine<u64> {
        Ok(orders::Entity::find()
            .filter(orders::Column::UserId.eq(user_id))
            .count(&self.database)
            .await?)
    }

    /// Every order with its owner, most expensive first. Equal totals keep
    /// insertion order.
    pub async fn orders_sorted_by_total_desc(&self) -> ResultEngine<Vec<OrderWithUserInfo>> {
        let rows = orders::Entity::find()
            .find_also_related(users::Entity)
            .order_by_desc(orders::Column::TotalMinor)
            .order_by_asc(orders::Column::Id)
            .all(&self.database)
            .await?;
        Ok(with_user_info(rows))
    }

    pub async fn sum_of_all_totals(&self) -> ResultEngine<MoneyCents> {
        let total = orders::Entity::find()
            .select_only()
            .column_as(orders::Column::TotalMinor.sum(), "total_minor")
            .into_model::<TotalRow>()
            .one(&self.database)
            .await?
            .and_then(|row| row.total_minor)
            .unwrap_or_default();
        Ok(MoneyCents::new(total))
    }

    /// The order with the lowest total (lowest id on ties), `None` when there
    /// are no orders.
    pub async fn cheapest_order(&self) -> ResultEngine<Option<OrderWithUserName>> {
        let row = orders::Entity::find()
            .find_also_related(users::Entity)
            .order_by_asc(orders::Column::TotalMinor)
            .order_by_asc(orders::Column::Id)
            .one(&self.database)
            .await?;

        Ok(row.and_then(|(order, user)| {
            Some(OrderWithUserName {
                order: order.into(),
                user_name: user?.name,
            })
        }))
    }

    /// Order lines per user id, in insertion order. Users without orders have
    /// no entry.
    pub async fn orders_grouped_by_user(&self) -> ResultEngine<OrdersByUser> {
        let rows = users::Entity::find()
            .find_with_related(orders::Entity)
            .order_by_asc(users::Column::Id)
            .order_by_asc(orders::Column::Id)
            .all(&self.database)
            .await?;

        Ok(rows
            .into_iter()
            .filter(|(_, user_orders)| !user_orders.is_empty())
            .map(|(user, user_orders)| {
                let lines = user_orders
                    .into_iter()
                    .map(|order| OrderLine {
                        product: order.product,
                        quantity: order.quantity,
                        total: MoneyCents::new(order.total_minor),
                    })
                    .collect();
                (user.id, lines)
            })
            .collect())
    }
}
