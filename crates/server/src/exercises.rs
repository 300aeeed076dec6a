//! Exercise endpoints.
//!
//! Each answer is computed twice, through the ORM catalog and through
//! [`engine::RawSql`], and both results are returned side by side.

use api_types::envelope::DualEnvelope;
use axum::{Json, extract::State};
use engine::{
    MoneyCents, Order, OrderWithUserInfo, OrderWithUserName, OrdersByUser, User,
};

use crate::{ServerError, server::ServerState};

const ORDERS_USER_ID: i32 = 2;
const COUNT_USER_ID: i32 = 5;
const RANGE_LO: MoneyCents = MoneyCents::from_units(100);
const RANGE_HI: MoneyCents = MoneyCents::from_units(250);
const NAME_PREFIX: &str = "R";

type CrossChecked<T> = Result<Json<DualEnvelope<T>>, ServerError>;

fn cross_checked<T: PartialEq>(message: &str, eloquent: T, query_builder: T) -> Json<DualEnvelope<T>> {
    let envelope = DualEnvelope::new(message, eloquent, query_builder);
    if !envelope.is_consistent() {
        tracing::warn!(report = message, "ORM and raw SQL results differ");
    }
    Json(envelope)
}

pub async fn orders_for_user(State(state): State<ServerState>) -> CrossChecked<Vec<Order>> {
    let eloquent = state.engine.orders_for_user(ORDERS_USER_ID).await?;
    let query_builder = state.engine.raw_sql().orders_for_user(ORDERS_USER_ID).await?;
    Ok(cross_checked(
        "Pedidos del usuario con ID 2",
        eloquent,
        query_builder,
    ))
}

pub async fn orders_with_user_info(
    State(state): State<ServerState>,
) -> CrossChecked<Vec<OrderWithUserInfo>> {
    let eloquent = state.engine.orders_with_user_info().await?;
    let query_builder = state.engine.raw_sql().orders_with_user_info().await?;
    Ok(cross_checked(
        "Información detallada de pedidos con datos de usuarios",
        eloquent,
        query_builder,
    ))
}

pub async fn orders_in_range(State(state): State<ServerState>) -> CrossChecked<Vec<Order>> {
    let eloquent = state.engine.orders_in_range(RANGE_LO, RANGE_HI).await?;
    let query_builder = state
        .engine
        .raw_sql()
        .orders_in_range(RANGE_LO, RANGE_HI)
        .await?;
    Ok(cross_checked(
        "Pedidos con total entre $100 y $250",
        eloquent,
        query_builder,
    ))
}

pub async fn users_starting_with(State(state): State<ServerState>) -> CrossChecked<Vec<User>> {
    let eloquent = state.engine.users_starting_with(NAME_PREFIX).await?;
    let query_builder = state.engine.raw_sql().users_starting_with(NAME_PREFIX).await?;
    Ok(cross_checked(
        "Usuarios cuyos nombres comienzan con \"R\"",
        eloquent,
        query_builder,
    ))
}

pub async fn order_count_for_user(State(state): State<ServerState>) -> CrossChecked<u64> {
    let eloquent = state.engine.order_count_for_user(COUNT_USER_ID).await?;
    let query_builder = state
        .engine
        .raw_sql()
        .order_count_for_user(COUNT_USER_ID)
        .await?;
    Ok(cross_checked(
        "Total de pedidos para usuario con ID 5",
        eloquent,
        query_builder,
    ))
}

pub async fn orders_sorted_by_total_desc(
    State(state): State<ServerState>,
) -> CrossChecked<Vec<OrderWithUserInfo>> {
    let eloquent = state.engine.orders_sorted_by_total_desc().await?;
    let query_builder = state.engine.raw_sql().orders_sorted_by_total_desc().await?;
    Ok(cross_checked(
        "Pedidos con información de usuarios ordenados por total (descendente)",
        eloquent,
        query_builder,
    ))
}

pub async fn sum_of_all_totals(State(state): State<ServerState>) -> CrossChecked<MoneyCents> {
    let eloquent = state.engine.sum_of_all_totals().await?;
    let query_builder = state.engine.raw_sql().sum_of_all_totals().await?;
    Ok(cross_checked(
        "Suma total del campo \"total\" en la tabla de pedidos",
        eloquent,
        query_builder,
    ))
}

pub async fn cheapest_order(
    State(state): State<ServerState>,
) -> CrossChecked<Option<OrderWithUserName>> {
    let eloquent = state.engine.cheapest_order().await?;
    let query_builder = state.engine.raw_sql().cheapest_order().await?;
    Ok(cross_checked(
        "Pedido más económico con nombre del usuario",
        eloquent,
        query_builder,
    ))
}

pub async fn orders_grouped_by_user(State(state): State<ServerState>) -> CrossChecked<OrdersByUser> {
    let eloquent = state.engine.orders_grouped_by_user().await?;
    let query_builder = state.engine.raw_sql().orders_grouped_by_user().await?;
    Ok(cross_checked(
        "Producto, cantidad y total de pedidos agrupados por usuario",
        eloquent,
        query_builder,
    ))
}
