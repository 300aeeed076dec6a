//! General reporting endpoints

use api_types::{envelope::Envelope, search::SearchUsers};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use engine::{GeneralStats, OrderWithUserName, ProductSales, UserSales, UserWithOrders};

use crate::{ServerError, server::ServerState};

type Report<T> = Result<Json<Envelope<T>>, ServerError>;

/// Handle requests for every user with its orders
pub async fn users_with_orders(State(state): State<ServerState>) -> Report<Vec<UserWithOrders>> {
    let data = state.engine.users_with_orders().await?;
    Ok(Json(Envelope::new("Usuarios con sus pedidos", data)))
}

/// Handle requests for the orders of one user.
///
/// The id is taken as text so a non-numeric segment is answered with an
/// `invalid_argument` body instead of axum's plain-text rejection.
pub async fn orders_by_user(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Report<Vec<OrderWithUserName>> {
    let data = match engine::parse_user_id(&id)? {
        Some(user_id) => state.engine.orders_by_user(user_id).await?,
        None => Vec::new(),
    };
    Ok(Json(Envelope::new(
        format!("Pedidos del usuario ID: {}", id.trim()),
        data,
    )))
}

pub async fn sales_totals_by_user(State(state): State<ServerState>) -> Report<Vec<UserSales>> {
    let data = state.engine.sales_totals_by_user().await?;
    Ok(Json(Envelope::new("Total de ventas por usuario", data)))
}

pub async fn top_products(State(state): State<ServerState>) -> Report<Vec<ProductSales>> {
    let data = state.engine.top_products().await?;
    Ok(Json(Envelope::new("Productos más vendidos", data)))
}

/// Handle `?termino=` searches over user name and email
pub async fn search_users(
    State(state): State<ServerState>,
    Query(params): Query<SearchUsers>,
) -> Report<Vec<UserWithOrders>> {
    let data = state.engine.search_users(&params.termino).await?;
    Ok(Json(Envelope::new(
        format!("Usuarios encontrados para: {}", params.termino),
        data,
    )))
}

pub async fn general_stats(State(state): State<ServerState>) -> Report<GeneralStats> {
    let data = state.engine.general_stats().await?;
    Ok(Json(Envelope::new("Estadísticas generales del sistema", data)))
}
