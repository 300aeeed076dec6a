use axum::{
    Router,
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::get,
};

use std::{sync::Arc, time::Instant};

use crate::{exercises, reports};
use engine::Engine;

/// Shared handler context, built once at startup.
#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

impl ServerState {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

async fn trace_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::debug!(
        %method,
        path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request handled"
    );
    response
}

fn api_routes() -> Router<ServerState> {
    Router::new()
        .route("/usuarios-con-pedidos", get(reports::users_with_orders))
        .route("/pedidos-usuario/{id}", get(reports::orders_by_user))
        .route("/total-ventas-usuario", get(reports::sales_totals_by_user))
        .route("/productos-mas-vendidos", get(reports::top_products))
        .route("/buscar-usuarios", get(reports::search_users))
        .route("/estadisticas", get(reports::general_stats))
        .route("/punto2-pedidos-usuario-id2", get(exercises::orders_for_user))
        .route(
            "/punto3-pedidos-con-info-usuarios",
            get(exercises::orders_with_user_info),
        )
        .route("/punto4-pedidos-rango-100-250", get(exercises::orders_in_range))
        .route("/punto5-usuarios-con-r", get(exercises::users_starting_with))
        .route(
            "/punto6-total-pedidos-usuario-id5",
            get(exercises::order_count_for_user),
        )
        .route(
            "/punto7-pedidos-ordenados-por-total",
            get(exercises::orders_sorted_by_total_desc),
        )
        .route("/punto8-suma-total-pedidos", get(exercises::sum_of_all_totals))
        .route("/punto9-pedido-mas-economico", get(exercises::cheapest_order))
        .route(
            "/punto10-pedidos-agrupados-por-usuario",
            get(exercises::orders_grouped_by_user),
        )
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(middleware::from_fn(trace_request))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(ServerState::new(engine))).await
}
