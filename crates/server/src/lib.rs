use api_types::error::{ErrorBody, ErrorKind};
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use server::{ServerState, router, run_with_listener};

mod exercises;
mod reports;
mod server;

pub mod types {
    pub mod envelope {
        pub use api_types::envelope::{DualEnvelope, Envelope};
    }

    pub mod error {
        pub use api_types::error::{ErrorBody, ErrorKind};
    }

    pub mod report {
        pub use engine::{
            GeneralStats, Order, OrderWithUserInfo, OrderWithUserName, OrdersByUser,
            ProductSales, User, UserSales, UserWithOrders,
        };
    }
}

/// Error returned by every handler, rendered as an [`ErrorBody`].
#[derive(Debug)]
pub struct ServerError(EngineError);

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
    }
}

fn kind_for_engine_error(err: &EngineError) -> ErrorKind {
    match err {
        EngineError::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
        EngineError::InvalidArgument(_) => ErrorKind::InvalidArgument,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let err = self.0;
        if let EngineError::StoreUnavailable(db_err) = &err {
            tracing::error!("database error: {db_err}");
        }

        let body = ErrorBody {
            error: kind_for_engine_error(&err),
            detail: err.to_string(),
        };
        (status_for_engine_error(&err), Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self(value)
    }
}
