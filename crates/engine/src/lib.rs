//! Read-only reporting over the `users` and `orders` tables.
//!
//! [`Engine`] owns the database connection and exposes the query catalog as
//! async methods. The exercise reports are also available through
//! [`Engine::raw_sql`], an independent hand-written SQL implementation used to
//! cross-check the ORM results.

use sea_orm::DatabaseConnection;

pub use error::EngineError;
pub use money::MoneyCents;
pub use ops::RawSql;
pub use records::{
    ActiveUser, FixtureSummary, GeneralStats, Order, OrderLine, OrderWithUserInfo,
    OrderWithUserName, OrdersByUser, ProductSales, User, UserSales, UserWithOrders,
};

pub mod fixtures;

mod error;
mod money;
mod ops;
mod orders;
mod records;
mod users;

type ResultEngine<T> = Result<T, EngineError>;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// Parses a user id coming from a path segment or the command line.
///
/// Only the numeric shape is checked: an id with no matching user is valid
/// and simply yields empty reports. A numeric id outside the `i32` range can
/// never match a row and is returned as `None`.
pub fn parse_user_id(raw: &str) -> ResultEngine<Option<i32>> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix(['-', '+']).unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EngineError::InvalidArgument(format!(
            "user id must be numeric, got \"{raw}\""
        )));
    }
    Ok(trimmed.parse().ok())
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`, failing with [`EngineError::StoreUnavailable`] when
    /// the database does not answer.
    pub async fn build(self) -> ResultEngine<Engine> {
        self.database.ping().await?;
        tracing::debug!("database reachable, engine ready");

        Ok(Engine {
            database: self.database,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_user_id_accepts_digits() {
        assert_eq!(parse_user_id("2"), Ok(Some(2)));
        assert_eq!(parse_user_id(" 42 "), Ok(Some(42)));
        assert_eq!(parse_user_id("-1"), Ok(Some(-1)));
    }

    #[test]
    fn parse_user_id_out_of_range_is_not_an_error() {
        assert_eq!(parse_user_id("99999999999"), Ok(None));
        assert_eq!(parse_user_id("-99999999999999999999999"), Ok(None));
    }

    #[test]
    fn parse_user_id_rejects_non_numeric() {
        let err = parse_user_id("abc").unwrap_err();
        assert_eq!(err.kind(), "invalid_argument");
        assert!(parse_user_id("").is_err());
        assert!(parse_user_id("2.5").is_err());
        assert!(parse_user_id("-").is_err());
        assert!(parse_user_id("1e3").is_err());
    }

    #[tokio::test]
    async fn build_without_database_is_store_unavailable() {
        let err = Engine::builder().build().await.unwrap_err();
        assert_eq!(err.kind(), "store_unavailable");
    }
}
