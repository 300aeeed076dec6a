use crate::{EngineError, MoneyCents, ResultEngine};

mod catalog;
mod raw_sql;

pub use raw_sql::RawSql;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Both bounds are inclusive, so `lo == hi` is a valid single-value range.
fn check_range(lo: MoneyCents, hi: MoneyCents) -> ResultEngine<()> {
    if lo > hi {
        return Err(EngineError::InvalidArgument(format!(
            "invalid range: {lo} must be <= {hi}"
        )));
    }
    Ok(())
}
