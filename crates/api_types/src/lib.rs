use serde::{Deserialize, Serialize};

pub mod envelope {
    use super::*;

    /// Body of every single-result report.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Envelope<T> {
        pub message: String,
        pub data: T,
    }

    impl<T> Envelope<T> {
        pub fn new(message: impl Into<String>, data: T) -> Self {
            Self {
                message: message.into(),
                data,
            }
        }
    }

    /// Body of the cross-checked reports.
    ///
    /// `eloquent` is computed through the ORM, `query_builder` through
    /// hand-written SQL. Both fields are expected to hold the same value.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct DualEnvelope<T> {
        pub message: String,
        pub eloquent: T,
        pub query_builder: T,
    }

    impl<T> DualEnvelope<T> {
        pub fn new(message: impl Into<String>, eloquent: T, query_builder: T) -> Self {
            Self {
                message: message.into(),
                eloquent,
                query_builder,
            }
        }
    }

    impl<T: PartialEq> DualEnvelope<T> {
        /// Returns `true` when both strategies produced the same result.
        pub fn is_consistent(&self) -> bool {
            self.eloquent == self.query_builder
        }
    }
}

pub mod search {
    use super::*;

    /// Query string of `/buscar-usuarios`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SearchUsers {
        /// Missing means empty, which matches every user.
        #[serde(default)]
        pub termino: String,
    }
}

pub mod error {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ErrorKind {
        StoreUnavailable,
        InvalidArgument,
    }

    /// Body returned with every non-2xx response.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ErrorBody {
        pub error: ErrorKind,
        pub detail: String,
    }
}
