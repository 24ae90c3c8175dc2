//! Error taxonomy for the wire protocol engine.
//!
//! `ProgrammingError` / `IntegrityError` / `DataError` / `NotSupportedError` are part of the
//! taxonomy shared with the DB-API layer built on top of this crate; the wire engine itself
//! never constructs them, it only defines the variants so a caller can match on a stable set.

use std::io;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"@\d+").unwrap();
}

#[derive(Debug, thiserror::Error)]
pub enum FbError {
    /// A response carried a non-empty status vector: one or more gds codes, an optional
    /// sql code (populated when gds code 335544436, `isc_sqlerr`, appears) and the
    /// formatted message.
    #[error("{msg}")]
    Sql {
        code: i32,
        gds_codes: Vec<u32>,
        msg: String,
    },

    /// Underlying socket failure: short read, broken pipe, connection reset.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A `recv_exact` deadline elapsed before the requested byte count arrived.
    #[error("timed out waiting for the server response")]
    Timeout,

    /// The response opcode did not match what the issuer expected (and wasn't `op_response`).
    #[error("internal protocol error: {0}")]
    Internal(String),

    /// The event waiter observed `op_exit` or `op_disconnect`.
    #[error("disconnected by peer")]
    Disconnect,

    /// Reserved for the DB-API layer; never raised by this crate.
    #[error("{0}")]
    Programming(String),

    /// Reserved for the DB-API layer; never raised by this crate.
    #[error("{0}")]
    Integrity(String),

    /// Reserved for the DB-API layer; never raised by this crate.
    #[error("{0}")]
    Data(String),

    /// Reserved for the DB-API layer; never raised by this crate.
    #[error("{0}")]
    NotSupported(String),

    #[error("{0}")]
    Other(String),
}

impl From<String> for FbError {
    fn from(msg: String) -> Self {
        FbError::Other(msg)
    }
}

impl From<&str> for FbError {
    fn from(msg: &str) -> Self {
        FbError::Other(msg.to_string())
    }
}

/// Builds the final `Sql` error from a status vector parse, warning (debug-only) if the
/// message still carries unsubstituted `@N` placeholders - a sign a gds group received
/// fewer `isc_arg_number`/`isc_arg_string` arguments than its template expects.
pub fn err_sql(code: i32, gds_codes: Vec<u32>, mut msg: String) -> FbError {
    if msg.ends_with('\n') {
        msg.pop();
    }
    debug_assert!(
        !PLACEHOLDER.is_match(&msg),
        "status message still has unsubstituted placeholders: {}",
        msg
    );
    FbError::Sql {
        code,
        gds_codes,
        msg,
    }
}

pub fn err_column_null(type_name: &str) -> FbError {
    FbError::Data(format!(
        "this is a null value; use Option<{}> to safely access this column",
        type_name
    ))
}

pub fn err_type_conv<T>(from: &str, to: &str) -> Result<T, FbError> {
    Err(FbError::Data(format!("can't convert {} column to {}", from, to)))
}
