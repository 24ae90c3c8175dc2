//! Pure Rust implementation of the Firebird wire protocol: connection
//! negotiation (Srp/Srp256/Legacy_Auth, Arc4 wire encryption), database and
//! service attachment, transaction control, prepared statements, row
//! fetching, blob I/O and event notification.

mod arc4;
mod blr;
mod consts;
mod events;
mod framing;
mod legacy_auth;
mod session;
mod srp;
mod wire;
mod xsqlda;

pub use events::{EventCount, EventFrame};
pub use session::{BlobHandle, BlobId, Connection, ColumnMeta, DbHandle, StmtHandle, SvcHandle, TrHandle};

pub use fbwire_core::{
    Charset, Column, ColumnDescriptor, Dialect, FbError, FixedPoint, FreeStmtOp, Param,
    StmtType, ToParam, TrIsolationLevel, TrOp,
};

pub use consts::ProtocolVersion;

#[cfg(feature = "fuzz_testing")]
pub use self::{blr::*, wire::*, xsqlda::*};
