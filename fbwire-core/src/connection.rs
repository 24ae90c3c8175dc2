//! Session-level enums: sql dialect, transaction options, statement
//! lifecycle tags. These carry no behavior of their own, they just name the
//! values the wire layer packs into DPB/TPB buffers and opcodes.

use crate::ibase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Dialect {
    D1 = 1,
    D2 = 2,
    D3 = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TrIsolationLevel {
    Concurrency = ibase::isc_tpb_concurrency,
    Consistency = ibase::isc_tpb_consistency,
    ReadCommitted = ibase::isc_tpb_read_committed,
}

impl Default for TrIsolationLevel {
    fn default() -> Self {
        Self::ReadCommitted
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrOp {
    Commit,
    CommitRetaining,
    Rollback,
    RollbackRetaining,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FreeStmtOp {
    Close = ibase::DSQL_close,
    Drop = ibase::DSQL_drop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StmtType {
    Select = ibase::isc_info_sql_stmt_select,
    Insert = ibase::isc_info_sql_stmt_insert,
    Update = ibase::isc_info_sql_stmt_update,
    Delete = ibase::isc_info_sql_stmt_delete,
    Ddl = ibase::isc_info_sql_stmt_ddl,
    ExecProcedure = ibase::isc_info_sql_stmt_exec_procedure,
    StartTrans = ibase::isc_info_sql_stmt_start_trans,
    Commit = ibase::isc_info_sql_stmt_commit,
    SqlRollback = ibase::isc_info_sql_stmt_rollback,
    SelectForUpdate = ibase::isc_info_sql_stmt_select_for_upd,
    SetGenerator = ibase::isc_info_sql_stmt_set_generator,
    GetSegment = ibase::isc_info_sql_stmt_get_segment,
    PutSegment = ibase::isc_info_sql_stmt_put_segment,
}

impl StmtType {
    /// Builds a `StmtType` from the byte reported by `isc_info_sql_stmt_type`.
    pub fn from_byte(b: u8) -> Option<Self> {
        use StmtType::*;
        Some(match b {
            x if x == Select as u8 => Select,
            x if x == Insert as u8 => Insert,
            x if x == Update as u8 => Update,
            x if x == Delete as u8 => Delete,
            x if x == Ddl as u8 => Ddl,
            x if x == ExecProcedure as u8 => ExecProcedure,
            x if x == StartTrans as u8 => StartTrans,
            x if x == Commit as u8 => Commit,
            x if x == SqlRollback as u8 => SqlRollback,
            x if x == SelectForUpdate as u8 => SelectForUpdate,
            x if x == SetGenerator as u8 => SetGenerator,
            x if x == GetSegment as u8 => GetSegment,
            x if x == PutSegment as u8 => PutSegment,
            _ => return None,
        })
    }
}
