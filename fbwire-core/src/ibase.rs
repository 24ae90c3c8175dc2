//! Hand-picked subset of the constants Firebird's `ibase.h` defines.
//!
//! The real header has thousands of entries generated from the server
//! sources; this keeps only what the wire engine actually references.
#![allow(non_camel_case_types, non_upper_case_globals, dead_code)]

/// Firebird's on-the-wire date: days since 17 Nov 1858 (the Julian/MJD epoch
/// Firebird inherited from InterBase), signed.
pub type ISC_DATE = i32;

/// Tenths of a microsecond since midnight.
pub type ISC_TIME = u32;

/// `ISC_TIME` ticks per second.
pub const ISC_TIME_SECONDS_PRECISION: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct ISC_TIMESTAMP {
    pub timestamp_date: ISC_DATE,
    pub timestamp_time: ISC_TIME,
}

// isc_dpb_* - database parameter block item tags
pub const isc_dpb_version1: u8 = 1;
pub const isc_dpb_user_name: u8 = 28;
pub const isc_dpb_password: u8 = 29;
pub const isc_dpb_password_enc: u8 = 30;
pub const isc_dpb_sql_dialect: u8 = 63;
pub const isc_dpb_lc_ctype: u8 = 48;
pub const isc_dpb_utf8_filename: u8 = 119;
pub const isc_dpb_auth_plugin_list: u8 = 128;

// isc_tpb_* - transaction parameter block item tags
pub const isc_tpb_version3: u8 = 3;
pub const isc_tpb_consistency: u8 = 1;
pub const isc_tpb_concurrency: u8 = 2;
pub const isc_tpb_shared: u8 = 3;
pub const isc_tpb_protected: u8 = 4;
pub const isc_tpb_exclusive: u8 = 5;
pub const isc_tpb_wait: u8 = 6;
pub const isc_tpb_nowait: u8 = 7;
pub const isc_tpb_read: u8 = 8;
pub const isc_tpb_write: u8 = 9;
pub const isc_tpb_read_committed: u8 = 15;

// isc_info_sql_* - DSQL info item tags
pub const isc_info_sql_select: u8 = 4;
pub const isc_info_sql_bind: u8 = 5;
pub const isc_info_sql_num_variables: u8 = 6;
pub const isc_info_sql_describe_vars: u8 = 7;
pub const isc_info_sql_describe_end: u8 = 8;
pub const isc_info_sql_sqlda_seq: u8 = 9;
pub const isc_info_sql_message_seq: u8 = 10;
pub const isc_info_sql_type: u8 = 11;
pub const isc_info_sql_sub_type: u8 = 12;
pub const isc_info_sql_scale: u8 = 13;
pub const isc_info_sql_length: u8 = 14;
pub const isc_info_sql_null_ind: u8 = 15;
pub const isc_info_sql_field: u8 = 16;
pub const isc_info_sql_relation: u8 = 17;
pub const isc_info_sql_owner: u8 = 18;
pub const isc_info_sql_alias: u8 = 19;
pub const isc_info_sql_sqlda_start: u8 = 20;
pub const isc_info_sql_stmt_type: u8 = 21;

// generic info-response item tags
pub const isc_info_end: u8 = 1;
pub const isc_info_truncated: u8 = 2;
pub const isc_info_error: u8 = 3;
pub const isc_info_data_not_ready: u8 = 4;

pub const isc_info_sql_stmt_select: u8 = 1;
pub const isc_info_sql_stmt_insert: u8 = 2;
pub const isc_info_sql_stmt_update: u8 = 3;
pub const isc_info_sql_stmt_delete: u8 = 4;
pub const isc_info_sql_stmt_ddl: u8 = 5;
pub const isc_info_sql_stmt_get_segment: u8 = 6;
pub const isc_info_sql_stmt_put_segment: u8 = 7;
pub const isc_info_sql_stmt_exec_procedure: u8 = 8;
pub const isc_info_sql_stmt_start_trans: u8 = 9;
pub const isc_info_sql_stmt_commit: u8 = 10;
pub const isc_info_sql_stmt_rollback: u8 = 11;
pub const isc_info_sql_stmt_select_for_upd: u8 = 12;
pub const isc_info_sql_stmt_set_generator: u8 = 13;

pub const DSQL_close: u8 = 1;
pub const DSQL_drop: u8 = 2;
pub const DSQL_unprepare: u8 = 4;

// isc_arg_* - status vector argument tags
pub const isc_arg_end: u32 = 0;
pub const isc_arg_gds: u32 = 1;
pub const isc_arg_string: u32 = 2;
pub const isc_arg_cstring: u32 = 3;
pub const isc_arg_number: u32 = 4;
pub const isc_arg_interpreted: u32 = 5;
pub const isc_arg_vms: u32 = 6;
pub const isc_arg_unix: u32 = 7;
pub const isc_arg_domain: u32 = 8;
pub const isc_arg_dos: u32 = 9;
pub const isc_arg_mpexl: u32 = 10;
pub const isc_arg_mpexl_ipc: u32 = 11;
pub const isc_arg_next_mach: u32 = 15;
pub const isc_arg_win32: u32 = 17;
pub const isc_arg_warning: u32 = 18;
pub const isc_arg_sql_state: u32 = 19;

pub const isc_sqlerr: u32 = 335544436;
pub const isc_no_priv: u32 = 335544344;

// sql type codes, as seen in the XSQLVAR `sqltype` field (always odd when nullable)
pub const SQL_TEXT: i16 = 452;
pub const SQL_VARYING: i16 = 448;
pub const SQL_SHORT: i16 = 500;
pub const SQL_LONG: i16 = 496;
pub const SQL_FLOAT: i16 = 482;
pub const SQL_DOUBLE: i16 = 480;
pub const SQL_D_FLOAT: i16 = 530;
pub const SQL_TIMESTAMP: i16 = 510;
pub const SQL_BLOB: i16 = 520;
pub const SQL_ARRAY: i16 = 540;
pub const SQL_QUAD: i16 = 550;
pub const SQL_TYPE_TIME: i16 = 560;
pub const SQL_TYPE_DATE: i16 = 570;
pub const SQL_INT64: i16 = 580;
pub const SQL_BOOLEAN: i16 = 32764;
pub const SQL_NULL: i16 = 32766;
