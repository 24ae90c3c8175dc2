//! Result column representation.
//!
//! Decoding a wire row happens in two layers: the structural layer (this
//! module) walks the XSQLDA entries to learn each column's size and how to
//! slice it out of the row buffer; mapping the resulting bytes to a concrete
//! Rust type (is this SQL_TEXT a String? a fixed charset? a BLOB id to
//! follow up on?) is left to the caller via the `ColumnDescriptor` trait -
//! this crate ships only the generic plumbing, not a type-coercion table.

use crate::ibase;

/// One column's wire-level shape, as reported by `isc_info_sql_describe_vars`
/// or an XSQLDA returned from `op_prepare_statement`/`op_info_sql`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    pub sqltype: i16,
    pub sqlsubtype: i16,
    pub sqlscale: i16,
    pub sqllen: i16,
    pub null_ind: bool,
    pub field_name: String,
    pub relation_name: String,
    pub owner_name: String,
    pub alias_name: String,
}

impl ColumnMeta {
    /// True for the family of types carried as a quad (blob / array ids).
    pub fn is_quad(&self) -> bool {
        let t = self.sqltype & !1;
        t == ibase::SQL_BLOB || t == ibase::SQL_ARRAY
    }
}

/// Maps a column's wire bytes into the caller's own value representation.
/// `fbwire` walks the row buffer calling `io_length` to learn how many
/// bytes to slice off for each column and `decode` to turn the slice (plus
/// the accompanying null flag) into a value; it never inspects `sqltype`
/// itself beyond that.
pub trait ColumnDescriptor {
    type Value;

    /// Number of bytes this column occupies in a fetched row, not counting
    /// the 4-byte null indicator that always follows it.
    fn io_length(&self) -> usize;

    fn decode(&self, raw: &[u8], is_null: bool) -> Self::Value;
}

/// A single decoded column value, generic over the caller's value type.
#[derive(Debug, Clone)]
pub struct Column<V> {
    pub name: String,
    pub value: Option<V>,
}

impl<V> Column<V> {
    pub fn new(name: String, value: Option<V>) -> Self {
        Self { name, value }
    }
}
