//! Parses the structural column/parameter description returned by
//! `op_prepare_statement`/`op_info_sql`: sql type, scale, subtype, length
//! and the field/relation/owner/alias name quartet. Mapping the resulting
//! `ColumnMeta` to a concrete Rust value is left to the caller.

#![allow(non_upper_case_globals)]

use bytes::{Buf, Bytes};
use std::convert::TryFrom;

use fbwire_core::{ibase, ColumnMeta, FbError, StmtType};

/// Info items requested from `op_prepare_statement`/`op_info_sql`: statement
/// type, parameter count, then one full column descriptor per select item.
pub const XSQLDA_DESCRIBE_VARS: [u8; 17] = [
    ibase::isc_info_sql_stmt_type,
    ibase::isc_info_sql_bind,
    ibase::isc_info_sql_describe_vars,
    ibase::isc_info_sql_describe_end,
    ibase::isc_info_sql_select,
    ibase::isc_info_sql_describe_vars,
    ibase::isc_info_sql_sqlda_seq,
    ibase::isc_info_sql_type,
    ibase::isc_info_sql_sub_type,
    ibase::isc_info_sql_scale,
    ibase::isc_info_sql_length,
    ibase::isc_info_sql_null_ind,
    ibase::isc_info_sql_field,
    ibase::isc_info_sql_relation,
    ibase::isc_info_sql_owner,
    ibase::isc_info_sql_alias,
    ibase::isc_info_sql_describe_end,
];

/// Data returned from a prepare statement request.
pub struct PrepareInfo {
    pub stmt_type: StmtType,
    pub param_count: usize,
    pub truncated: bool,
}

/// Parses the `isc_info_sql_stmt_type` / `isc_info_sql_bind` /
/// `isc_info_sql_select` sections of a prepare-statement response, filling
/// `xsqlda` with the select column descriptors.
pub fn parse_xsqlda(resp: &mut Bytes, xsqlda: &mut Vec<ColumnMeta>) -> Result<PrepareInfo, FbError> {
    if resp.remaining() < 7 || resp[..3] != [ibase::isc_info_sql_stmt_type, 0x04, 0x00] {
        return err_invalid_xsqlda();
    }
    resp.advance(3);

    let stmt_type = StmtType::from_byte(resp.get_u32_le() as u8)
        .ok_or_else(|| FbError::Internal("unknown statement type byte".to_string()))?;

    if resp.remaining() < 8 || resp[..2] != [ibase::isc_info_sql_bind, ibase::isc_info_sql_describe_vars] {
        return err_invalid_xsqlda();
    }
    resp.advance(2);
    resp.advance(2); // length prefix, always 0x04 0x00 for a 4-byte count
    let param_count = resp.get_u32_le() as usize;

    while resp.remaining() > 0 && resp[0] == ibase::isc_info_sql_describe_end {
        resp.advance(1);
    }

    if resp.remaining() < 8
        || resp[..2] != [ibase::isc_info_sql_select, ibase::isc_info_sql_describe_vars]
    {
        return err_invalid_xsqlda();
    }
    resp.advance(2);
    resp.advance(2);
    let col_len = resp.get_u32_le() as usize;
    if xsqlda.is_empty() {
        xsqlda.reserve(col_len);
    }

    let truncated = parse_select_items(resp, xsqlda)?;

    Ok(PrepareInfo {
        stmt_type,
        param_count,
        truncated,
    })
}

fn new_column_meta() -> ColumnMeta {
    ColumnMeta {
        sqltype: 0,
        sqlsubtype: 0,
        sqlscale: 0,
        sqllen: 0,
        null_ind: false,
        field_name: String::new(),
        relation_name: String::new(),
        owner_name: String::new(),
        alias_name: String::new(),
    }
}

/// Fills `xsqlda` with the select column descriptors found in `resp`.
/// Returns `true` if the server's answer was truncated (the buffer it was
/// given was too small), meaning `op_info_sql` must be issued to continue.
pub fn parse_select_items(resp: &mut Bytes, xsqlda: &mut Vec<ColumnMeta>) -> Result<bool, FbError> {
    if resp.remaining() == 0 {
        return Ok(false);
    }

    let mut col_index = 0usize;

    let truncated = loop {
        if resp.remaining() == 0 {
            return err_invalid_xsqlda();
        }

        match resp.get_u8() {
            t if t == ibase::isc_info_sql_sqlda_seq => {
                if resp.remaining() < 6 {
                    return err_invalid_xsqlda();
                }
                resp.advance(2);
                col_index = resp.get_u32_le() as usize - 1;

                if col_index >= xsqlda.len() {
                    xsqlda.push(new_column_meta());
                    debug_assert_eq!(xsqlda.len() - 1, col_index);
                }
            }

            t if t == ibase::isc_info_sql_type => {
                if resp.remaining() < 6 {
                    return err_invalid_xsqlda();
                }
                resp.advance(2);
                let v = resp.get_i32_le() as i16;
                col_mut(xsqlda, col_index)?.sqltype = v;
            }

            t if t == ibase::isc_info_sql_sub_type => {
                if resp.remaining() < 6 {
                    return err_invalid_xsqlda();
                }
                resp.advance(2);
                let v = resp.get_i32_le() as i16;
                col_mut(xsqlda, col_index)?.sqlsubtype = v;
            }

            t if t == ibase::isc_info_sql_scale => {
                if resp.remaining() < 6 {
                    return err_invalid_xsqlda();
                }
                resp.advance(2);
                let v = resp.get_i32_le() as i16;
                col_mut(xsqlda, col_index)?.sqlscale = v;
            }

            t if t == ibase::isc_info_sql_length => {
                if resp.remaining() < 6 {
                    return err_invalid_xsqlda();
                }
                resp.advance(2);
                let v = resp.get_i32_le() as i16;
                col_mut(xsqlda, col_index)?.sqllen = v;
            }

            t if t == ibase::isc_info_sql_null_ind => {
                if resp.remaining() < 6 {
                    return err_invalid_xsqlda();
                }
                resp.advance(2);
                let v = resp.get_i32_le() != 0;
                col_mut(xsqlda, col_index)?.null_ind = v;
            }

            t if t == ibase::isc_info_sql_field => {
                col_mut(xsqlda, col_index)?.field_name = read_name(resp)?;
            }

            t if t == ibase::isc_info_sql_relation => {
                col_mut(xsqlda, col_index)?.relation_name = read_name(resp)?;
            }

            t if t == ibase::isc_info_sql_owner => {
                col_mut(xsqlda, col_index)?.owner_name = read_name(resp)?;
            }

            t if t == ibase::isc_info_sql_alias => {
                col_mut(xsqlda, col_index)?.alias_name = read_name(resp)?;
            }

            t if t == ibase::isc_info_sql_describe_end => {}

            t if t == ibase::isc_info_truncated => break true,

            t if t == ibase::isc_info_end => break false,

            item => {
                return Err(FbError::Internal(format!(
                    "invalid item received in the xsqlda: {}",
                    item
                )));
            }
        }
    };

    Ok(truncated)
}

fn col_mut(xsqlda: &mut [ColumnMeta], idx: usize) -> Result<&mut ColumnMeta, FbError> {
    xsqlda.get_mut(idx).ok_or_else(|| {
        FbError::Internal("xsqlda column index out of range while parsing describe data".to_string())
    })
}

fn read_name(resp: &mut Bytes) -> Result<String, FbError> {
    if resp.remaining() < 2 {
        return err_invalid_xsqlda();
    }
    let len = resp.get_u16_le() as usize;
    if resp.remaining() < len {
        return err_invalid_xsqlda();
    }
    let mut buf = vec![0; len];
    resp.copy_to_slice(&mut buf);
    Ok(String::from_utf8(buf).unwrap_or_default())
}

fn err_invalid_xsqlda<T>() -> Result<T, FbError> {
    Err(FbError::Internal(
        "invalid xsqlda received from server".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};

    fn push_i32_item(buf: &mut BytesMut, tag: u8, v: i32) {
        buf.put_u8(tag);
        buf.put_u16_le(4);
        buf.put_i32_le(v);
    }

    fn push_name_item(buf: &mut BytesMut, tag: u8, name: &str) {
        buf.put_u8(tag);
        buf.put_u16_le(name.len() as u16);
        buf.put_slice(name.as_bytes());
    }

    #[test]
    fn parses_single_column_describe_block() {
        let mut buf = BytesMut::new();
        buf.put_u8(ibase::isc_info_sql_sqlda_seq);
        buf.put_u16_le(4);
        buf.put_u32_le(1);
        push_i32_item(&mut buf, ibase::isc_info_sql_type, 452); // text
        push_i32_item(&mut buf, ibase::isc_info_sql_sub_type, 0);
        push_i32_item(&mut buf, ibase::isc_info_sql_scale, 0);
        push_i32_item(&mut buf, ibase::isc_info_sql_length, 10);
        push_i32_item(&mut buf, ibase::isc_info_sql_null_ind, 0);
        push_name_item(&mut buf, ibase::isc_info_sql_field, "NAME");
        push_name_item(&mut buf, ibase::isc_info_sql_relation, "USERS");
        push_name_item(&mut buf, ibase::isc_info_sql_owner, "SYSDBA");
        push_name_item(&mut buf, ibase::isc_info_sql_alias, "NAME");
        buf.put_u8(ibase::isc_info_end);

        let mut xsqlda = Vec::new();
        let truncated = parse_select_items(&mut buf.freeze(), &mut xsqlda).unwrap();

        assert!(!truncated);
        assert_eq!(xsqlda.len(), 1);
        assert_eq!(xsqlda[0].sqltype, 452);
        assert_eq!(xsqlda[0].sqllen, 10);
        assert_eq!(xsqlda[0].field_name, "NAME");
        assert_eq!(xsqlda[0].relation_name, "USERS");
        assert_eq!(xsqlda[0].owner_name, "SYSDBA");
        assert_eq!(xsqlda[0].alias_name, "NAME");
    }

    #[test]
    fn reports_truncated_when_server_sends_truncated_marker() {
        let mut buf = BytesMut::new();
        buf.put_u8(ibase::isc_info_truncated);

        let mut xsqlda = Vec::new();
        let truncated = parse_select_items(&mut buf.freeze(), &mut xsqlda).unwrap();
        assert!(truncated);
    }

    #[test]
    fn unknown_item_tag_is_rejected() {
        let mut buf = BytesMut::new();
        buf.put_u8(0xfe);

        let mut xsqlda = Vec::new();
        assert!(parse_select_items(&mut buf.freeze(), &mut xsqlda).is_err());
    }
}
