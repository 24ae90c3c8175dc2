//! Converts sql parameters into their BLR (binary language representation)
//! type description plus the matching value buffer, the format `op_execute`
//! sends alongside a prepared statement handle.

use bytes::{BufMut, Bytes, BytesMut};

use fbwire_core::{FbError, Param};

use crate::consts::blr;

/// Parameters longer than this are spilled into a BLOB rather than inlined.
pub const MAX_CHAR_LENGTH: usize = 32_767;

/// Chunk size used when streaming a spilled parameter into blob segments.
pub const BLOB_SEGMENT_SIZE: usize = 32_000;

/// Blr type description plus the value buffer for a parameter list.
pub struct ParamsBlr {
    pub blr: Bytes,
    pub values: Bytes,
}

/// Builds the blr + values pair for `op_execute`/`op_execute2`.
///
/// `create_blob` is called for any text/binary parameter longer than
/// [`MAX_CHAR_LENGTH`]; it must create a blob, stream the bytes into it in
/// [`BLOB_SEGMENT_SIZE`] chunks, close it and return its quad id.
pub fn params_to_blr(
    params: &[Param],
    mut create_blob: impl FnMut(&[u8]) -> Result<u64, FbError>,
) -> Result<ParamsBlr, FbError> {
    let mut b = BytesMut::with_capacity(256);
    let mut values = BytesMut::with_capacity(256);

    let msg_len = params.len() * 2;
    b.put_slice(&[blr::VERSION5, blr::BEGIN, blr::MESSAGE, 0]);
    b.put_u16_le(msg_len as u16);

    for p in params {
        let is_null = matches!(p, Param::Null);

        match p {
            Param::Text(s) => encode_bytes(&mut b, &mut values, s.as_bytes(), &mut create_blob)?,
            Param::Binary(bytes) => encode_bytes(&mut b, &mut values, bytes, &mut create_blob)?,

            Param::Integer(i) => {
                b.put_slice(&[blr::INT64, 0]);
                values.put_i64(*i);
            }

            Param::Floating(f) => {
                b.put_u8(blr::DOUBLE);
                values.put_f64(*f);
            }

            Param::Fixed(fp) => {
                b.put_slice(&[blr::INT64, fp.scale as u8]);
                values.put_i64(fp.value);
            }

            Param::Boolean(v) => {
                b.put_u8(blr::BOOL);
                values.put_u32(if *v { 1 } else { 0 });
            }

            Param::Date(d) => {
                b.put_u8(blr::SQL_DATE);
                values.put_i32(*d);
            }

            Param::Time(t) => {
                b.put_u8(blr::SQL_TIME);
                values.put_u32(*t);
            }

            Param::Timestamp(ts) => {
                b.put_u8(blr::TIMESTAMP);
                values.put_i32(ts.timestamp_date);
                values.put_u32(ts.timestamp_time);
            }

            Param::Null => {
                // Represented as an empty text value; the null indicator below is
                // what actually marks it absent.
                b.put_slice(&[blr::TEXT, 0, 0]);
            }
        }

        // Null indicator type + value, always inline (no protocol-13 bitmap).
        b.put_slice(&[blr::SHORT, 0]);
        values.put_i32(if is_null { -1 } else { 0 });
    }

    b.put_slice(&[blr::END, blr::EOC]);

    Ok(ParamsBlr {
        blr: b.freeze(),
        values: values.freeze(),
    })
}

fn encode_bytes(
    b: &mut BytesMut,
    values: &mut BytesMut,
    data: &[u8],
    create_blob: &mut impl FnMut(&[u8]) -> Result<u64, FbError>,
) -> Result<(), FbError> {
    if data.len() > MAX_CHAR_LENGTH {
        let blob_id = create_blob(data)?;
        b.put_slice(&[blr::BLOB, 0]);
        values.put_u64(blob_id);
    } else {
        let nbytes = data.len();
        b.put_u8(blr::TEXT);
        b.put_u16_le(nbytes as u16);

        values.put_slice(data);
        if nbytes % 4 != 0 {
            values.put_slice(&[0; 4][..4 - (nbytes % 4)]);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_param_encodes_as_blr_int64() {
        let res = params_to_blr(&[Param::Integer(42)], |_| unreachable!()).unwrap();
        assert_eq!(&res.blr[4..6], &[blr::INT64, 0]);
        assert_eq!(&res.values[..8], &42i64.to_be_bytes());
    }

    #[test]
    fn null_param_sets_inline_indicator() {
        let res = params_to_blr(&[Param::Null], |_| unreachable!()).unwrap();
        // indicator is the last 4 bytes of the values buffer for a single param
        assert_eq!(&res.values[res.values.len() - 4..], &(-1i32).to_be_bytes());
    }

    #[test]
    fn oversized_text_spills_to_a_blob() {
        let big = "x".repeat(MAX_CHAR_LENGTH + 1);
        let res = params_to_blr(&[Param::Text(big)], |_| Ok(7)).unwrap();
        assert_eq!(&res.blr[4..6], &[blr::BLOB, 0]);
        assert_eq!(&res.values[..8], &7u64.to_be_bytes());
    }
}
