//! XDR-ish framing helpers: every variable-length field on the wire is a
//! big-endian u32 length followed by the bytes, padded with zeros up to the
//! next 4-byte boundary.

use bytes::{Buf, BufMut, Bytes};

use fbwire_core::FbError;

use crate::consts::WireOp;

pub trait BufMutWireExt: BufMut {
    /// Writes a u32 length, the bytes, then pads to a 4-byte boundary.
    fn put_wire_bytes(&mut self, bytes: &[u8])
    where
        Self: Sized,
    {
        let len = bytes.len();

        self.put_u32(len as u32);
        self.put(bytes);
        if len % 4 != 0 {
            self.put_slice(&[0; 4][..4 - (len % 4)]);
        }
    }
}

impl<T> BufMutWireExt for T where T: BufMut {}

pub trait BytesWireExt {
    /// Reads a u32 length, the bytes, then skips the alignment padding.
    fn get_wire_bytes(&mut self) -> Result<Bytes, FbError>;
}

impl BytesWireExt for Bytes {
    fn get_wire_bytes(&mut self) -> Result<Bytes, FbError> {
        if self.remaining() < 4 {
            return err_invalid_response();
        }
        let len = self.get_u32() as usize;

        if self.remaining() < len {
            return err_invalid_response();
        }
        let bytes = self.slice(..len);
        self.advance(len);

        if len % 4 != 0 {
            let pad = 4 - (len % 4);
            if self.remaining() < pad {
                return err_invalid_response();
            }
            self.advance(pad);
        }

        Ok(bytes)
    }
}

pub fn err_invalid_response<T>() -> Result<T, FbError> {
    Err(FbError::Internal(
        "invalid server response, missing bytes".to_string(),
    ))
}

pub fn err_conn_rejected<T>(op_code: u32) -> Result<T, FbError> {
    Err(FbError::Internal(format!(
        "connection rejected with code {}{}",
        op_code,
        WireOp::try_from(op_code as u8)
            .map(|op| format!(" ({:?})", op))
            .unwrap_or_default()
    )))
}
