//! Event registration (`op_que_events`/`op_cancel_events`) and the
//! asynchronous waiter that demultiplexes `op_event` frames from the
//! `op_dummy` keepalives and `op_exit`/`op_disconnect` end-of-stream
//! markers sharing the same auxiliary connection.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use fbwire_core::FbError;

use crate::consts::WireOp;
use crate::framing::BufMutWireExt;

/// One event name and the count of times it has fired, as registered with
/// the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventCount {
    pub name: String,
    pub count: u32,
}

/// Builds an `op_que_events` request, registering interest in the given
/// event names under `event_id` (an opaque token the caller picks and later
/// matches against `poll_event`'s result).
pub fn que_events(db_handle: u32, names: &[&str], event_id: u32) -> Bytes {
    let mut params = BytesMut::new();
    params.put_u8(1); // version

    for name in names {
        params.put_u8(name.len() as u8);
        params.put_slice(name.as_bytes());
        params.put_u32(0); // counter, server fills this in
    }

    let mut req = BytesMut::with_capacity(20 + params.len());
    req.put_u32(WireOp::QueEvents as u32);
    req.put_u32(db_handle);
    req.put_wire_bytes(&params);
    req.put_u32(0); // AST pointer, unused by this client
    req.put_u32(0); // AST argument, unused
    req.put_u32(event_id);

    req.freeze()
}

/// Builds an `op_cancel_events` request.
pub fn cancel_events(db_handle: u32, event_id: u32) -> Bytes {
    let mut req = BytesMut::with_capacity(12);
    req.put_u32(WireOp::CancelEvents as u32);
    req.put_u32(db_handle);
    req.put_u32(event_id);
    req.freeze()
}

/// Outcome of waiting for the next frame on the event channel.
pub enum EventFrame {
    /// An `op_event` frame: the registered counts as of this notification.
    Fired(Vec<EventCount>),
    /// The peer closed the auxiliary connection (`op_exit` or
    /// `op_disconnect`).
    Disconnected,
}

/// Parses an `op_event` body: `[db_handle: u32][event buffer][event_id: u32]`,
/// the event buffer being `[version: u8]` followed by repeated
/// `[name_len: u8][name][count: u32]` records, mirroring `op_que_events`'s
/// own wire shape.
pub fn parse_event(resp: &mut Bytes) -> Result<Vec<EventCount>, FbError> {
    use crate::framing::err_invalid_response;

    if resp.remaining() < 4 {
        return err_invalid_response();
    }
    resp.get_u32(); // db handle, echoed back

    let buf = {
        if resp.remaining() < 4 {
            return err_invalid_response();
        }
        let len = resp.get_u32() as usize;
        if resp.remaining() < len {
            return err_invalid_response();
        }
        let b = resp.slice(..len);
        resp.advance(len);
        b
    };

    if resp.remaining() < 4 {
        return err_invalid_response();
    }
    resp.get_u32(); // event_id, echoed back

    let mut buf = buf;
    if buf.remaining() < 1 {
        return Ok(vec![]);
    }
    buf.advance(1); // version

    let mut out = Vec::new();
    while buf.remaining() >= 1 {
        let len = buf.get_u8() as usize;
        if buf.remaining() < len + 4 {
            return err_invalid_response();
        }
        let name = String::from_utf8(buf[..len].to_vec())
            .map_err(|_| FbError::Internal("invalid utf-8 in event name".to_string()))?;
        buf.advance(len);
        let count = buf.get_u32();

        out.push(EventCount { name, count });
    }

    Ok(out)
}

/// Reads frames off the auxiliary event connection until one resolves to
/// `op_event` data or the peer hangs up.
///
/// `op_dummy` keepalives are skipped transparently; anything else that
/// isn't `op_event`/`op_exit`/`op_disconnect` is an internal protocol error.
pub fn read_event_frame(
    mut read_opcode: impl FnMut() -> Result<(u32, Bytes), FbError>,
) -> Result<EventFrame, FbError> {
    loop {
        let (op, mut body) = read_opcode()?;

        if op == WireOp::Dummy as u32 {
            continue;
        }
        if op == WireOp::Exit as u32 || op == WireOp::Disconnect as u32 {
            return Ok(EventFrame::Disconnected);
        }
        if op == WireOp::Event as u32 {
            return Ok(EventFrame::Fired(parse_event(&mut body)?));
        }

        return Err(FbError::Internal(format!(
            "unexpected opcode {} on event channel",
            op
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn parses_fired_event_counts() {
        let mut body = BytesMut::new();
        body.put_u32(7); // db handle
        let mut payload = BytesMut::new();
        payload.put_u8(1); // version
        payload.put_u8(4);
        payload.put_slice(b"TEST");
        payload.put_u32(7);
        body.put_wire_bytes(&payload);
        body.put_u32(42); // event id

        let counts = parse_event(&mut body.freeze()).unwrap();
        assert_eq!(
            counts,
            vec![EventCount {
                name: "TEST".to_string(),
                count: 7
            }]
        );
    }

    #[test]
    fn read_event_frame_skips_dummy_and_reports_disconnect() {
        let calls = Cell::new(0);
        let frames = [
            (WireOp::Dummy as u32, Bytes::new()),
            (WireOp::Disconnect as u32, Bytes::new()),
        ];

        let result = read_event_frame(|| {
            let i = calls.get();
            calls.set(i + 1);
            Ok(frames[i].clone())
        });

        assert!(matches!(result.unwrap(), EventFrame::Disconnected));
        assert_eq!(calls.get(), 2);
    }
}
