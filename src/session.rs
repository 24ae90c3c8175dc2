//! Ties the framing, auth and request/response layers together into a
//! single connection object: handshake, database/service attachment,
//! transaction control, statement lifecycle, row fetching, blob I/O and
//! event notification.

use std::{
    collections::HashMap,
    env,
    io::{Read, Write},
    net::TcpStream,
};

use bytes::{Buf, BufMut, Bytes, BytesMut};
use digest::Digest;

use fbwire_core::{ibase, Charset, ColumnDescriptor, Dialect, FbError, FreeStmtOp, Param, StmtType, TrIsolationLevel, TrOp};

use crate::arc4::Arc4Stream;
use crate::blr;
use crate::consts::{AuthPluginType, ProtocolVersion, WireOp};
use crate::events::{self, EventCount, EventFrame};
use crate::framing::{err_conn_rejected, err_invalid_response};
use crate::srp::{srp_private_key, SrpClient, SRP_GROUP};
use crate::wire::{self, AuthPlugin, ConnectionResponse, Response, SrpAuthData};
use crate::xsqlda::{self, PrepareInfo};

pub use fbwire_core::ColumnMeta;

#[derive(Debug, Clone, Copy)]
pub struct DbHandle(pub(crate) u32);

#[derive(Debug, Clone, Copy)]
pub struct TrHandle(pub(crate) u32);

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct StmtHandle(pub(crate) u32);

#[derive(Debug, Clone, Copy)]
pub struct BlobHandle(pub(crate) u32);

#[derive(Debug, Clone, Copy)]
pub struct BlobId(pub(crate) u64);

#[derive(Debug, Clone, Copy)]
pub struct SvcHandle(pub(crate) u32);

/// Buffer capacity reserved for a single socket read. Oversized packets are
/// reassembled by looping until a full frame has arrived.
const READ_BUFFER: usize = wire::BUFFER_LENGTH as usize * 2;

/// The data a prepared statement needs to validate and run a later execute:
/// only the parameter count, since output-row formatting (which blr to ask
/// the server for, how to decode each column) is the caller's concern.
struct StmtData {
    param_count: usize,
}

enum FbStream {
    Plain(TcpStream),
    Arc4(Arc4Stream<TcpStream>),
}

impl Read for FbStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            FbStream::Plain(s) => s.read(buf),
            FbStream::Arc4(s) => s.read(buf),
        }
    }
}

impl Write for FbStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            FbStream::Plain(s) => s.write(buf),
            FbStream::Arc4(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            FbStream::Plain(s) => s.flush(),
            FbStream::Arc4(s) => s.flush(),
        }
    }
}

/// A live connection to a Firebird server: one TCP socket, optionally
/// Arc4-encrypted after authentication, plus the bookkeeping needed to run
/// further requests against it (prepared statement parameter counts).
pub struct Connection {
    socket: FbStream,
    version: ProtocolVersion,
    buff: Box<[u8]>,
    stmt_data: HashMap<StmtHandle, StmtData>,
    pub charset: Charset,
}

impl Connection {
    /// Opens the TCP socket and runs the connection handshake: protocol
    /// negotiation, then Srp/Srp256/Legacy_Auth authentication, enabling
    /// Arc4 wire encryption once Srp succeeds.
    pub fn connect(host: &str, port: u16, db_name: &str, user: &str, pass: &str, charset: Charset) -> Result<Self, FbError> {
        let tcp = TcpStream::connect((host, port))?;

        let username = env::var("USER").unwrap_or_else(|_| env::var("USERNAME").unwrap_or_default());
        let hostname = tcp
            .local_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_default();

        let mut socket = FbStream::Plain(tcp);
        let mut buff = vec![0u8; READ_BUFFER].into_boxed_slice();

        let srp_key: [u8; 32] = rand::random();

        socket.write_all(&wire::connect(db_name, false, user, &username, &hostname, &srp_key))?;
        socket.flush()?;

        let mut resp = read_raw_packet(&mut socket, &mut buff)?;
        let ConnectionResponse { version, auth_plugin } = wire::parse_accept(&mut resp)?;

        log::debug!("negotiated protocol version {:?}", version);

        if let Some(mut auth_plugin) = auth_plugin {
            socket = loop {
                match auth_plugin.kind {
                    plugin @ AuthPluginType::Srp => {
                        let srp = SrpClient::<sha1::Sha1>::new(&srp_key, &SRP_GROUP);
                        if let Some(data) = auth_plugin.data {
                            break srp_auth(socket, &mut buff, srp, plugin, user, pass, data)?;
                        }
                        auth_plugin = cont_auth_round_trip(&mut socket, &mut buff, &srp_key, plugin)?;
                    }
                    plugin @ AuthPluginType::Srp256 => {
                        let srp = SrpClient::<sha2::Sha256>::new(&srp_key, &SRP_GROUP);
                        if let Some(data) = auth_plugin.data {
                            break srp_auth(socket, &mut buff, srp, plugin, user, pass, data)?;
                        }
                        auth_plugin = cont_auth_round_trip(&mut socket, &mut buff, &srp_key, plugin)?;
                    }
                    AuthPluginType::LegacyAuth => {
                        // Reaching this arm only happens when parse_accept saw
                        // is_authenticated == 0 for Legacy_Auth (a successful
                        // Legacy_Auth never produces an AuthPlugin at all); treat
                        // it as a rejected login, not a negotiation step.
                        return Err(FbError::Internal(
                            "server rejected Legacy_Auth authentication".to_string(),
                        ));
                    }
                }
            };
        }

        log::debug!("connected to {}:{}", host, port);

        Ok(Self {
            socket,
            version,
            buff,
            stmt_data: Default::default(),
            charset,
        })
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn attach_database(&mut self, db_name: &str, user: &str, pass: &str) -> Result<DbHandle, FbError> {
        self.socket.write_all(&wire::attach(db_name, user, pass, self.version, false))?;
        self.socket.flush()?;
        Ok(DbHandle(self.read_response()?.handle))
    }

    pub fn create_database(&mut self, db_name: &str, user: &str, pass: &str) -> Result<DbHandle, FbError> {
        self.socket.write_all(&wire::attach(db_name, user, pass, self.version, true))?;
        self.socket.flush()?;
        Ok(DbHandle(self.read_response()?.handle))
    }

    pub fn detach_database(&mut self, db_handle: DbHandle) -> Result<(), FbError> {
        self.socket.write_all(&wire::detach(db_handle.0))?;
        self.socket.flush()?;
        self.read_response()?;
        Ok(())
    }

    pub fn drop_database(&mut self, db_handle: DbHandle) -> Result<(), FbError> {
        self.socket.write_all(&wire::drop_database(db_handle.0))?;
        self.socket.flush()?;
        self.read_response()?;
        Ok(())
    }

    pub fn service_attach(&mut self, service_name: &str, user: &str, pass: &str) -> Result<SvcHandle, FbError> {
        self.socket.write_all(&wire::service_attach(service_name, user, pass, self.version))?;
        self.socket.flush()?;
        Ok(SvcHandle(self.read_response()?.handle))
    }

    pub fn service_detach(&mut self, svc_handle: SvcHandle) -> Result<(), FbError> {
        self.socket.write_all(&wire::service_detach(svc_handle.0))?;
        self.socket.flush()?;
        self.read_response()?;
        Ok(())
    }

    pub fn begin_transaction(&mut self, db_handle: DbHandle, isolation_level: TrIsolationLevel) -> Result<TrHandle, FbError> {
        let tpb = [ibase::isc_tpb_version3, isolation_level as u8];
        self.socket.write_all(&wire::transaction(db_handle.0, &tpb))?;
        self.socket.flush()?;
        Ok(TrHandle(self.read_response()?.handle))
    }

    pub fn transaction_operation(&mut self, tr_handle: TrHandle, op: TrOp) -> Result<(), FbError> {
        self.socket.write_all(&wire::transaction_operation(tr_handle.0, op))?;
        self.socket.flush()?;
        self.read_response()?;
        Ok(())
    }

    pub fn exec_immediate(&mut self, tr_handle: TrHandle, dialect: Dialect, sql: &str) -> Result<(), FbError> {
        self.socket.write_all(&wire::exec_immediate(tr_handle.0, dialect as u32, sql))?;
        self.socket.flush()?;
        self.read_response()?;
        Ok(())
    }

    /// Allocates and prepares a statement, returning its type, handle and
    /// the select-list column descriptions. Continuation via `op_info_sql`
    /// is handled transparently when the first answer is truncated.
    pub fn prepare_statement(
        &mut self,
        db_handle: DbHandle,
        tr_handle: TrHandle,
        dialect: Dialect,
        sql: &str,
    ) -> Result<(StmtType, StmtHandle, Vec<ColumnMeta>), FbError> {
        self.socket.write_all(&wire::allocate_statement(db_handle.0))?;
        self.socket.write_all(&wire::prepare_statement(tr_handle.0, u32::MAX, dialect as u32, sql))?;
        self.socket.flush()?;

        let (op_code, mut resp) = self.read_packet()?;
        if op_code != WireOp::Response as u32 {
            return err_conn_rejected(op_code);
        }
        let stmt_handle = StmtHandle(wire::parse_response(&mut resp)?.handle);

        if resp.remaining() < 4 {
            return err_invalid_response();
        }
        let op_code = resp.get_u32();
        if op_code != WireOp::Response as u32 {
            return err_conn_rejected(op_code);
        }

        let mut prepare_resp = wire::parse_response(&mut resp)?;
        let mut xsqlda = Vec::new();
        let PrepareInfo {
            stmt_type,
            mut param_count,
            mut truncated,
        } = xsqlda::parse_xsqlda(&mut prepare_resp.data, &mut xsqlda)?;

        while truncated {
            self.socket.write_all(&wire::info_sql(stmt_handle.0, xsqlda.len()))?;
            self.socket.flush()?;

            let mut data = self.read_response()?.data;
            let info = xsqlda::parse_xsqlda(&mut data, &mut xsqlda)?;
            truncated = info.truncated;
            param_count = info.param_count;
        }

        self.stmt_data.insert(stmt_handle, StmtData { param_count });

        Ok((stmt_type, stmt_handle, xsqlda))
    }

    pub fn free_statement(&mut self, stmt_handle: StmtHandle, op: FreeStmtOp) -> Result<(), FbError> {
        self.socket.write_all(&wire::free_statement(stmt_handle.0, op))?;
        self.socket.flush()?;
        self.read_response()?;

        if op == FreeStmtOp::Drop {
            self.stmt_data.remove(&stmt_handle);
        }

        Ok(())
    }

    /// Binds and executes a prepared statement. Text/binary parameters
    /// longer than [`blr::MAX_CHAR_LENGTH`] are transparently spilled into
    /// a blob created on `tr_handle`.
    pub fn execute(&mut self, tr_handle: TrHandle, stmt_handle: StmtHandle, params: &[Param]) -> Result<(), FbError> {
        let param_count = self
            .stmt_data
            .get(&stmt_handle)
            .ok_or_else(|| FbError::Internal("tried to execute a dropped statement".to_string()))?
            .param_count;

        if params.len() != param_count {
            return Err(FbError::Internal(format!(
                "statement expects {} parameters, {} were provided",
                param_count,
                params.len()
            )));
        }

        let params_blr = blr::params_to_blr(params, |data| {
            let (blob_handle, blob_id) = self.create_blob(tr_handle)?;
            self.put_segments(blob_handle, data)?;
            self.close_blob(blob_handle)?;
            Ok(blob_id.0)
        })?;

        self.socket
            .write_all(&wire::execute(tr_handle.0, stmt_handle.0, &params_blr.blr, &params_blr.values))?;
        self.socket.flush()?;
        self.read_response()?;

        Ok(())
    }

    /// Like [`Connection::execute`], but also tells the server the row
    /// format (`output_blr`) the caller wants for the first row, returned
    /// inline with the response.
    pub fn execute2<C: ColumnDescriptor>(
        &mut self,
        tr_handle: TrHandle,
        stmt_handle: StmtHandle,
        params: &[Param],
        columns: &[C],
        output_blr: &[u8],
    ) -> Result<Option<Vec<Option<C::Value>>>, FbError> {
        let param_count = self
            .stmt_data
            .get(&stmt_handle)
            .ok_or_else(|| FbError::Internal("tried to execute a dropped statement".to_string()))?
            .param_count;

        if params.len() != param_count {
            return Err(FbError::Internal(format!(
                "statement expects {} parameters, {} were provided",
                param_count,
                params.len()
            )));
        }

        let params_blr = blr::params_to_blr(params, |data| {
            let (blob_handle, blob_id) = self.create_blob(tr_handle)?;
            self.put_segments(blob_handle, data)?;
            self.close_blob(blob_handle)?;
            Ok(blob_id.0)
        })?;

        self.socket.write_all(&wire::execute2(
            tr_handle.0,
            stmt_handle.0,
            &params_blr.blr,
            &params_blr.values,
            output_blr,
        ))?;
        self.socket.flush()?;

        let (op_code, mut resp) = self.read_packet()?;
        if op_code == WireOp::Response as u32 {
            wire::parse_response(&mut resp)?;
            return Ok(None);
        }
        if op_code != WireOp::SqlResponse as u32 {
            return err_conn_rejected(op_code);
        }

        let row = wire::parse_sql_response(&mut resp, columns)?;

        // op_sql_response is followed by a trailing op_response carrying the status vector.
        self.read_response()?;

        Ok(row)
    }

    /// Fetches the next row using the given output row format. Returns
    /// `None` once the cursor is exhausted.
    pub fn fetch<C: ColumnDescriptor>(
        &mut self,
        stmt_handle: StmtHandle,
        columns: &[C],
        output_blr: &[u8],
    ) -> Result<Option<Vec<Option<C::Value>>>, FbError> {
        if !self.stmt_data.contains_key(&stmt_handle) {
            return Err(FbError::Internal("tried to fetch a dropped statement".to_string()));
        }

        self.socket.write_all(&wire::fetch(stmt_handle.0, output_blr))?;
        self.socket.flush()?;

        let (op_code, mut resp) = self.read_packet()?;

        if op_code == WireOp::Response as u32 {
            wire::parse_response(&mut resp)?;
            return Ok(None);
        }
        if op_code != WireOp::FetchResponse as u32 {
            return err_conn_rejected(op_code);
        }

        wire::parse_fetch_response(&mut resp, columns)
    }

    pub fn create_blob(&mut self, tr_handle: TrHandle) -> Result<(BlobHandle, BlobId), FbError> {
        self.socket.write_all(&wire::create_blob(tr_handle.0))?;
        self.socket.flush()?;
        let resp = self.read_response()?;
        Ok((BlobHandle(resp.handle), BlobId(resp.object_id)))
    }

    pub fn open_blob(&mut self, tr_handle: TrHandle, blob_id: BlobId) -> Result<BlobHandle, FbError> {
        self.socket.write_all(&wire::open_blob(tr_handle.0, blob_id.0))?;
        self.socket.flush()?;
        Ok(BlobHandle(self.read_response()?.handle))
    }

    pub fn put_segments(&mut self, blob_handle: BlobHandle, data: &[u8]) -> Result<(), FbError> {
        for segment in data.chunks(blr::BLOB_SEGMENT_SIZE) {
            self.socket.write_all(&wire::put_segment(blob_handle.0, segment))?;
            self.socket.flush()?;
            self.read_response()?;
        }
        Ok(())
    }

    /// Reads one blob segment. Returns the bytes and whether more segments
    /// remain (`op_response`'s object id doubles as this flag: `2` means
    /// the blob is not yet exhausted).
    pub fn get_segment(&mut self, blob_handle: BlobHandle) -> Result<(Bytes, bool), FbError> {
        self.socket.write_all(&wire::get_segment(blob_handle.0))?;
        self.socket.flush()?;

        let resp = self.read_response()?;
        let mut data = resp.data;
        let mut segment = BytesMut::with_capacity(256);

        while data.remaining() >= 2 {
            let len = data.get_u16_le() as usize;
            if data.remaining() < len {
                return err_invalid_response();
            }
            segment.put_slice(&data[..len]);
            data.advance(len);
        }

        Ok((segment.freeze(), resp.handle == 2))
    }

    pub fn close_blob(&mut self, blob_handle: BlobHandle) -> Result<(), FbError> {
        self.socket.write_all(&wire::close_blob(blob_handle.0))?;
        self.socket.flush()?;
        self.read_response()?;
        Ok(())
    }

    /// Registers interest in the named events on `db_handle` under
    /// `event_id`, an opaque token the caller later matches against
    /// [`Connection::wait_event`]'s result.
    pub fn que_events(&mut self, db_handle: DbHandle, names: &[&str], event_id: u32) -> Result<(), FbError> {
        self.socket.write_all(&events::que_events(db_handle.0, names, event_id))?;
        self.socket.flush()?;
        self.read_response()?;
        Ok(())
    }

    pub fn cancel_events(&mut self, db_handle: DbHandle, event_id: u32) -> Result<(), FbError> {
        self.socket.write_all(&events::cancel_events(db_handle.0, event_id))?;
        self.socket.flush()?;
        self.read_response()?;
        Ok(())
    }

    /// Blocks on the connection until an `op_event` frame or a peer hangup
    /// arrives. `op_dummy` keepalives are consumed transparently. A hangup
    /// (`op_exit`/`op_disconnect`) is reported as [`FbError::Disconnect`].
    pub fn wait_event(&mut self) -> Result<Vec<EventCount>, FbError> {
        let socket = &mut self.socket;
        let buff = &mut self.buff;
        let frame = events::read_event_frame(|| {
            let (op, body) = read_packet_no_dummy_skip(socket, buff)?;
            Ok((op, body))
        })?;

        match frame {
            EventFrame::Fired(counts) => Ok(counts),
            EventFrame::Disconnected => Err(FbError::Disconnect),
        }
    }

    fn read_response(&mut self) -> Result<Response, FbError> {
        read_response(&mut self.socket, &mut self.buff)
    }

    fn read_packet(&mut self) -> Result<(u32, Bytes), FbError> {
        read_packet(&mut self.socket, &mut self.buff)
    }
}

/// Runs the remainder of an SRP handshake after a salt/server-pubkey pair
/// has been received: proves the password, then switches the stream over
/// to Arc4 wire encryption.
fn srp_auth<D: Digest>(
    mut socket: FbStream,
    buff: &mut [u8],
    srp: SrpClient<D>,
    plugin: AuthPluginType,
    user: &str,
    pass: &str,
    data: SrpAuthData,
) -> Result<FbStream, FbError> {
    let private_key = srp_private_key::<sha1::Sha1>(user.as_bytes(), pass.as_bytes(), &data.salt);

    let verifier = srp
        .process_reply(user.as_bytes(), &data.salt, &private_key, &data.pub_key)
        .map_err(|e| FbError::from(format!("srp error: {}", e)))?;

    let proof = hex::encode(verifier.get_proof());

    socket.write_all(&wire::cont_auth(proof.as_bytes(), plugin, AuthPluginType::plugin_list(), &[]))?;
    socket.flush()?;
    read_response(&mut socket, buff)?;

    socket.write_all(&wire::crypt("Arc4", "Symmetric"))?;
    socket.flush()?;

    let mut socket = FbStream::Arc4(Arc4Stream::new(
        match socket {
            FbStream::Plain(s) => s,
            FbStream::Arc4(_) => unreachable!("stream was already encrypted"),
        },
        &verifier.get_key(),
        buff.len(),
    ));

    read_response(&mut socket, buff)?;

    Ok(socket)
}

/// Re-proposes the negotiated plugin with the client's public key when the
/// server's `op_accept_data` carried no salt/pubkey of its own (it is
/// telling the client which plugin to switch to, not answering one).
fn cont_auth_round_trip(
    socket: &mut FbStream,
    buff: &mut [u8],
    srp_key: &[u8],
    plugin: AuthPluginType,
) -> Result<AuthPlugin, FbError> {
    let srp_pub = match plugin {
        AuthPluginType::Srp => SrpClient::<sha1::Sha1>::new(srp_key, &SRP_GROUP).get_a_pub(),
        AuthPluginType::Srp256 => SrpClient::<sha2::Sha256>::new(srp_key, &SRP_GROUP).get_a_pub(),
        AuthPluginType::LegacyAuth => Vec::new(),
    };

    socket.write_all(&wire::cont_auth(
        hex::encode(srp_pub).as_bytes(),
        plugin,
        AuthPluginType::plugin_list(),
        &[],
    ))?;
    socket.flush()?;

    let mut resp = read_raw_packet(socket, buff)?;
    wire::parse_cont_auth(&mut resp)
}

fn read_response(socket: &mut impl Read, buff: &mut [u8]) -> Result<Response, FbError> {
    let (op_code, mut resp) = read_packet(socket, buff)?;
    if op_code != WireOp::Response as u32 {
        return err_conn_rejected(op_code);
    }
    wire::parse_response(&mut resp)
}

/// Reads a full packet, skipping over any `op_dummy` keepalives the server
/// interleaves on the main connection.
fn read_packet(socket: &mut impl Read, buff: &mut [u8]) -> Result<(u32, Bytes), FbError> {
    let mut resp = read_raw_packet(socket, buff)?;

    let op_code = loop {
        if resp.remaining() < 4 {
            return err_invalid_response();
        }
        let op_code = resp.get_u32();
        if op_code != WireOp::Dummy as u32 {
            break op_code;
        }
    };

    Ok((op_code, resp))
}

/// Like [`read_packet`], but does not consume `op_dummy` itself - the event
/// waiter needs to see it to know the connection is still alive.
fn read_packet_no_dummy_skip(socket: &mut impl Read, buff: &mut [u8]) -> Result<(u32, Bytes), FbError> {
    let mut resp = read_raw_packet(socket, buff)?;
    if resp.remaining() < 4 {
        return err_invalid_response();
    }
    let op_code = resp.get_u32();
    Ok((op_code, resp))
}

fn read_raw_packet(socket: &mut impl Read, buff: &mut [u8]) -> Result<Bytes, FbError> {
    let mut len = socket.read(buff)?;
    let mut resp = BytesMut::from(&buff[..len]);

    while len == buff.len() {
        len = socket.read(buff)?;
        resp.put_slice(&buff[..len]);
    }

    Ok(resp.freeze())
}
