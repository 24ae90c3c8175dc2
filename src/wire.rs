//! Request packet builders and response parsers for the Firebird wire
//! protocol: connection negotiation, database/service attachment,
//! transaction control, statement lifecycle, row fetching and blob I/O.

#![allow(non_upper_case_globals)]

use std::convert::TryFrom;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use fbwire_core::{ibase, ColumnDescriptor, FbError, FreeStmtOp, TrOp};

use crate::consts::{gds_to_msg, AuthPluginType, Cnct, ProtocolVersion, WireOp};
use crate::framing::{err_conn_rejected, err_invalid_response, BufMutWireExt, BytesWireExt};
use crate::srp::{SrpClient, SRP_GROUP};
use crate::xsqlda::XSQLDA_DESCRIBE_VARS;

/// Buffer length advertised to the server for responses that may need
/// padding out to a maximum (fetch rows, blob segments, xsqlda chunks).
pub const BUFFER_LENGTH: u32 = 1024;

/// Builds the initial `op_connect` packet, offering protocol versions 10-13
/// and proposing Srp authentication (with Srp256/Legacy_Auth as fallbacks
/// the server may pick instead).
pub fn connect(db_name: &str, create_db: bool, user: &str, username: &str, hostname: &str, srp_key: &[u8]) -> Bytes {
    let protocols = [
        // version, arch type (Generic=1), min, max, weight
        [ProtocolVersion::V10 as u32, 1, 0, 5, 2],
        [ProtocolVersion::V11 as u32, 1, 0, 5, 4],
        [ProtocolVersion::V12 as u32, 1, 0, 5, 6],
        [ProtocolVersion::V13 as u32, 1, 0, 5, 8],
    ];

    let mut connect = BytesMut::with_capacity(256);

    connect.put_u32(WireOp::Connect as u32);
    connect.put_u32(if create_db { WireOp::Create } else { WireOp::Attach } as u32);
    connect.put_u32(3); // CONNECT_VERSION
    connect.put_u32(1); // arch_generic

    connect.put_wire_bytes(db_name.as_bytes());
    connect.put_u32(protocols.len() as u32);

    let srp = SrpClient::<sha1::Sha1>::new(srp_key, &SRP_GROUP);

    let uid = {
        let mut uid = BytesMut::new();

        uid.put_u8(Cnct::Login as u8);
        uid.put_u8(user.len() as u8);
        uid.put(user.as_bytes());

        let plugin = AuthPluginType::Srp.name();
        uid.put_u8(Cnct::PluginName as u8);
        uid.put_u8(plugin.len() as u8);
        uid.put(plugin.as_bytes());

        let plugin_list = AuthPluginType::plugin_list();
        uid.put_u8(Cnct::PluginList as u8);
        uid.put_u8(plugin_list.len() as u8);
        uid.put(plugin_list.as_bytes());

        let pubkey = hex::encode(srp.get_a_pub());
        for (i, chunk) in pubkey.as_bytes().chunks(254).enumerate() {
            uid.put_u8(Cnct::SpecificData as u8);
            uid.put_u8(chunk.len() as u8 + 1);
            uid.put_u8(i as u8);
            uid.put(chunk);
        }

        let wire_crypt = [1u8, 0, 0, 0];
        uid.put_u8(Cnct::ClientCrypt as u8);
        uid.put_u8(wire_crypt.len() as u8);
        uid.put(&wire_crypt[..]);

        uid.put_u8(Cnct::User as u8);
        uid.put_u8(username.len() as u8);
        uid.put(username.as_bytes());

        uid.put_u8(Cnct::Host as u8);
        uid.put_u8(hostname.len() as u8);
        uid.put(hostname.as_bytes());

        uid.put_u8(Cnct::UserVerification as u8);
        uid.put_u8(0);

        uid.freeze()
    };
    connect.put_wire_bytes(&uid);

    for i in protocols.iter().flatten() {
        connect.put_u32(*i);
    }

    connect.freeze()
}

/// Continues an authentication handshake the server redirected to a
/// different plugin than the one proposed in `op_connect`.
pub fn cont_auth(data: &[u8], plugin: AuthPluginType, plugin_list: String, keys: &[u8]) -> Bytes {
    let mut req = BytesMut::with_capacity(20 + data.len() + plugin.name().len() + plugin_list.len() + keys.len());

    req.put_u32(WireOp::ContAuth as u32);
    req.put_wire_bytes(data);
    req.put_wire_bytes(plugin.name().as_bytes());
    req.put_wire_bytes(plugin_list.as_bytes());
    req.put_wire_bytes(keys);

    req.freeze()
}

/// Requests wire encryption be turned on for the rest of the session.
pub fn crypt(algo: &str, kind: &str) -> Bytes {
    let mut req = BytesMut::with_capacity(12 + algo.len() + kind.len());

    req.put_u32(WireOp::Crypt as u32);
    req.put_wire_bytes(algo.as_bytes());
    req.put_wire_bytes(kind.as_bytes());

    req.freeze()
}

/// Builds the DPB for `op_attach`/`op_create`, choosing the password
/// encoding appropriate for the negotiated protocol version: plaintext on
/// V10, DES-hashed on V11/V12, omitted entirely on V13 where Srp already
/// proved the password to the server.
fn database_dpb(user: &str, pass: &str, protocol: ProtocolVersion) -> Bytes {
    let mut dpb = BytesMut::with_capacity(64);

    dpb.put_u8(ibase::isc_dpb_version1);

    let charset = b"UTF8";
    dpb.put_slice(&[ibase::isc_dpb_lc_ctype, charset.len() as u8]);
    dpb.put_slice(charset);

    dpb.put_slice(&[ibase::isc_dpb_user_name, user.len() as u8]);
    dpb.put_slice(user.as_bytes());

    match protocol {
        ProtocolVersion::V10 => {
            dpb.put_slice(&[ibase::isc_dpb_password, pass.len() as u8]);
            dpb.put_slice(pass.as_bytes());
        }
        ProtocolVersion::V11 | ProtocolVersion::V12 => {
            let enc_pass = crate::legacy_auth::hash_password(pass);
            dpb.put_slice(&[ibase::isc_dpb_password_enc, enc_pass.len() as u8]);
            dpb.put_slice(enc_pass.as_bytes());
        }
        ProtocolVersion::V13 => {}
    }

    dpb.freeze()
}

/// Attach (or create) a database.
pub fn attach(db_name: &str, user: &str, pass: &str, protocol: ProtocolVersion, create_db: bool) -> Bytes {
    let dpb = database_dpb(user, pass, protocol);

    let mut req = BytesMut::with_capacity(16 + db_name.len() + dpb.len());
    req.put_u32(if create_db { WireOp::Create } else { WireOp::Attach } as u32);
    req.put_u32(0); // database object id
    req.put_wire_bytes(db_name.as_bytes());
    req.put_wire_bytes(&dpb);

    req.freeze()
}

/// Attach to the Services Manager.
pub fn service_attach(service_name: &str, user: &str, pass: &str, protocol: ProtocolVersion) -> Bytes {
    let spb = database_dpb(user, pass, protocol);

    let mut req = BytesMut::with_capacity(16 + service_name.len() + spb.len());
    req.put_u32(WireOp::ServiceAttach as u32);
    req.put_u32(0);
    req.put_wire_bytes(service_name.as_bytes());
    req.put_wire_bytes(&spb);

    req.freeze()
}

pub fn detach(db_handle: u32) -> Bytes {
    let mut req = BytesMut::with_capacity(8);
    req.put_u32(WireOp::Detach as u32);
    req.put_u32(db_handle);
    req.freeze()
}

pub fn service_detach(svc_handle: u32) -> Bytes {
    let mut req = BytesMut::with_capacity(8);
    req.put_u32(WireOp::ServiceDetach as u32);
    req.put_u32(svc_handle);
    req.freeze()
}

pub fn drop_database(db_handle: u32) -> Bytes {
    let mut req = BytesMut::with_capacity(8);
    req.put_u32(WireOp::DropDatabase as u32);
    req.put_u32(db_handle);
    req.freeze()
}

/// Builds a transaction parameter block and `op_transaction` request.
pub fn transaction(db_handle: u32, tpb: &[u8]) -> Bytes {
    let mut req = BytesMut::with_capacity(12 + tpb.len());
    req.put_u32(WireOp::Transaction as u32);
    req.put_u32(db_handle);
    req.put_wire_bytes(tpb);
    req.freeze()
}

pub fn transaction_operation(tr_handle: u32, op: TrOp) -> Bytes {
    let mut req = BytesMut::with_capacity(8);

    let wire_op = match op {
        TrOp::Commit => WireOp::Commit,
        TrOp::CommitRetaining => WireOp::CommitRetaining,
        TrOp::Rollback => WireOp::Rollback,
        TrOp::RollbackRetaining => WireOp::RollbackRetaining,
    };

    req.put_u32(wire_op as u32);
    req.put_u32(tr_handle);
    req.freeze()
}

pub fn exec_immediate(tr_handle: u32, dialect: u32, sql: &str) -> Bytes {
    let mut req = BytesMut::with_capacity(28 + sql.len());

    req.put_u32(WireOp::ExecImmediate as u32);
    req.put_u32(tr_handle);
    req.put_u32(0); // statement handle, unused for exec_immediate
    req.put_u32(dialect);
    req.put_wire_bytes(sql.as_bytes());
    req.put_u32(0); // no input params for exec_immediate
    req.put_u32(BUFFER_LENGTH);

    req.freeze()
}

pub fn allocate_statement(db_handle: u32) -> Bytes {
    let mut req = BytesMut::with_capacity(8);
    req.put_u32(WireOp::AllocateStatement as u32);
    req.put_u32(db_handle);
    req.freeze()
}

/// `stmt_handle` of `u32::MAX` refers to the statement allocated by the
/// immediately preceding `op_allocate_statement` in the same batch.
pub fn prepare_statement(tr_handle: u32, stmt_handle: u32, dialect: u32, query: &str) -> Bytes {
    let mut req = BytesMut::with_capacity(28 + query.len() + XSQLDA_DESCRIBE_VARS.len());

    req.put_u32(WireOp::PrepareStatement as u32);
    req.put_u32(tr_handle);
    req.put_u32(stmt_handle);
    req.put_u32(dialect);
    req.put_wire_bytes(query.as_bytes());
    req.put_wire_bytes(&XSQLDA_DESCRIBE_VARS);
    req.put_u32(BUFFER_LENGTH);

    req.freeze()
}

/// Continues a truncated xsqlda, asking for columns starting at `next_index`.
pub fn info_sql(stmt_handle: u32, next_index: usize) -> Bytes {
    let mut req = BytesMut::with_capacity(24 + XSQLDA_DESCRIBE_VARS.len());

    let next_index = (next_index as u16).to_le_bytes();

    req.put_u32(WireOp::InfoSql as u32);
    req.put_u32(stmt_handle);
    req.put_u32(0); // incarnation
    req.put_wire_bytes(
        &[
            &[ibase::isc_info_sql_sqlda_start, 2, next_index[0], next_index[1]][..],
            &XSQLDA_DESCRIBE_VARS[..],
        ]
        .concat(),
    );
    req.put_u32(BUFFER_LENGTH);

    req.freeze()
}

pub fn free_statement(stmt_handle: u32, op: FreeStmtOp) -> Bytes {
    let mut req = BytesMut::with_capacity(12);
    req.put_u32(WireOp::FreeStatement as u32);
    req.put_u32(stmt_handle);
    req.put_u32(op as u32);
    req.freeze()
}

pub fn execute(tr_handle: u32, stmt_handle: u32, input_blr: &[u8], input_data: &[u8]) -> Bytes {
    let mut req = BytesMut::with_capacity(36 + input_blr.len() + input_data.len());

    req.put_u32(WireOp::Execute as u32);
    req.put_u32(stmt_handle);
    req.put_u32(tr_handle);
    req.put_wire_bytes(input_blr);
    req.put_u32(0); // message number
    req.put_u32(if input_blr.is_empty() { 0 } else { 1 }); // message count

    req.put_slice(input_data);

    req.freeze()
}

/// Like [`execute`], but also names an output message format so the server
/// returns the first row inline with the response (`op_execute2`).
pub fn execute2(tr_handle: u32, stmt_handle: u32, input_blr: &[u8], input_data: &[u8], output_blr: &[u8]) -> Bytes {
    let mut req = BytesMut::with_capacity(48 + input_blr.len() + input_data.len() + output_blr.len());

    req.put_u32(WireOp::Execute2 as u32);
    req.put_u32(stmt_handle);
    req.put_u32(tr_handle);
    req.put_wire_bytes(input_blr);
    req.put_u32(0);
    req.put_u32(if input_blr.is_empty() { 0 } else { 1 });

    req.put_slice(input_data);

    req.put_wire_bytes(output_blr);
    req.put_u32(0); // output message number

    req.freeze()
}

pub fn fetch(stmt_handle: u32, blr: &[u8]) -> Bytes {
    let mut req = BytesMut::with_capacity(20 + blr.len());

    req.put_u32(WireOp::Fetch as u32);
    req.put_u32(stmt_handle);
    req.put_wire_bytes(blr);
    req.put_u32(0); // message number
    req.put_u32(1); // message count

    req.freeze()
}

pub fn create_blob(tr_handle: u32) -> Bytes {
    let mut req = BytesMut::with_capacity(16);
    req.put_u32(WireOp::CreateBlob2 as u32);
    req.put_u32(tr_handle);
    req.put_u64(0);
    req.freeze()
}

pub fn open_blob(tr_handle: u32, blob_id: u64) -> Bytes {
    let mut req = BytesMut::with_capacity(16);
    req.put_u32(WireOp::OpenBlob as u32);
    req.put_u32(tr_handle);
    req.put_u64(blob_id);
    req.freeze()
}

pub fn get_segment(blob_handle: u32) -> Bytes {
    let mut req = BytesMut::with_capacity(16);
    req.put_u32(WireOp::GetSegment as u32);
    req.put_u32(blob_handle);
    req.put_u32(BUFFER_LENGTH);
    req.put_u32(0);
    req.freeze()
}

pub fn put_segment(blob_handle: u32, segment: &[u8]) -> Bytes {
    let mut req = BytesMut::with_capacity(8 + segment.len());
    req.put_u32(WireOp::PutSegment as u32);
    req.put_u32(blob_handle);
    req.put_u32(segment.len() as u32);
    req.put_wire_bytes(segment);
    req.freeze()
}

pub fn close_blob(blob_handle: u32) -> Bytes {
    let mut req = BytesMut::with_capacity(8);
    req.put_u32(WireOp::CloseBlob as u32);
    req.put_u32(blob_handle);
    req.freeze()
}

#[derive(Debug)]
/// An `op_response` packet: the object handle assigned/affected, an
/// object id (e.g. a new blob's quad) and any inline data the request asked
/// for (xsqlda bytes, info buffer, ...).
pub struct Response {
    pub handle: u32,
    pub object_id: u64,
    pub data: Bytes,
}

pub fn parse_response(resp: &mut Bytes) -> Result<Response, FbError> {
    if resp.remaining() < 12 {
        return err_invalid_response();
    }
    let handle = resp.get_u32();
    let object_id = resp.get_u64();
    let data = resp.get_wire_bytes()?;

    parse_status_vector(resp)?;

    Ok(Response {
        handle,
        object_id,
        data,
    })
}

/// Parses one fetched row from an `op_fetch_response` body, using `columns`
/// to know each column's wire size and how to decode it. There is no
/// protocol-13 null bitmap here: every column is always followed by its own
/// 4-byte null indicator, the same as every earlier protocol version.
pub fn parse_fetch_response<C: ColumnDescriptor>(
    resp: &mut Bytes,
    columns: &[C],
) -> Result<Option<Vec<Option<C::Value>>>, FbError> {
    const END_OF_STREAM: u32 = 100;

    if resp.remaining() < 8 {
        return err_invalid_response();
    }

    let status = resp.get_u32();
    let has_row = resp.get_u32() != 0;

    if status == END_OF_STREAM {
        return Ok(None);
    }
    if !has_row {
        return Err(FbError::Internal("fetch returned no columns".to_string()));
    }

    decode_row(resp, columns).map(Some)
}

/// Parses an `op_sql_response` body: a message count (0 or 1 for this
/// client, which never asks for more than one message at a time) followed
/// by the row itself in the same shape `op_fetch_response` uses - one
/// column slot padded to 4 bytes plus its inline null indicator.
pub fn parse_sql_response<C: ColumnDescriptor>(
    resp: &mut Bytes,
    columns: &[C],
) -> Result<Option<Vec<Option<C::Value>>>, FbError> {
    if resp.remaining() < 4 {
        return err_invalid_response();
    }
    let message_count = resp.get_u32();

    if message_count == 0 {
        return Ok(None);
    }

    decode_row(resp, columns).map(Some)
}

fn decode_row<C: ColumnDescriptor>(resp: &mut Bytes, columns: &[C]) -> Result<Vec<Option<C::Value>>, FbError> {
    let mut row = Vec::with_capacity(columns.len());

    for col in columns {
        let len = col.io_length();
        if resp.remaining() < len {
            return err_invalid_response();
        }
        let raw = resp.slice(..len);
        resp.advance(len);
        if len % 4 != 0 {
            let pad = 4 - (len % 4);
            if resp.remaining() < pad {
                return err_invalid_response();
            }
            resp.advance(pad);
        }

        if resp.remaining() < 4 {
            return err_invalid_response();
        }
        let is_null = resp.get_u32() != 0;

        row.push(if is_null {
            None
        } else {
            Some(col.decode(&raw, false))
        });
    }

    Ok(row)
}

/// Parses a status vector into a single `FbError::Sql` (or `Ok(())` if the
/// vector was empty, i.e. `isc_arg_end` was the very first item).
///
/// `isc_arg_sql_state` carries a length-prefixed SQLSTATE string, same shape
/// and substitution behavior as `isc_arg_string` - both consume the string
/// and substitute it into the next `@N` placeholder.
pub fn parse_status_vector(resp: &mut Bytes) -> Result<(), FbError> {
    let mut sql_code = -1i32;
    let mut message = String::new();
    let mut gds_codes = Vec::new();

    let mut gds_code = 0u32;
    let mut num_arg = 0u32;

    loop {
        if resp.remaining() < 4 {
            return err_invalid_response();
        }

        match resp.get_u32() {
            t if t == ibase::isc_arg_gds => {
                if resp.remaining() < 4 {
                    return err_invalid_response();
                }
                gds_code = resp.get_u32();

                if gds_code != 0 {
                    gds_codes.push(gds_code);
                    message += gds_to_msg(gds_code);
                    num_arg = 0;
                }
            }

            t if t == ibase::isc_arg_number => {
                if resp.remaining() < 4 {
                    return err_invalid_response();
                }
                let num = resp.get_i32();

                if gds_code == ibase::isc_sqlerr {
                    sql_code = num;
                }

                num_arg += 1;
                message = message.replace(&format!("@{}", num_arg), &num.to_string());
            }

            t if t == ibase::isc_arg_string || t == ibase::isc_arg_sql_state => {
                let arg = resp.get_wire_bytes()?;
                let arg = std::str::from_utf8(&arg).unwrap_or("**invalid message**");

                num_arg += 1;
                message = message.replace(&format!("@{}", num_arg), arg);
            }

            t if t == ibase::isc_arg_interpreted => {
                let arg = resp.get_wire_bytes()?;
                let arg = std::str::from_utf8(&arg).unwrap_or("**invalid message**");
                message += arg;
            }

            t if t == ibase::isc_arg_end => break,

            code => {
                return Err(FbError::Internal(format!(
                    "invalid / unknown status vector item: {}",
                    code
                )));
            }
        }
    }

    if message.ends_with('\n') {
        message.pop();
    }

    if !message.is_empty() {
        log::debug!("server returned status vector: {}", message);
        Err(fbwire_core::error::err_sql(sql_code, gds_codes, message))
    } else {
        Ok(())
    }
}

#[derive(Debug)]
pub struct ConnectionResponse {
    pub version: ProtocolVersion,
    pub auth_plugin: Option<AuthPlugin>,
}

#[derive(Debug)]
pub struct AuthPlugin {
    pub kind: AuthPluginType,
    pub data: Option<SrpAuthData>,
    pub keys: Bytes,
}

/// Parses `op_accept`/`op_accept_data`/`op_cond_accept`.
pub fn parse_accept(resp: &mut Bytes) -> Result<ConnectionResponse, FbError> {
    if resp.remaining() < 4 {
        return err_invalid_response();
    }
    let op_code = resp.get_u32();

    if op_code == WireOp::Response as u32 {
        parse_response(resp)?;
    }

    if op_code != WireOp::Accept as u32
        && op_code != WireOp::AcceptData as u32
        && op_code != WireOp::CondAccept as u32
    {
        return err_conn_rejected(op_code);
    }

    if resp.remaining() < 12 {
        return err_invalid_response();
    }
    let version = ProtocolVersion::try_from(resp.get_u32())
        .map_err(|e| FbError::Internal(e.to_string()))?;
    resp.get_u32(); // arch
    resp.get_u32(); // type

    let auth_plugin = if op_code == WireOp::AcceptData as u32 || op_code == WireOp::CondAccept as u32 {
        let auth_data = parse_srp_auth_data(&mut resp.get_wire_bytes()?)?;
        let plugin = AuthPluginType::parse(&resp.get_wire_bytes()?)?;

        if resp.remaining() < 4 {
            return err_invalid_response();
        }
        // Only meaningful for Legacy_Auth: Srp/Srp256 always continue with a
        // cont_auth round trip regardless of this flag.
        let authenticated = resp.get_u32() != 0 && plugin == AuthPluginType::LegacyAuth;
        let keys = resp.get_wire_bytes()?;

        if authenticated {
            None
        } else {
            Some(AuthPlugin {
                kind: plugin,
                data: auth_data,
                keys,
            })
        }
    } else {
        None
    };

    Ok(ConnectionResponse {
        version,
        auth_plugin,
    })
}

pub fn parse_cont_auth(resp: &mut Bytes) -> Result<AuthPlugin, FbError> {
    if resp.remaining() < 4 {
        return err_invalid_response();
    }
    let op_code = resp.get_u32();

    if op_code == WireOp::Response as u32 {
        parse_response(resp)?;
    }
    if op_code != WireOp::ContAuth as u32 {
        return err_conn_rejected(op_code);
    }

    let auth_data = parse_srp_auth_data(&mut resp.get_wire_bytes()?)?;
    let plugin = AuthPluginType::parse(&resp.get_wire_bytes()?)?;
    let _plugin_list = resp.get_wire_bytes()?;
    let keys = resp.get_wire_bytes()?;

    Ok(AuthPlugin {
        kind: plugin,
        data: auth_data,
        keys,
    })
}

#[derive(Debug)]
pub struct SrpAuthData {
    pub salt: Box<[u8]>,
    pub pub_key: Box<[u8]>,
}

/// Parses the Srp/Srp256 plugin's specific data: two u16-le-length-prefixed
/// hex strings, salt then server public key.
pub fn parse_srp_auth_data(resp: &mut Bytes) -> Result<Option<SrpAuthData>, FbError> {
    if resp.is_empty() {
        return Ok(None);
    }

    if resp.remaining() < 2 {
        return err_invalid_response();
    }
    let len = resp.get_u16_le() as usize;
    if resp.remaining() < len {
        return err_invalid_response();
    }
    let salt = resp.slice(..len).to_vec();
    resp.advance(len);

    if resp.remaining() < 2 {
        return err_invalid_response();
    }
    let len = resp.get_u16_le() as usize;
    if resp.remaining() < len {
        return err_invalid_response();
    }
    let mut pub_key = resp.slice(..len).to_vec();
    if len % 2 != 0 {
        pub_key = [b"0", &pub_key[..]].concat();
    }
    let pub_key = hex::decode(&pub_key).map_err(|_| FbError::Internal("invalid hex pub_key in srp data".to_string()))?;
    resp.advance(len);

    Ok(Some(SrpAuthData {
        salt: salt.into_boxed_slice(),
        pub_key: pub_key.into_boxed_slice(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestColumn {
        len: usize,
    }

    impl ColumnDescriptor for TestColumn {
        type Value = Vec<u8>;

        fn io_length(&self) -> usize {
            self.len
        }

        fn decode(&self, raw: &[u8], _is_null: bool) -> Self::Value {
            raw.to_vec()
        }
    }

    #[test]
    fn connect_packet_is_word_aligned() {
        let req = connect("test.fdb", false, "SYSDBA", "sysdba", "localhost", &[0u8; 32]);
        assert_eq!(req.len() % 4, 0);
        assert_eq!(&req[..4], &(WireOp::Connect as u32).to_be_bytes());
    }

    #[test]
    fn status_vector_empty_is_ok() {
        let mut buf = BytesMut::new();
        buf.put_u32(ibase::isc_arg_end);
        assert!(parse_status_vector(&mut buf.freeze()).is_ok());
    }

    #[test]
    fn status_vector_builds_message_from_string_arg() {
        let mut buf = BytesMut::new();
        buf.put_u32(ibase::isc_arg_gds);
        buf.put_u32(ibase::isc_no_priv);
        buf.put_u32(ibase::isc_arg_string);
        buf.put_wire_bytes(b"users");
        buf.put_u32(ibase::isc_arg_end);

        let err = parse_status_vector(&mut buf.freeze()).unwrap_err();
        match err {
            FbError::Sql { gds_codes, msg, .. } => {
                assert_eq!(gds_codes, vec![ibase::isc_no_priv]);
                assert!(msg.contains("users"));
            }
            other => panic!("expected FbError::Sql, got {:?}", other),
        }
    }

    #[test]
    fn status_vector_substitutes_sql_state_like_string_arg() {
        let mut buf = BytesMut::new();
        buf.put_u32(ibase::isc_arg_gds);
        buf.put_u32(ibase::isc_no_priv);
        buf.put_u32(ibase::isc_arg_sql_state);
        buf.put_wire_bytes(b"users");
        buf.put_u32(ibase::isc_arg_end);

        let err = parse_status_vector(&mut buf.freeze()).unwrap_err();
        match err {
            FbError::Sql { gds_codes, msg, .. } => {
                assert_eq!(gds_codes, vec![ibase::isc_no_priv]);
                assert!(msg.contains("users"));
            }
            other => panic!("expected FbError::Sql, got {:?}", other),
        }
    }

    #[test]
    fn status_vector_promotes_number_to_sql_code_on_sqlerr() {
        let mut buf = BytesMut::new();
        buf.put_u32(ibase::isc_arg_gds);
        buf.put_u32(ibase::isc_sqlerr);
        buf.put_u32(ibase::isc_arg_number);
        buf.put_i32(-803);
        buf.put_u32(ibase::isc_arg_end);

        let err = parse_status_vector(&mut buf.freeze()).unwrap_err();
        match err {
            FbError::Sql { code, .. } => assert_eq!(code, -803),
            other => panic!("expected FbError::Sql, got {:?}", other),
        }
    }

    #[test]
    fn fetch_response_decodes_one_row_and_signals_end_of_stream() {
        let columns = [TestColumn { len: 4 }];

        let mut buf = BytesMut::new();
        buf.put_u32(0); // status
        buf.put_u32(1); // has_row
        buf.put_slice(b"abc\0"); // 4-byte aligned column value
        buf.put_u32(0); // not null

        let row = parse_fetch_response(&mut buf.freeze(), &columns).unwrap();
        assert_eq!(row, Some(vec![Some(b"abc\0".to_vec())]));

        let mut eof = BytesMut::new();
        eof.put_u32(100); // end-of-stream status
        eof.put_u32(0);
        assert_eq!(parse_fetch_response(&mut eof.freeze(), &columns).unwrap(), None);
    }

    #[test]
    fn fetch_response_marks_null_column() {
        let columns = [TestColumn { len: 4 }];

        let mut buf = BytesMut::new();
        buf.put_u32(0);
        buf.put_u32(1);
        buf.put_slice(&[0u8; 4]);
        buf.put_u32(0xFFFF_FFFF); // null indicator

        let row = parse_fetch_response(&mut buf.freeze(), &columns).unwrap();
        assert_eq!(row, Some(vec![None]));
    }

    #[test]
    fn accept_rejects_unexpected_opcode() {
        let mut buf = BytesMut::new();
        buf.put_u32(WireOp::Reject as u32);
        assert!(parse_accept(&mut buf.freeze()).is_err());
    }
}
