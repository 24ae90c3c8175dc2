//! Wire-level constants: opcodes, CNCT item tags, auth plugin names, BLR tags.
#![allow(non_upper_case_globals)]

use num_enum::{IntoPrimitive, TryFromPrimitive};

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum WireOp {
    Connect = 1,
    Exit = 2,
    Accept = 3,
    Reject = 4,
    Protocol = 5,
    Disconnect = 6,
    Response = 9,
    Attach = 19,
    Create = 20,
    Detach = 21,
    Transaction = 29,
    Commit = 30,
    Rollback = 31,
    OpenBlob = 35,
    GetSegment = 36,
    PutSegment = 37,
    CloseBlob = 39,
    InfoDatabase = 40,
    InfoTransaction = 42,
    BatchSegments = 44,
    QueEvents = 48,
    CancelEvents = 49,
    CommitRetaining = 50,
    Event = 52,
    AuxConnect = 53,
    CreateBlob2 = 57,
    AllocateStatement = 62,
    Execute = 63,
    ExecImmediate = 64,
    Fetch = 65,
    FetchResponse = 66,
    FreeStatement = 67,
    PrepareStatement = 68,
    InfoSql = 70,
    Dummy = 71,
    Execute2 = 76,
    SqlResponse = 78,
    DropDatabase = 81,
    ServiceAttach = 82,
    ServiceDetach = 83,
    ServiceInfo = 84,
    ServiceStart = 85,
    RollbackRetaining = 86,
    UpdateAccountInfo = 87,
    AuthenticateUser = 88,
    Partial = 89,
    TrustedAuth = 90,
    Cancel = 91,
    ContAuth = 92,
    Ping = 93,
    AcceptData = 94,
    AbortAuxConnection = 95,
    Crypt = 96,
    CryptKeyCallback = 97,
    CondAccept = 98,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Cnct {
    Login = 1,
    PluginName = 2,
    PluginList = 3,
    SpecificData = 4,
    ClientCrypt = 5,
    User = 6,
    Password = 7,
    Passwordenc = 8,
    Host = 9,
    Group = 10,
    UserVerification = 11,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPluginType {
    Srp,
    Srp256,
    LegacyAuth,
}

impl AuthPluginType {
    pub fn name(self) -> &'static str {
        match self {
            AuthPluginType::Srp => "Srp",
            AuthPluginType::Srp256 => "Srp256",
            AuthPluginType::LegacyAuth => "Legacy_Auth",
        }
    }

    /// The full list of plugins this client is willing to try, in priority order.
    pub fn plugin_list() -> String {
        "Srp256,Srp,Legacy_Auth".to_string()
    }

    pub fn parse(name: &[u8]) -> Result<Self, fbwire_core::FbError> {
        match name {
            b"Srp" => Ok(AuthPluginType::Srp),
            b"Srp256" => Ok(AuthPluginType::Srp256),
            b"Legacy_Auth" => Ok(AuthPluginType::LegacyAuth),
            other => Err(format!(
                "Unknown auth plugin: {}",
                String::from_utf8_lossy(other)
            )
            .into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum ProtocolVersion {
    V10 = 10,
    V11 = 11,
    V12 = 12,
    V13 = 13,
}

/// BLR tags used when building parameter/message descriptions. Only the
/// subset exercised by this engine.
pub mod blr {
    pub const TEXT: u8 = 14;
    pub const VARYING: u8 = 37;
    pub const SHORT: u8 = 7;
    pub const LONG: u8 = 8;
    pub const QUAD: u8 = 9;
    pub const FLOAT: u8 = 10;
    pub const DOUBLE: u8 = 27;
    pub const D_FLOAT: u8 = 11;
    pub const TIMESTAMP: u8 = 35;
    pub const BLOB: u8 = 9;
    pub const SQL_DATE: u8 = 12;
    pub const SQL_TIME: u8 = 13;
    pub const INT64: u8 = 16;
    pub const BOOL: u8 = 23;
    pub const VERSION5: u8 = 5;
    pub const BEGIN: u8 = 2;
    pub const MESSAGE: u8 = 4;
    pub const END: u8 = 255;
    pub const EOC: u8 = 76;
}

/// Looks up a gds code's message template, delegating to the shared
/// (intentionally small) catalog.
pub fn gds_to_msg(gds_code: u32) -> &'static str {
    fbwire_core::messages::template_for(gds_code)
}
