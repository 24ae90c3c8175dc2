//! `Legacy_Auth` password hashing: a crypt(3)-style DES hash with a fixed
//! salt, used both as the `Legacy_Auth` plugin's CNCT specific data and as
//! the `isc_dpb_password_enc` DPB item on pre-V13 connections that didn't
//! negotiate Srp.

/// Hashes a password the way Firebird's legacy authentication does: DES
/// crypt(3) with the salt `"9z"`, stripped of its 2-byte salt prefix so only
/// the hash itself is sent.
pub fn hash_password(password: &str) -> String {
    #[allow(deprecated)]
    let hashed = pwhash::unix_crypt::hash_with("9z", password)
        .expect("DES crypt hashing never fails for the fixed \"9z\" salt");
    hashed[2..].to_string()
}
