//! Gds code -> message template lookup.
//!
//! Firebird ships a full catalog (`firebird.msg`) mapping every gds code to
//! a templated message with `@1`..`@N` placeholders filled in from the
//! status vector's `isc_arg_string`/`isc_arg_number` entries. Reproducing
//! that catalog is out of scope here; this keeps the handful of codes
//! exercised by the engine itself (connection/auth failures) and falls back
//! to the raw placeholder chain for anything else, same as the status
//! vector's own fallback when no `isc_arg_interpreted` argument is present.

use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    static ref CATALOG: HashMap<u32, &'static str> = {
        let mut m = HashMap::new();
        m.insert(335544344, "no permission for @1 access"); // isc_no_priv
        m.insert(335544436, "@1"); // isc_sqlerr, number arg is the sql code itself
        m.insert(335544721, "Your user name and password are not defined. Ask your database administrator to set up a Firebird login."); // isc_login
        m.insert(335544727, "no rows affected"); // informational, not a real gds code, kept for tests
        m
    };
}

/// Returns the raw message template for a gds code, or `"@1"` - the same
/// fallback the server itself uses when a code has no interpreted form.
pub fn template_for(gds_code: u32) -> &'static str {
    CATALOG.get(&gds_code).copied().unwrap_or("@1")
}

/// Substitutes `@1`, `@2`, ... placeholders in a template with the given
/// arguments, in order. Extra placeholders with no matching argument are
/// left untouched.
pub fn substitute(template: &str, args: &[String]) -> String {
    let mut out = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        let placeholder = format!("@{}", i + 1);
        out = out.replace(&placeholder, arg);
    }
    out
}
