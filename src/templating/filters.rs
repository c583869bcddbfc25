//! Custom Tera filters.
//!
//! `password_hash` maps a credential string to a salted MD5-crypt hash
//! (`$1$<salt>$<digest>`). This is the storage format the target device's
//! configuration expects for password fields - a compatibility requirement
//! of the consuming system, not a hashing recommendation. The salt is
//! random, so hashing the same input twice yields different strings that
//! both verify against the original.
//!
//! Template usage:
//!
//! ```text
//! <users><entry name="admin"><phash>{{ ADMIN_PW | password_hash }}</phash></entry></users>
//! ```

use std::collections::HashMap;

use pwhash::md5_crypt;
use tera::Value;

/// Tera filter producing a salted MD5-crypt hash of the input string.
pub fn password_hash(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let secret = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("password_hash filter requires a string value"))?;

    let hashed = md5_crypt::hash(secret)
        .map_err(|e| tera::Error::msg(format!("password_hash filter error: {e}")))?;

    Ok(Value::String(hashed))
}
