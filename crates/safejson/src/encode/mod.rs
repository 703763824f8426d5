//! Indented JSON text encoding of normalized trees.
//!
//! Layout comes from `serde_json`'s pretty printer; [`JsonFormatter`] adds
//! HTML escaping and the shortest plain float form on top.

mod formatter;

use std::io;

use serde::Serialize;

pub use formatter::JsonFormatter;

use crate::{Error, Result, options::Options, value::Value};

/// Encodes `value` as indented JSON: one `options.indent` per nesting level,
/// `"key": value` members in insertion order, a trailing newline unless
/// disabled.
pub fn encode_value_to_string(value: &Value, options: &Options) -> Result<String> {
    let mut buf = Vec::with_capacity(128);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, JsonFormatter::new(options));
    value.serialize(&mut ser).map_err(|err| {
        if err.is_io() {
            Error::Io(err.into())
        } else {
            Error::UnsupportedValue(err.to_string())
        }
    })?;
    if options.trailing_newline {
        buf.push(b'\n');
    }
    String::from_utf8(buf).map_err(|err| Error::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
}
