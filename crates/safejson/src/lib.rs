#![doc = include_str!("../README.md")]

extern crate self as safejson;

pub mod descriptor;
pub mod encode;
pub mod error;
pub mod mask;
pub mod nilness;
pub mod normalize;
pub mod options;
pub mod printer;
pub mod reflect;
pub mod value;

#[cfg(feature = "http")]
pub mod http;

mod number;
mod persist;

pub use crate::descriptor::FieldDescriptor;
pub use crate::error::{Error, Result};
pub use crate::mask::{DefaultMasker, DefaultMaskerBuilder, MaskError, Masker, NoopMasker, Policy};
pub use crate::nilness::{is_nil_like, not_nil_like};
pub use crate::normalize::{Normalizer, format_timestamp, normalize, normalize_any};
pub use crate::options::Options;
pub use crate::printer::{MAYBE_SECURE_FALLBACK, Printer, default_printer};
pub use crate::reflect::{Field, Json, Kind, MarshalError, Reflect, Text};
pub use crate::value::{Number, Object, UNSUPPORTED_MESSAGE, Value};

#[cfg(feature = "derive")]
pub use safejson_derive::Reflect;

#[cfg(feature = "http")]
pub use crate::http::{print_http_request, print_http_response};

use std::path::Path;

/// Encodes an already normalized tree with `options`.
pub fn encode(value: &Value, options: &Options) -> Result<String> {
    crate::encode::encode_value_to_string(value, options)
}

pub fn pretty_json(value: &dyn Reflect) -> Result<String> {
    default_printer().pretty_json(value)
}

pub fn maybe_pretty_json(value: &dyn Reflect) -> String {
    default_printer().maybe_pretty_json(value)
}

pub fn secure_json(value: &dyn Reflect) -> Result<String> {
    default_printer().secure_json(value)
}

pub fn maybe_secure_json(value: &dyn Reflect) -> String {
    default_printer().maybe_secure_json(value)
}

pub fn save_json_file(path: impl AsRef<Path>, value: &dyn Reflect) -> Result<()> {
    default_printer().save_json_file(path, value)
}

pub fn save_secure_json_file(path: impl AsRef<Path>, value: &dyn Reflect) -> Result<()> {
    default_printer().save_secure_json_file(path, value)
}
