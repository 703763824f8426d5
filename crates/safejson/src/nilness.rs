use tracing::debug;

use crate::reflect::{Kind, Reflect};

/// Reports whether `value` refers to nothing.
///
/// `None` stands for an untyped nil. Pointers, channels, functions and unsafe
/// pointers are nil-like when their handle is empty; every value kind is
/// never nil. An unrecognized (opaque) kind is treated as non-nil.
pub fn is_nil_like(value: Option<&dyn Reflect>) -> bool {
    match value {
        None => true,
        Some(v) => is_nil_kind(&v.kind()),
    }
}

pub fn not_nil_like(value: Option<&dyn Reflect>) -> bool {
    !is_nil_like(value)
}

pub(crate) fn is_nil_kind(kind: &Kind<'_>) -> bool {
    match kind {
        Kind::Pointer(target) => target.is_none(),
        Kind::Channel { nil } | Kind::Function { nil } | Kind::UnsafePointer { nil } => *nil,
        Kind::Bool(_)
        | Kind::Number(_)
        | Kind::String(_)
        | Kind::Array(_)
        | Kind::List(_)
        | Kind::Map(_)
        | Kind::Struct(_)
        | Kind::Time(_) => false,
        Kind::Opaque(label) => {
            debug!(kind = *label, "nil check on unrecognized kind, assuming non-nil");
            false
        }
    }
}
