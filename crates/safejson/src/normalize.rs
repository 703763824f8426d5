//! Reflection-driven conversion of arbitrary values into [`Value`] trees.

use chrono::{DateTime, FixedOffset, Timelike};
use tracing::trace;

use crate::nilness::is_nil_kind;
use crate::reflect::{Kind, Reflect};
use crate::value::{Object, Value};

/// Normalizes `value` with no recursion limit.
pub fn normalize(value: &dyn Reflect) -> Value {
    Normalizer::new().normalize(value)
}

/// Like [`normalize`], with `None` standing for an untyped nil.
pub fn normalize_any(value: Option<&dyn Reflect>) -> Value {
    match value {
        Some(v) => normalize(v),
        None => Value::Null,
    }
}

/// Stateless normalizer. The only setting is an optional recursion guard for
/// graphs the caller cannot prove acyclic.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    max_depth: Option<usize>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Past `max_depth` levels the normalizer emits [`Value::Unsupported`]
    /// instead of descending.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth: Some(max_depth) }
    }

    pub(crate) fn from_limit(max_depth: Option<usize>) -> Self {
        Self { max_depth }
    }

    pub fn normalize(&self, value: &dyn Reflect) -> Value {
        self.visit(value, 0)
    }

    fn visit(&self, value: &dyn Reflect, depth: usize) -> Value {
        if self.max_depth.is_some_and(|max| depth > max) {
            trace!(depth, "depth limit reached");
            return Value::Unsupported;
        }

        let kind = value.kind();
        if is_nil_kind(&kind) {
            return Value::Null;
        }
        if let Kind::Pointer(Some(target)) = kind {
            return self.visit(target, depth + 1);
        }

        if let Some(text) = hook_text(value) {
            return Value::String(text);
        }

        match kind {
            Kind::Bool(b) => Value::Bool(b),
            Kind::Number(n) => Value::Number(n),
            Kind::String(s) => Value::String(s.into_owned()),
            Kind::Array(items) | Kind::List(items) => Value::List(
                items
                    .into_iter()
                    .map(|item| self.visit(item, depth + 1))
                    .collect(),
            ),
            Kind::Map(entries) => {
                let mut obj = Object::with_capacity(entries.len());
                for (key, item) in entries {
                    obj.insert(key, self.visit(item, depth + 1));
                }
                Value::Object(obj)
            }
            Kind::Time(t) => Value::String(format_timestamp(&t)),
            Kind::Struct(fields) => {
                let mut obj = Object::with_capacity(fields.len());
                for field in fields {
                    let descriptor = field.descriptor;
                    if descriptor.skip {
                        continue;
                    }
                    let node = self.visit(field.value, depth + 1);
                    if descriptor.omit_if_empty && node.is_empty() {
                        continue;
                    }
                    // later declarations win on a duplicate key
                    obj.insert(descriptor.json_key, node);
                }
                Value::Object(obj)
            }
            other @ (Kind::Pointer(_)
            | Kind::Channel { .. }
            | Kind::Function { .. }
            | Kind::UnsafePointer { .. }
            | Kind::Opaque(_)) => {
                trace!(kind = other.name(), "no JSON form");
                Value::Unsupported
            }
        }
    }
}

/// Output of the marshal hook, else of the text hook.
///
/// Marshal output that is a JSON string literal is decoded; anything else is
/// kept verbatim as text. A failing marshal hook counts as absent.
pub(crate) fn hook_text(value: &dyn Reflect) -> Option<String> {
    if let Some(result) = value.marshal_json() {
        match result {
            Ok(bytes) => {
                return Some(match serde_json::from_slice::<String>(&bytes) {
                    Ok(s) => s,
                    Err(_) => String::from_utf8_lossy(&bytes).into_owned(),
                });
            }
            Err(err) => trace!(error = %err, "marshal hook failed, falling back"),
        }
    }
    value.as_text()
}

/// RFC 3339 with up to nanosecond precision and trailing zeros trimmed,
/// `Z` for UTC.
pub fn format_timestamp(t: &DateTime<FixedOffset>) -> String {
    let mut out = t.format("%Y-%m-%dT%H:%M:%S").to_string();
    let nanos = t.nanosecond() % 1_000_000_000;
    if nanos != 0 {
        let frac = format!("{:09}", nanos);
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }
    let offset = t.offset().local_minus_utc();
    if offset == 0 {
        out.push('Z');
    } else {
        let sign = if offset < 0 { '-' } else { '+' };
        let minutes = offset.unsigned_abs() / 60;
        out.push_str(&format!("{}{:02}:{:02}", sign, minutes / 60, minutes % 60));
    }
    out
}
