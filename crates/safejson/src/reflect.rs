//! Runtime view of a value as one of a closed set of kinds.
//!
//! [`Reflect`] is the only thing the normalizer knows about its input. A type
//! reports its [`Kind`] (with borrowed children for containers and records)
//! and may expose two serialization hooks that take precedence over the
//! structural walk: [`Reflect::marshal_json`] and [`Reflect::as_text`].
//!
//! Records are usually described with `#[derive(Reflect)]`; the impls in this
//! module cover primitives, std containers and smart pointers, and a few
//! third-party types behind features.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt::Display;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, SyncSender};
use std::time::Duration;

use thiserror::Error;

use crate::descriptor::FieldDescriptor;
use crate::value::{Number, Value};

/// Failure reported by a [`Reflect::marshal_json`] hook.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct MarshalError(String);

impl MarshalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<serde_json::Error> for MarshalError {
    fn from(err: serde_json::Error) -> Self {
        Self(err.to_string())
    }
}

/// One record field paired with its descriptor.
pub struct Field<'a> {
    pub descriptor: &'a FieldDescriptor,
    pub value: &'a dyn Reflect,
}

impl<'a> Field<'a> {
    pub fn new(descriptor: &'a FieldDescriptor, value: &'a dyn Reflect) -> Self {
        Self { descriptor, value }
    }
}

/// The closed set of shapes a reflected value can take.
pub enum Kind<'a> {
    Bool(bool),
    Number(Number),
    String(Cow<'a, str>),
    /// Fixed-size sequence; never nil.
    Array(Vec<&'a dyn Reflect>),
    /// Growable sequence.
    List(Vec<&'a dyn Reflect>),
    /// Associative container with keys already rendered as text.
    Map(Vec<(String, &'a dyn Reflect)>),
    /// Record fields in declaration order.
    Struct(Vec<Field<'a>>),
    /// Calendar time.
    Time(chrono::DateTime<chrono::FixedOffset>),
    /// Nilable reference; `None` is nil.
    Pointer(Option<&'a dyn Reflect>),
    Channel { nil: bool },
    Function { nil: bool },
    UnsafePointer { nil: bool },
    /// Anything the reflection layer does not model. Carries a short type label.
    Opaque(&'static str),
}

impl Kind<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Bool(_) => "bool",
            Kind::Number(_) => "number",
            Kind::String(_) => "string",
            Kind::Array(_) => "array",
            Kind::List(_) => "list",
            Kind::Map(_) => "map",
            Kind::Struct(_) => "struct",
            Kind::Time(_) => "time",
            Kind::Pointer(_) => "pointer",
            Kind::Channel { .. } => "channel",
            Kind::Function { .. } => "function",
            Kind::UnsafePointer { .. } => "unsafe pointer",
            Kind::Opaque(label) => *label,
        }
    }
}

pub trait Reflect {
    fn kind(&self) -> Kind<'_>;

    /// Self-serialization to JSON bytes. Takes priority over every structural
    /// rule, time formatting included. An `Err` makes the normalizer fall
    /// back to the remaining rules.
    fn marshal_json(&self) -> Option<Result<Vec<u8>, MarshalError>> {
        None
    }

    /// Text rendering, consulted when there is no marshal hook.
    fn as_text(&self) -> Option<String> {
        None
    }
}

impl Reflect for bool {
    fn kind(&self) -> Kind<'_> {
        Kind::Bool(*self)
    }
}

macro_rules! reflect_number {
    ($($t:ty),*) => {
        $(impl Reflect for $t {
            fn kind(&self) -> Kind<'_> {
                Kind::Number(Number::from(*self))
            }
        })*
    };
}

reflect_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl Reflect for str {
    fn kind(&self) -> Kind<'_> {
        Kind::String(Cow::Borrowed(self))
    }
}

impl Reflect for String {
    fn kind(&self) -> Kind<'_> {
        Kind::String(Cow::Borrowed(self.as_str()))
    }
}

impl Reflect for Cow<'_, str> {
    fn kind(&self) -> Kind<'_> {
        Kind::String(Cow::Borrowed(self.as_ref()))
    }
}

impl Reflect for char {
    fn kind(&self) -> Kind<'_> {
        Kind::String(Cow::Owned(self.to_string()))
    }
}

impl Reflect for () {
    fn kind(&self) -> Kind<'_> {
        Kind::Opaque("()")
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn kind(&self) -> Kind<'_> {
        Kind::Array(self.iter().map(|v| v as &dyn Reflect).collect())
    }
}

impl<T: Reflect> Reflect for [T] {
    fn kind(&self) -> Kind<'_> {
        Kind::List(self.iter().map(|v| v as &dyn Reflect).collect())
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn kind(&self) -> Kind<'_> {
        Kind::List(self.iter().map(|v| v as &dyn Reflect).collect())
    }
}

impl<T: Reflect> Reflect for VecDeque<T> {
    fn kind(&self) -> Kind<'_> {
        Kind::List(self.iter().map(|v| v as &dyn Reflect).collect())
    }
}

impl<K: Display, V: Reflect, S> Reflect for HashMap<K, V, S> {
    fn kind(&self) -> Kind<'_> {
        Kind::Map(
            self.iter()
                .map(|(k, v)| (k.to_string(), v as &dyn Reflect))
                .collect(),
        )
    }
}

impl<K: Display, V: Reflect> Reflect for BTreeMap<K, V> {
    fn kind(&self) -> Kind<'_> {
        Kind::Map(
            self.iter()
                .map(|(k, v)| (k.to_string(), v as &dyn Reflect))
                .collect(),
        )
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn kind(&self) -> Kind<'_> {
        Kind::Pointer(self.as_ref().map(|v| v as &dyn Reflect))
    }
}

// References and owning pointers are transparent: they can never be nil, so
// reporting the target's kind and hooks is the same as unwrapping them.
macro_rules! reflect_transparent {
    ($($ptr:ident),*) => {
        $(impl<T: Reflect + ?Sized> Reflect for $ptr<T> {
            fn kind(&self) -> Kind<'_> {
                (**self).kind()
            }
            fn marshal_json(&self) -> Option<Result<Vec<u8>, MarshalError>> {
                (**self).marshal_json()
            }
            fn as_text(&self) -> Option<String> {
                (**self).as_text()
            }
        })*
    };
}

reflect_transparent!(Box, Rc, Arc);

impl<T: Reflect + ?Sized> Reflect for &T {
    fn kind(&self) -> Kind<'_> {
        (**self).kind()
    }
    fn marshal_json(&self) -> Option<Result<Vec<u8>, MarshalError>> {
        (**self).marshal_json()
    }
    fn as_text(&self) -> Option<String> {
        (**self).as_text()
    }
}

impl<T: Reflect + ?Sized> Reflect for &mut T {
    fn kind(&self) -> Kind<'_> {
        (**self).kind()
    }
    fn marshal_json(&self) -> Option<Result<Vec<u8>, MarshalError>> {
        (**self).marshal_json()
    }
    fn as_text(&self) -> Option<String> {
        (**self).as_text()
    }
}

impl<T> Reflect for Sender<T> {
    fn kind(&self) -> Kind<'_> {
        Kind::Channel { nil: false }
    }
}

impl<T> Reflect for SyncSender<T> {
    fn kind(&self) -> Kind<'_> {
        Kind::Channel { nil: false }
    }
}

impl<T> Reflect for Receiver<T> {
    fn kind(&self) -> Kind<'_> {
        Kind::Channel { nil: false }
    }
}

macro_rules! reflect_fn {
    ($($arg:ident),*) => {
        impl<R, $($arg),*> Reflect for fn($($arg),*) -> R {
            fn kind(&self) -> Kind<'_> {
                Kind::Function { nil: false }
            }
        }
    };
}

reflect_fn!();
reflect_fn!(A);
reflect_fn!(A, B);
reflect_fn!(A, B, C);

impl<T: ?Sized> Reflect for *const T {
    fn kind(&self) -> Kind<'_> {
        Kind::UnsafePointer { nil: self.is_null() }
    }
}

impl<T: ?Sized> Reflect for *mut T {
    fn kind(&self) -> Kind<'_> {
        Kind::UnsafePointer { nil: self.is_null() }
    }
}

/// Durations are nanosecond counts that render as text (`1.5s`).
impl Reflect for Duration {
    fn kind(&self) -> Kind<'_> {
        Kind::Number(Number::U64(u64::try_from(self.as_nanos()).unwrap_or(u64::MAX)))
    }

    fn as_text(&self) -> Option<String> {
        Some(format!("{:?}", self))
    }
}

impl<Tz: chrono::TimeZone> Reflect for chrono::DateTime<Tz> {
    fn kind(&self) -> Kind<'_> {
        Kind::Time(self.fixed_offset())
    }
}

#[cfg(feature = "uuid")]
impl Reflect for uuid::Uuid {
    fn kind(&self) -> Kind<'_> {
        Kind::Array(self.as_bytes().iter().map(|b| b as &dyn Reflect).collect())
    }

    fn as_text(&self) -> Option<String> {
        Some(self.hyphenated().to_string())
    }
}

impl Reflect for serde_json::Value {
    fn kind(&self) -> Kind<'_> {
        use serde_json::Value as Json;
        match self {
            Json::Null => Kind::Pointer(None),
            Json::Bool(b) => Kind::Bool(*b),
            Json::Number(n) => Kind::Number(json_number(n)),
            Json::String(s) => Kind::String(Cow::Borrowed(s.as_str())),
            Json::Array(items) => Kind::List(items.iter().map(|v| v as &dyn Reflect).collect()),
            Json::Object(map) => Kind::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), v as &dyn Reflect))
                    .collect(),
            ),
        }
    }
}

fn json_number(n: &serde_json::Number) -> Number {
    if let Some(i) = n.as_i64() {
        Number::I64(i)
    } else if let Some(u) = n.as_u64() {
        Number::U64(u)
    } else {
        Number::F64(n.as_f64().unwrap_or_default())
    }
}

/// A normalized tree normalizes to itself.
impl Reflect for Value {
    fn kind(&self) -> Kind<'_> {
        match self {
            Value::Null => Kind::Pointer(None),
            Value::Bool(b) => Kind::Bool(*b),
            Value::Number(n) => Kind::Number(*n),
            Value::String(s) => Kind::String(Cow::Borrowed(s.as_str())),
            Value::List(items) => Kind::List(items.iter().map(|v| v as &dyn Reflect).collect()),
            Value::Object(obj) => Kind::Map(
                obj.iter()
                    .map(|(k, v)| (k.to_string(), v as &dyn Reflect))
                    .collect(),
            ),
            Value::Unsupported => Kind::Opaque("unsupported"),
        }
    }
}

/// Routes any `serde::Serialize` type through the marshal hook, so serde's
/// own attributes decide its JSON form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Json<T>(pub T);

impl<T: serde::Serialize> Reflect for Json<T> {
    fn kind(&self) -> Kind<'_> {
        Kind::Opaque("serde value")
    }

    fn marshal_json(&self) -> Option<Result<Vec<u8>, MarshalError>> {
        Some(serde_json::to_vec(&self.0).map_err(MarshalError::from))
    }
}

/// Renders any `Display` type through the text hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Text<T>(pub T);

impl<T: Display> Reflect for Text<T> {
    fn kind(&self) -> Kind<'_> {
        Kind::Opaque("display value")
    }

    fn as_text(&self) -> Option<String> {
        Some(self.0.to_string())
    }
}
