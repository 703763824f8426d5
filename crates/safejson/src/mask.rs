//! Masking capability consumed by the secure printing pipeline.
//!
//! A [`Masker`] takes any reflected value and returns a structurally similar
//! value with sensitive parts rewritten. The pipeline only depends on the
//! trait; [`DefaultMasker`] is the convenience instance used when callers do
//! not inject their own.

use std::borrow::Cow;
use std::str::FromStr;

use thiserror::Error;

use crate::descriptor::FieldDescriptor;
use crate::nilness::is_nil_kind;
use crate::normalize::hook_text;
use crate::reflect::{Field, Kind, MarshalError, Reflect};

#[derive(Debug, Error)]
pub enum MaskError {
    #[error("unknown masking policy: {0:?}")]
    UnknownPolicy(String),

    #[error("{0}")]
    Message(String),
}

/// Rewrites sensitive parts of a value. Implementations must be safe to share
/// across threads; the printer calls them concurrently.
pub trait Masker: Send + Sync {
    fn mask<'a>(&self, target: &'a dyn Reflect) -> Result<Box<dyn Reflect + 'a>, MaskError>;
}

/// Hands the input back untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMasker;

impl Masker for NoopMasker {
    fn mask<'a>(&self, target: &'a dyn Reflect) -> Result<Box<dyn Reflect + 'a>, MaskError> {
        Ok(Box::new(target))
    }
}

/// Redaction rule named by a `#[mask("…")]` tag.
///
/// | tag | effect |
/// |-----|--------|
/// | `filledN` | exactly `N` mask characters, whatever the input length |
/// | `revealN` | keep the first and last `N` characters, fill the middle |
/// | `fill` | every character replaced |
/// | `none` | untouched |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Filled(usize),
    Reveal(usize),
    Fill,
    Keep,
}

impl Policy {
    /// Applies the policy. Empty input stays empty under every policy.
    pub fn apply(&self, input: &str, mask_char: char) -> String {
        if input.is_empty() {
            return String::new();
        }
        let len = input.chars().count();
        match *self {
            Policy::Filled(width) => core::iter::repeat_n(mask_char, width).collect(),
            Policy::Fill => core::iter::repeat_n(mask_char, len).collect(),
            Policy::Reveal(n) if len <= n * 2 => core::iter::repeat_n(mask_char, len).collect(),
            Policy::Reveal(n) => {
                let mut out = String::with_capacity(input.len());
                out.extend(input.chars().take(n));
                out.extend(core::iter::repeat_n(mask_char, len - n * 2));
                out.extend(input.chars().skip(len - n));
                out
            }
            Policy::Keep => input.to_string(),
        }
    }
}

impl FromStr for Policy {
    type Err = MaskError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let tag = tag.trim();
        let width = |digits: &str| {
            digits
                .parse::<usize>()
                .map_err(|_| MaskError::UnknownPolicy(tag.to_string()))
        };
        match tag {
            "fill" => Ok(Policy::Fill),
            "none" => Ok(Policy::Keep),
            _ => {
                if let Some(digits) = tag.strip_prefix("filled") {
                    Ok(Policy::Filled(width(digits)?))
                } else if let Some(digits) = tag.strip_prefix("reveal") {
                    Ok(Policy::Reveal(width(digits)?))
                } else {
                    Err(MaskError::UnknownPolicy(tag.to_string()))
                }
            }
        }
    }
}

/// Field and key names masked even without a `#[mask]` tag, with the policy
/// each one gets. Credentials are fully hidden; bearer tokens keep their ends.
pub const DEFAULT_SENSITIVE_KEYS: &[(&str, Policy)] = &[
    ("password", Policy::Filled(32)),
    ("signing_key", Policy::Filled(32)),
    ("signingkey", Policy::Filled(32)),
    ("authorization", Policy::Filled(32)),
    ("access_token", Policy::Reveal(4)),
    ("refresh_token", Policy::Reveal(4)),
];

/// Tag-driven masker.
///
/// Struct fields carrying a `#[mask("…")]` tag get that policy. Struct fields
/// and map entries whose key matches a sensitive key (case-insensitively) get
/// that key's policy, or the default policy when the key was added without
/// one. A policy covers everything below it: strings, text
/// and marshal hook output are rewritten; numbers, booleans and unsupported
/// kinds pass through.
#[derive(Debug, Clone)]
pub struct DefaultMasker {
    mask_char: char,
    sensitive_keys: Vec<(String, Option<Policy>)>,
    default_policy: Policy,
}

impl Default for DefaultMasker {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl DefaultMasker {
    pub fn builder() -> DefaultMaskerBuilder {
        DefaultMaskerBuilder {
            mask_char: '*',
            sensitive_keys: DEFAULT_SENSITIVE_KEYS
                .iter()
                .map(|(key, policy)| (key.to_string(), Some(*policy)))
                .collect(),
            default_policy: Policy::Filled(32),
        }
    }

    pub fn mask_char(&self) -> char {
        self.mask_char
    }

    pub fn is_sensitive_key(&self, key: &str) -> bool {
        self.sensitive_policy(key).is_some()
    }

    /// Policy applied to an untagged field or map entry named `key`.
    pub fn sensitive_policy(&self, key: &str) -> Option<Policy> {
        self.sensitive_keys
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, policy)| policy.unwrap_or(self.default_policy))
    }

    fn field_policy(&self, descriptor: &FieldDescriptor) -> Result<Option<Policy>, MaskError> {
        match descriptor.mask {
            Some(tag) => tag.parse().map(Some),
            None => Ok(self.sensitive_policy(descriptor.json_key)),
        }
    }

    fn walk<'a>(&self, value: &'a dyn Reflect, policy: Option<Policy>) -> Result<Masked<'a>, MaskError> {
        let kind = value.kind();
        if is_nil_kind(&kind) {
            return Ok(Masked::Keep(value));
        }
        let kind = match kind {
            Kind::Pointer(Some(target)) => return self.walk(target, policy),
            other => other,
        };

        if let Some(policy) = policy {
            if let Some(text) = hook_text(value) {
                return Ok(Masked::Text(policy.apply(&text, self.mask_char)));
            }
        } else if value.marshal_json().is_some() || value.as_text().is_some() {
            // hooked values serialize as a unit; nothing below them is visited
            return Ok(Masked::Keep(value));
        }

        Ok(match kind {
            Kind::String(s) => match policy {
                Some(policy) => Masked::Text(policy.apply(&s, self.mask_char)),
                None => Masked::Keep(value),
            },
            Kind::Array(items) => Masked::Array(self.walk_all(items, policy)?),
            Kind::List(items) => Masked::List(self.walk_all(items, policy)?),
            Kind::Map(entries) => {
                let mut out = Vec::with_capacity(entries.len());
                for (key, item) in entries {
                    let entry_policy = self.sensitive_policy(&key).or(policy);
                    let masked = self.walk(item, entry_policy)?;
                    out.push((key, masked));
                }
                Masked::Map(out)
            }
            Kind::Struct(fields) => {
                let mut out = Vec::with_capacity(fields.len());
                for field in fields {
                    let masked = if field.descriptor.skip {
                        Masked::Keep(field.value)
                    } else {
                        let field_policy = self.field_policy(field.descriptor)?.or(policy);
                        self.walk(field.value, field_policy)?
                    };
                    out.push((field.descriptor, masked));
                }
                Masked::Struct(out)
            }
            _ => Masked::Keep(value),
        })
    }

    fn walk_all<'a>(
        &self,
        items: Vec<&'a dyn Reflect>,
        policy: Option<Policy>,
    ) -> Result<Vec<Masked<'a>>, MaskError> {
        items.into_iter().map(|item| self.walk(item, policy)).collect()
    }
}

impl Masker for DefaultMasker {
    fn mask<'a>(&self, target: &'a dyn Reflect) -> Result<Box<dyn Reflect + 'a>, MaskError> {
        Ok(Box::new(self.walk(target, None)?))
    }
}

pub struct DefaultMaskerBuilder {
    mask_char: char,
    sensitive_keys: Vec<(String, Option<Policy>)>,
    default_policy: Policy,
}

impl DefaultMaskerBuilder {
    pub fn mask_char(mut self, mask_char: char) -> Self {
        self.mask_char = mask_char;
        self
    }

    /// Adds a key to the sensitive list, masked with the default policy.
    pub fn sensitive_key(mut self, key: impl Into<String>) -> Self {
        self.sensitive_keys.push((key.into(), None));
        self
    }

    /// Adds a key masked with its own policy. Replaces an earlier entry for
    /// the same key.
    pub fn sensitive_key_policy(mut self, key: impl Into<String>, policy: Policy) -> Self {
        let key = key.into();
        self.sensitive_keys.retain(|(k, _)| !k.eq_ignore_ascii_case(&key));
        self.sensitive_keys.push((key, Some(policy)));
        self
    }

    /// Replaces the sensitive list, defaults included. Every key gets the
    /// default policy.
    pub fn sensitive_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sensitive_keys = keys.into_iter().map(|k| (k.into(), None)).collect();
        self
    }

    /// Policy for sensitive keys added without one (`filled32` unless set).
    pub fn default_policy(mut self, policy: Policy) -> Self {
        self.default_policy = policy;
        self
    }

    pub fn build(self) -> DefaultMasker {
        DefaultMasker {
            mask_char: self.mask_char,
            sensitive_keys: self.sensitive_keys,
            default_policy: self.default_policy,
        }
    }
}

/// Masked mirror of a value graph. Untouched subtrees are borrowed.
enum Masked<'a> {
    Keep(&'a dyn Reflect),
    Text(String),
    Array(Vec<Masked<'a>>),
    List(Vec<Masked<'a>>),
    Map(Vec<(String, Masked<'a>)>),
    Struct(Vec<(&'a FieldDescriptor, Masked<'a>)>),
}

impl Reflect for Masked<'_> {
    fn kind(&self) -> Kind<'_> {
        match self {
            Masked::Keep(inner) => inner.kind(),
            Masked::Text(s) => Kind::String(Cow::Borrowed(s.as_str())),
            Masked::Array(items) => Kind::Array(items.iter().map(|m| m as &dyn Reflect).collect()),
            Masked::List(items) => Kind::List(items.iter().map(|m| m as &dyn Reflect).collect()),
            Masked::Map(entries) => Kind::Map(
                entries
                    .iter()
                    .map(|(k, m)| (k.clone(), m as &dyn Reflect))
                    .collect(),
            ),
            Masked::Struct(fields) => Kind::Struct(
                fields
                    .iter()
                    .map(|(descriptor, m)| Field::new(descriptor, m))
                    .collect(),
            ),
        }
    }

    fn marshal_json(&self) -> Option<Result<Vec<u8>, MarshalError>> {
        match self {
            Masked::Keep(inner) => inner.marshal_json(),
            _ => None,
        }
    }

    fn as_text(&self) -> Option<String> {
        match self {
            Masked::Keep(inner) => inner.as_text(),
            _ => None,
        }
    }
}
