//! Normalize → encode pipeline, with an optional masking step in front.

use std::fmt;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use tracing::warn;

use crate::encode::encode_value_to_string;
use crate::mask::{DefaultMasker, Masker};
use crate::normalize::Normalizer;
use crate::options::Options;
use crate::persist::write_file;
use crate::reflect::Reflect;
use crate::value::Value;
use crate::{Error, Result};

/// Returned by [`Printer::maybe_secure_json`] whenever the secure pipeline fails.
pub const MAYBE_SECURE_FALLBACK: &str = "error printing";

/// Holds the masker and encoder settings; every operation borrows it
/// immutably, so one instance can serve any number of threads.
#[derive(Clone)]
pub struct Printer {
    masker: Arc<dyn Masker>,
    options: Options,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new(Arc::new(DefaultMasker::default()), Options::default())
    }
}

impl fmt::Debug for Printer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Printer")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Printer {
    pub fn new(masker: Arc<dyn Masker>, options: Options) -> Self {
        Self { masker, options }
    }

    pub fn with_masker(mut self, masker: Arc<dyn Masker>) -> Self {
        self.masker = masker;
        self
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn normalize(&self, value: &dyn Reflect) -> Value {
        Normalizer::from_limit(self.options.max_depth).normalize(value)
    }

    pub fn encode(&self, value: &Value) -> Result<String> {
        encode_value_to_string(value, &self.options)
    }

    /// Indented JSON text for any value.
    pub fn pretty_json(&self, value: &dyn Reflect) -> Result<String> {
        self.encode(&self.normalize(value))
    }

    /// Like [`pretty_json`](Self::pretty_json), with failures rendered as
    /// `error printing: <cause>`.
    pub fn maybe_pretty_json(&self, value: &dyn Reflect) -> String {
        self.pretty_json(value).unwrap_or_else(|err| {
            warn!(error = %err, "pretty printing failed");
            format!("error printing: {err}")
        })
    }

    pub fn mask<'a>(&self, value: &'a dyn Reflect) -> Result<Box<dyn Reflect + 'a>> {
        self.masker.mask(value).map_err(Error::Mask)
    }

    /// Masks, then pretty prints.
    pub fn secure_json(&self, value: &dyn Reflect) -> Result<String> {
        let masked = self.mask(value)?;
        self.pretty_json(&*masked)
            .map_err(|err| Error::Print(Box::new(err)))
    }

    /// Like [`secure_json`](Self::secure_json); any failure yields
    /// [`MAYBE_SECURE_FALLBACK`] so nothing unmasked can leak through the
    /// error text.
    pub fn maybe_secure_json(&self, value: &dyn Reflect) -> String {
        match self.secure_json(value) {
            Ok(out) => out,
            Err(err) => {
                warn!(error = %err, "secure printing failed");
                String::from(MAYBE_SECURE_FALLBACK)
            }
        }
    }

    /// Writes [`maybe_pretty_json`](Self::maybe_pretty_json) output to `path`,
    /// replacing any existing content.
    pub fn save_json_file(&self, path: impl AsRef<Path>, value: &dyn Reflect) -> Result<()> {
        write_file(path.as_ref(), self.maybe_pretty_json(value).as_bytes())
    }

    /// Writes [`maybe_secure_json`](Self::maybe_secure_json) output to `path`.
    pub fn save_secure_json_file(&self, path: impl AsRef<Path>, value: &dyn Reflect) -> Result<()> {
        write_file(path.as_ref(), self.maybe_secure_json(value).as_bytes())
    }
}

/// Process-wide printer behind the crate's free functions.
pub fn default_printer() -> &'static Printer {
    static DEFAULT: OnceLock<Printer> = OnceLock::new();
    DEFAULT.get_or_init(Printer::default)
}
