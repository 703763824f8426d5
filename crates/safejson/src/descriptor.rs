/// Per-field metadata derived from a record's `#[json("…")]` / `#[mask("…")]`
/// attributes.
///
/// The tag grammar is `key[,modifier[,modifier...]]`:
/// - `-` as the key drops the field; its value is never visited
/// - an empty key keeps the declared field name
/// - `omitempty` drops the field when its normalized value is empty
///
/// Unknown modifiers are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub source_name: &'static str,
    pub json_key: &'static str,
    pub skip: bool,
    pub omit_if_empty: bool,
    /// Masking policy tag, interpreted only by maskers.
    pub mask: Option<&'static str>,
}

impl FieldDescriptor {
    /// Untagged field: keyed by its declared name.
    pub const fn named(source_name: &'static str) -> Self {
        Self {
            source_name,
            json_key: source_name,
            skip: false,
            omit_if_empty: false,
            mask: None,
        }
    }

    pub fn parse(
        source_name: &'static str,
        json_tag: Option<&'static str>,
        mask_tag: Option<&'static str>,
    ) -> Self {
        let mut descriptor = Self::named(source_name);
        descriptor.mask = mask_tag.filter(|m| !m.is_empty());

        let Some(tag) = json_tag.filter(|t| !t.is_empty()) else {
            return descriptor;
        };
        let mut parts = tag.split(',');
        match parts.next() {
            Some("-") => {
                descriptor.skip = true;
                return descriptor;
            }
            Some("") | None => {}
            Some(key) => descriptor.json_key = key,
        }
        descriptor.omit_if_empty = parts.any(|m| m.trim() == "omitempty");
        descriptor
    }
}
