use std::io::{self, Write};

use serde_json::ser::{Formatter, PrettyFormatter};

use crate::number::format_canonical_f64;
use crate::options::Options;

/// `serde_json` pretty formatter with the indent from [`Options`].
///
/// Floats use the shortest plain form (`1`, `1e+21`, `1e-07`). U+2028 and
/// U+2029 are always escaped; `<`, `>` and `&` only with `escape_html`.
pub struct JsonFormatter<'a> {
    pretty: PrettyFormatter<'a>,
    escape_html: bool,
}

impl<'a> JsonFormatter<'a> {
    pub fn new(options: &'a Options) -> Self {
        Self {
            pretty: PrettyFormatter::with_indent(options.indent.as_bytes()),
            escape_html: options.escape_html,
        }
    }
}

impl Formatter for JsonFormatter<'_> {
    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(format_canonical_f64(value).as_bytes())
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        let mut start = 0;
        for (idx, ch) in fragment.char_indices() {
            let escape = match ch {
                '<' | '>' | '&' => self.escape_html,
                '\u{2028}' | '\u{2029}' => true,
                _ => false,
            };
            if escape {
                writer.write_all(fragment[start..idx].as_bytes())?;
                write!(writer, "\\u{:04x}", ch as u32)?;
                start = idx + ch.len_utf8();
            }
        }
        writer.write_all(fragment[start..].as_bytes())
    }

    fn begin_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.pretty.begin_array(writer)
    }

    fn end_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.pretty.end_array(writer)
    }

    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.pretty.begin_array_value(writer, first)
    }

    fn end_array_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.pretty.end_array_value(writer)
    }

    fn begin_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.pretty.begin_object(writer)
    }

    fn end_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.pretty.end_object(writer)
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.pretty.begin_object_key(writer, first)
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.pretty.begin_object_value(writer)
    }

    fn end_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.pretty.end_object_value(writer)
    }
}
