/// Encoder and normalizer settings.
#[derive(Debug, Clone)]
pub struct Options {
    /// Indentation unit repeated once per nesting level (default: one tab)
    pub indent: String,
    /// Escape `<`, `>` and `&` as `\u003c`, `\u003e`, `\u0026`
    pub escape_html: bool,
    /// Terminate the document with `\n`
    pub trailing_newline: bool,
    /// Recursion limit for the normalizer (None = unlimited). Past the limit
    /// nodes are replaced by the unsupported sentinel.
    pub max_depth: Option<usize>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            indent: String::from("\t"),
            escape_html: true,
            trailing_newline: true,
            max_depth: None,
        }
    }
}
