use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::Result;

/// Creates or truncates `path` and writes `contents`. New files get mode
/// `0o644` on Unix.
pub(crate) fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }
    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.flush()?;
    Ok(())
}
