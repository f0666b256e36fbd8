//! Last-edited source persistence.
//!
//! The viewer reopens whatever the user last built; a missing or unreadable
//! session file falls back to the built-in sample.

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};

/// Built-in sample used on first launch.
pub const DEFAULT_SOURCE: &str = "\
public final class HelloWorld {

    public static void main(final String[] args) {

        System.out.println(\"Hello, world!\");

    }

}
";

fn session_file(home: &Utf8Path) -> Utf8PathBuf {
    home.join("session.src")
}

/// Load the last-edited source, falling back to the sample.
pub fn load(home: &Utf8Path) -> String {
    let path = session_file(home);
    match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => {
            debug!("no session at {path} ({e}), using the built-in sample");
            DEFAULT_SOURCE.to_string()
        }
    }
}

/// Save the source for the next launch. Best-effort: a failed save is
/// logged, never fatal.
pub fn save(home: &Utf8Path, text: &str) {
    let path = session_file(home);
    if let Err(e) = atomic_write(&path, text.as_bytes()) {
        warn!("failed to save session to {path}: {e}");
    }
}

/// Write via a temp file in the same directory plus a rename, so the session
/// is never left half-written.
fn atomic_write(path: &Utf8Path, contents: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Utf8Path::new("."));
    std::fs::create_dir_all(parent)?;

    let temp = tempfile::Builder::new()
        .prefix(".tmp-")
        .tempfile_in(parent)
        .map_err(std::io::Error::other)?;

    let temp_path = temp.into_temp_path();
    std::fs::write(&temp_path, contents)?;

    temp_path
        .persist(path)
        .map_err(|e| std::io::Error::other(format!("failed to persist temp file: {e}")))?;

    Ok(())
}
