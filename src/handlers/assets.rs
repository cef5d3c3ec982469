use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};
use tracing::warn;

pub const INDEX_FILE: &str = "index.html";

// GET / -> <static_dir>/index.html
pub fn index_file(static_dir: &Path) -> ServeFile {
    ServeFile::new(static_dir.join(INDEX_FILE))
}

// Everything that isn't a named route. Missing files come back as 404.
pub fn static_files(static_dir: &Path) -> ServeDir {
    ServeDir::new(static_dir)
}

// A missing asset directory isn't fatal, the API still works; just say so.
// Returns whether the launcher page is there.
pub fn check_static_dir(static_dir: &Path) -> bool {
    if !static_dir.is_dir() {
        warn!(dir = %static_dir.display(), "static directory not found, every asset request will 404");
        return false;
    }
    let index = static_dir.join(INDEX_FILE);
    if !index.is_file() {
        warn!(file = %index.display(), "launcher page missing");
        return false;
    }
    true
}
