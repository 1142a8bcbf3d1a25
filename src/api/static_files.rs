use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};

/// Serve the dashboard frontend from a directory.
///
/// Paths that match no file fall back to `index.html` so client-side
/// routes resolve.
pub fn static_service(dir: &str) -> ServeDir<ServeFile> {
    let index = Path::new(dir).join("index.html");
    ServeDir::new(dir).fallback(ServeFile::new(index))
}
