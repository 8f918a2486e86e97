use std::path::{Path, PathBuf};

/// Renders host paths for logs and error messages, resolving them when the path
/// already exists and falling back to the path as given otherwise.
pub trait HostPathExt {
    fn host_display(&self) -> String;
}

impl HostPathExt for Path {
    fn host_display(&self) -> String {
        self.canonicalize()
            .unwrap_or_else(|_| self.to_path_buf())
            .display()
            .to_string()
    }
}

impl HostPathExt for PathBuf {
    fn host_display(&self) -> String {
        self.as_path().host_display()
    }
}
