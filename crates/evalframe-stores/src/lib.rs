//! evalframe-stores — collaborator adapters for evalframe.
//!
//! Each adapter implements one of the collaborator traits from
//! [`evalframe_core`] on top of the local filesystem or a child process, so
//! the handlers can run outside the hosted platform.

pub mod blobs;
pub mod evaluator;
pub mod params;
pub mod sink;

pub use blobs::FsBlobStore;
pub use evaluator::CommandEvaluator;
pub use params::FsParameterStore;
pub use sink::JsonLinesSink;

use std::path::{Component, Path, PathBuf};

/// Resolve a slash-separated name below `root`, refusing anything that could
/// escape it (`..`, absolute components, empty names).
pub(crate) fn resolve_under(root: &Path, name: &str) -> Option<PathBuf> {
    let relative = Path::new(name.trim_start_matches('/'));
    let mut path = root.to_path_buf();
    let mut segments = 0;
    for component in relative.components() {
        match component {
            Component::Normal(segment) => {
                path.push(segment);
                segments += 1;
            }
            Component::CurDir => {}
            _ => return None,
        }
    }
    (segments > 0).then_some(path)
}
