use std::path::Path;

use anyhow::Context;
use sdkscope::VersionRegistry;

/// Load the SDK version table from a properties file.
pub fn load_registry(path: &Path) -> anyhow::Result<VersionRegistry> {
    VersionRegistry::from_properties_file(path)
        .with_context(|| format!("failed to load SDK table: {}", path.display()))
}
