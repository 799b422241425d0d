pub mod fonts;
pub mod render;
pub mod validate;

use std::path::Path;

use burnsub_caption_model::CaptionSet;

/// Read a serialized caption set.
pub fn load_captions(path: &Path) -> anyhow::Result<CaptionSet> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    let set = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse caption set {}: {e}", path.display()))?;
    Ok(set)
}
