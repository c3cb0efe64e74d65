use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{LogoError, LogoResult};
use crate::text::bitmap::BitmapFace;
use crate::text::face::FontFace;
use crate::text::outline::OutlineFace;

/// Key of the always-available built-in bitmap face.
pub const BUILTIN_FONT: &str = "mono";

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Registry key of a font face (file stem for loaded fonts).
pub struct FontId(pub String);

impl FontId {
    /// Construct a font id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id of the built-in bitmap face.
    pub fn builtin() -> Self {
        Self::new(BUILTIN_FONT)
    }

    /// Borrow the key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FontId {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Display for FontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FontId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Immutable-after-setup map of font faces shared by all render workers.
#[derive(Clone)]
pub struct FontRegistry {
    faces: BTreeMap<FontId, Arc<dyn FontFace>>,
}

impl fmt::Debug for FontRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontRegistry")
            .field("ids", &self.faces.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl FontRegistry {
    /// Registry holding only the built-in bitmap face under [`BUILTIN_FONT`].
    pub fn with_builtin() -> Self {
        let mut faces: BTreeMap<FontId, Arc<dyn FontFace>> = BTreeMap::new();
        faces.insert(FontId::builtin(), Arc::new(BitmapFace::new()));
        Self { faces }
    }

    /// Register (or replace) a face.
    pub fn register(&mut self, id: FontId, face: Arc<dyn FontFace>) {
        self.faces.insert(id, face);
    }

    /// Register every `.ttf`, `.otf` and `.ttc` file in `dir` under its file stem.
    ///
    /// Returns the ids that were added, in directory-sorted order.
    pub fn load_dir(&mut self, dir: &Path) -> LogoResult<Vec<FontId>> {
        let mut paths = std::fs::read_dir(dir)
            .with_context(|| format!("read fonts dir '{}'", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .map(|e| matches!(e.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc"))
                    .unwrap_or(false)
            })
            .collect::<Vec<_>>();
        paths.sort();

        let mut added = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let bytes = std::fs::read(&path)
                .with_context(|| format!("read font '{}'", path.display()))?;
            let face = OutlineFace::from_bytes(bytes).map_err(|e| {
                LogoError::decode(format!("font '{}': {e}", path.display()))
            })?;
            let id = FontId::new(stem);
            tracing::debug!(font = %id, family = face.family(), "registered font");
            self.faces.insert(id.clone(), Arc::new(face));
            added.push(id);
        }
        Ok(added)
    }

    /// Look up a face.
    pub fn get(&self, id: &FontId) -> Option<Arc<dyn FontFace>> {
        self.faces.get(id).cloned()
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: &FontId) -> bool {
        self.faces.contains_key(id)
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &FontId> {
        self.faces.keys()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/registry.rs"]
mod tests;
