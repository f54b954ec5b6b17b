//! Calling surfaces and their relevant dimensions.
//!
//! A surface is anything that asks "may this agent/prompt/tool run here?":
//! the chat copilot, a prompt property action, a tool picker. Each surface
//! declares which rule dimensions it evaluates. Dimensions it does not
//! declare are ignored, so a surface that only knows its section and entity
//! type is never blocked by a workspace constraint it cannot see.
//!
//! Surfaces are configuration, not code. The built-in set can be extended or
//! overridden from a JSON file:
//!
//! ```json
//! {
//!   "surfaces": {
//!     "copilot": { "dimensions": ["section", "entityType", "workspace"] },
//!     "toolPicker": { "dimensions": ["section"] }
//!   }
//! }
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use super::dimension::{DimensionSet, ScopeDimension, UnknownDimension};

/// Built-in surface used by the chat copilot.
pub const COPILOT_SURFACE: &str = "copilot";

/// Built-in surface used by prompt property actions.
pub const PROMPT_SURFACE: &str = "prompt";

/// Errors that can occur while loading surface configuration.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read surface config: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid JSON for the expected shape.
    #[error("invalid surface config: {0}")]
    Json(#[from] serde_json::Error),

    /// A surface names a dimension that does not exist.
    #[error("unknown dimension '{0}'")]
    UnknownDimension(String),

    /// A structurally valid file with an invalid entry.
    #[error("invalid surface '{surface}': {message}")]
    Invalid {
        /// Offending surface name.
        surface: String,
        /// What is wrong with it.
        message: String,
    },
}

impl From<UnknownDimension> for SurfaceConfigError {
    fn from(err: UnknownDimension) -> Self {
        Self::UnknownDimension(err.0)
    }
}

/// Surface configuration file format.
#[derive(Debug, Deserialize)]
pub struct SurfaceConfigFile {
    /// Map of surface name to surface entry.
    #[serde(default)]
    pub surfaces: HashMap<String, SurfaceEntry>,
}

/// Individual surface entry.
#[derive(Debug, Deserialize)]
pub struct SurfaceEntry {
    /// Dimension names, matched case-insensitively.
    pub dimensions: Vec<String>,
}

/// Maps surface names to their relevant dimensions.
#[derive(Debug, Clone, Default)]
pub struct SurfaceRegistry {
    surfaces: HashMap<String, DimensionSet>,
}

impl SurfaceRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in surfaces: `copilot` and `prompt`.
    pub fn builtin() -> Self {
        Self::new()
            .with_surface(
                COPILOT_SURFACE,
                DimensionSet::from([ScopeDimension::Section, ScopeDimension::EntityType]),
            )
            .with_surface(
                PROMPT_SURFACE,
                DimensionSet::from([
                    ScopeDimension::ContentTypeAlias,
                    ScopeDimension::PropertyAlias,
                    ScopeDimension::PropertyEditorUiAlias,
                ]),
            )
    }

    /// Register (or replace) a surface.
    pub fn with_surface(mut self, name: impl Into<String>, dimensions: DimensionSet) -> Self {
        self.register(name, dimensions);
        self
    }

    /// Register (or replace) a surface in place.
    pub fn register(&mut self, name: impl Into<String>, dimensions: DimensionSet) {
        self.surfaces.insert(name.into(), dimensions);
    }

    /// Relevant dimensions for a surface.
    pub fn dimensions(&self, surface: &str) -> Option<&DimensionSet> {
        self.surfaces.get(surface)
    }

    /// Registered surface names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.surfaces.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Merge entries from a parsed config file, replacing same-named surfaces.
    pub fn merge(&mut self, file: SurfaceConfigFile) -> Result<(), SurfaceConfigError> {
        for (name, entry) in file.surfaces {
            if name.trim().is_empty() {
                return Err(SurfaceConfigError::Invalid {
                    surface: name,
                    message: "surface name is empty".to_string(),
                });
            }
            let dimensions = DimensionSet::parse(&entry.dimensions)?;
            self.register(name, dimensions);
        }
        Ok(())
    }
}

/// Parse surface configuration from a JSON string on top of the built-ins.
pub fn parse_surface_config(json: &str) -> Result<SurfaceRegistry, SurfaceConfigError> {
    let file: SurfaceConfigFile = serde_json::from_str(json)?;
    let mut registry = SurfaceRegistry::builtin();
    registry.merge(file)?;
    Ok(registry)
}

/// Load surface configuration from a JSON file on top of the built-ins.
pub async fn load_surface_config(
    path: impl AsRef<Path>,
) -> Result<SurfaceRegistry, SurfaceConfigError> {
    let content = tokio::fs::read_to_string(path.as_ref()).await?;
    let registry = parse_surface_config(&content)?;
    tracing::debug!(
        path = %path.as_ref().display(),
        surfaces = ?registry.names(),
        "loaded surface config"
    );
    Ok(registry)
}
