//! Engine configuration
//!
//! Loaded from TOML; every field has a default, so an empty file is valid.
//!
//! # Example
//!
//! ```toml
//! image_base_url = "https://cdn.example.com/"   # Prefix for uploaded image fills
//! room_photo_url = "https://cdn.example.com/room.jpg"
//! cache_capacity = 256                          # Parsed designs kept in memory
//!
//! [surfaces.swatch]
//! rows = 8
//! cols = 30
//! cell_px = 48
//!
//! [surfaces.room]
//! rows = 16
//! cols = 32
//!
//! [export]
//! cell_px = 300
//! title_suffix = "Custom Tile"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::error::{TileError, TileResult};
use crate::export::ExportOptions;
use crate::scene::{MAX_GRID_SIZE, SceneOptions};
use crate::surface::SurfaceKind;

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Prefix joined to relative image-fill paths.
    pub image_base_url: String,

    /// Background photo of the room surface.
    pub room_photo_url: Option<String>,

    /// Most parsed designs kept in memory at once.
    pub cache_capacity: usize,

    /// Grid size and cell size per live surface.
    pub surfaces: SurfacesConfig,

    /// Static export settings.
    pub export: ExportConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            image_base_url: String::new(),
            room_photo_url: None,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            surfaces: SurfacesConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

/// `[surfaces]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfacesConfig {
    pub single: GridConfig,
    pub swatch: GridConfig,
    pub room: GridConfig,
}

impl Default for SurfacesConfig {
    fn default() -> Self {
        Self {
            single: GridConfig::new(1, 1, 240.0),
            swatch: GridConfig::new(8, 30, 60.0),
            room: GridConfig::new(16, 32, 60.0),
        }
    }
}

impl SurfacesConfig {
    /// Grid settings of one surface
    pub fn get(&self, kind: SurfaceKind) -> &GridConfig {
        match kind {
            SurfaceKind::Single => &self.single,
            SurfaceKind::Swatch => &self.swatch,
            SurfaceKind::Room => &self.room,
        }
    }

    pub fn get_mut(&mut self, kind: SurfaceKind) -> &mut GridConfig {
        match kind {
            SurfaceKind::Single => &mut self.single,
            SurfaceKind::Swatch => &mut self.swatch,
            SurfaceKind::Room => &mut self.room,
        }
    }
}

/// Grid dimensions of one surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
    /// Cell edge length in CSS pixels.
    pub cell_px: f64,
}

impl GridConfig {
    pub const fn new(rows: usize, cols: usize, cell_px: f64) -> Self {
        Self { rows, cols, cell_px }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::new(1, 1, 60.0)
    }
}

/// `[export]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Edge length of the exported tile in CSS pixels.
    pub cell_px: f64,
    /// Appended to the tile name in exported page titles.
    pub title_suffix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        let options = ExportOptions::default();
        Self { cell_px: options.cell_px, title_suffix: options.title_suffix }
    }
}

impl ExportConfig {
    pub fn options(&self) -> ExportOptions {
        ExportOptions { cell_px: self.cell_px, title_suffix: self.title_suffix.clone() }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// `TileError::Config` on TOML errors or out-of-range values.
    pub fn from_toml_str(text: &str) -> TileResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    ///
    /// # Errors
    ///
    /// `TileError::Config` when the file cannot be read or is invalid.
    pub fn load(path: impl AsRef<Path>) -> TileResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| TileError::config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// `TileError::Config` naming the first offending field.
    pub fn validate(&self) -> TileResult<()> {
        if self.cache_capacity == 0 {
            return Err(TileError::config("cache_capacity must be at least 1"));
        }
        for kind in SurfaceKind::ALL {
            let grid = self.surfaces.get(kind);
            for (field, value) in [("rows", grid.rows), ("cols", grid.cols)] {
                if !(1..=MAX_GRID_SIZE).contains(&value) {
                    return Err(TileError::config(format!(
                        "surfaces.{kind}.{field} must be within 1..={MAX_GRID_SIZE}, got {value}"
                    )));
                }
            }
            check_cell_px(&format!("surfaces.{kind}.cell_px"), grid.cell_px)?;
        }
        check_cell_px("export.cell_px", self.export.cell_px)
    }

    /// Scene options of one surface
    pub fn scene_options(&self, kind: SurfaceKind) -> SceneOptions {
        SceneOptions {
            cell_px: self.surfaces.get(kind).cell_px,
            room_photo_url: match kind {
                SurfaceKind::Room => self.room_photo_url.clone(),
                _ => None,
            },
        }
    }

    /// Absolute URL of an uploaded image.
    ///
    /// Absolute and `data:` URLs pass through unchanged.
    pub fn image_url(&self, path: &str) -> String {
        if is_absolute_url(path) || self.image_base_url.is_empty() {
            return path.to_string();
        }
        let base = self.image_base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

fn check_cell_px(field: &str, value: f64) -> TileResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TileError::config(format!("{field} must be a positive number, got {value}")))
    }
}

fn is_absolute_url(s: &str) -> bool {
    s.starts_with("data:") || s.starts_with("//") || s.contains("://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_document() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.surfaces.swatch.rows, 8);
        assert_eq!(config.surfaces.swatch.cols, 30);
        assert_eq!(config.surfaces.room.rows, 16);
        assert_eq!(config.surfaces.room.cols, 32);
        assert_eq!(config.surfaces.single.rows, 1);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = EngineConfig::from_toml_str(
            "room_photo_url = \"https://cdn.example.com/room.jpg\"\n[surfaces.room]\nrows = 75\ncols = 75",
        )
        .unwrap();
        assert_eq!(config.surfaces.room.rows, 75);
        assert_eq!(config.surfaces.room.cell_px, 60.0);
        assert_eq!(config.surfaces.swatch.cols, 30);

        let options = config.scene_options(SurfaceKind::Room);
        assert_eq!(options.room_photo_url.as_deref(), Some("https://cdn.example.com/room.jpg"));
        assert_eq!(config.scene_options(SurfaceKind::Swatch).room_photo_url, None);
    }

    #[test]
    fn test_validation() {
        let err = EngineConfig::from_toml_str("[surfaces.swatch]\nrows = 76").unwrap_err();
        assert_eq!(
            err.to_string(),
            "config error: surfaces.swatch.rows must be within 1..=75, got 76"
        );

        assert!(EngineConfig::from_toml_str("[export]\ncell_px = 0").is_err());
        assert!(EngineConfig::from_toml_str("cache_capacity = 0").is_err());
        assert!(EngineConfig::from_toml_str("[surfaces.room]\ncols = 0").is_err());
        assert!(matches!(
            EngineConfig::from_toml_str("surfaces = 3"),
            Err(TileError::Config(_))
        ));
    }

    #[test]
    fn test_round_trip() {
        let mut config = EngineConfig::default();
        config.image_base_url = "https://cdn.example.com".into();
        config.export.title_suffix = "Sample".into();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_image_url() {
        let mut config = EngineConfig::default();
        assert_eq!(config.image_url("uploads/a.png"), "uploads/a.png");

        config.image_base_url = "https://cdn.example.com/".into();
        assert_eq!(config.image_url("/uploads/a.png"), "https://cdn.example.com/uploads/a.png");
        assert_eq!(config.image_url("https://other.example.com/b.png"), "https://other.example.com/b.png");
        assert_eq!(config.image_url("data:image/png;base64,AAAA"), "data:image/png;base64,AAAA");
    }

    #[test]
    fn test_load_missing_file() {
        let err = EngineConfig::load("/nonexistent/tilegrid.toml").unwrap_err();
        assert!(matches!(err, TileError::Config(_)));
    }
}
