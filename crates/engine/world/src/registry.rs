//! Named materials and skyboxes
//!
//! Levels refer to surfaces by name. The [`Registry`] is built once, before any
//! level loads, and passed by reference into [`crate::Level::load`].

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::LevelError;

const BUILTIN_REGISTRY: &str = include_str!("../levels/registry.toml");

/// Surface description handed to the renderer
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Material {
    /// Base RGBA colour
    #[serde(default = "default_color")]
    pub color: [f32; 4],
    /// Name of a generated texture, if any
    #[serde(default)]
    pub texture: Option<String>,
    #[serde(default)]
    pub transparent: bool,
}

fn default_color() -> [f32; 4] {
    [1.0, 1.0, 1.0, 1.0]
}

/// Sky gradient
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Skybox {
    pub zenith: [f32; 3],
    pub horizon: [f32; 3],
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub materials: HashMap<String, Material>,
    #[serde(default)]
    pub skyboxes: HashMap<String, Skybox>,
}

impl Registry {
    pub fn from_toml_str(source: &str) -> Result<Self, LevelError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Materials and skyboxes of the bundled levels
    pub fn builtin() -> Result<Self, LevelError> {
        Self::from_toml_str(BUILTIN_REGISTRY)
    }

    pub fn material(&self, name: &str) -> Result<&Material, LevelError> {
        self.materials
            .get(name)
            .ok_or_else(|| LevelError::UnknownMaterial(name.to_string()))
    }

    pub fn skybox(&self, name: &str) -> Result<&Skybox, LevelError> {
        self.skyboxes
            .get(name)
            .ok_or_else(|| LevelError::UnknownSkybox(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_parses() {
        let registry = Registry::builtin().unwrap();
        assert!(registry.material("grass").is_ok());
        assert!(registry.skybox("earth_sky").is_ok());
    }

    #[test]
    fn test_unknown_names_are_errors() {
        let registry = Registry::default();
        assert!(matches!(
            registry.material("lava"),
            Err(LevelError::UnknownMaterial(name)) if name == "lava"
        ));
        assert!(matches!(
            registry.skybox("void"),
            Err(LevelError::UnknownSkybox(_))
        ));
    }

    #[test]
    fn test_material_defaults() {
        let registry = Registry::from_toml_str(
            r#"
            [materials.plain]

            [materials.glass]
            color = [0.5, 0.5, 1.0, 0.3]
            transparent = true
            "#,
        )
        .unwrap();

        let plain = registry.material("plain").unwrap();
        assert_eq!(plain.color, [1.0; 4]);
        assert!(plain.texture.is_none());
        assert!(registry.material("glass").unwrap().transparent);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = Registry::from_path("/nonexistent/registry.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/registry.toml"));
    }
}
