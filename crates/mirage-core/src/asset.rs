//! Asset identity types shared between the network and asset layers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque per-caller correlation token. Allocated by the asset service so
/// that one transfer can be fanned out to many logical requesters.
pub type RequestTag = u32;

/// Errors that can occur when parsing an asset ID.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AssetIdError {
    #[error("malformed asset ID: {0}")]
    Malformed(String),

    #[error("nil asset ID is not addressable")]
    Nil,
}

/// Stable 128-bit identifier naming a downloadable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(Uuid);

impl AssetId {
    /// Create a new random asset ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an asset ID from a raw UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse an asset ID from its canonical text form.
    ///
    /// The nil UUID is rejected: servers use it as a "no asset" marker, so a
    /// download request for it can never succeed.
    pub fn parse(text: &str) -> Result<Self, AssetIdError> {
        let uuid =
            Uuid::parse_str(text).map_err(|_| AssetIdError::Malformed(text.to_string()))?;
        if uuid.is_nil() {
            return Err(AssetIdError::Nil);
        }
        Ok(Self(uuid))
    }

    /// Whether the given text is a well-formed, addressable asset ID.
    pub fn is_valid(text: &str) -> bool {
        Self::parse(text).is_ok()
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AssetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for AssetId {
    type Err = AssetIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Category of a downloadable asset.
///
/// Textures travel over their own wire messages and timeout policy; every
/// other category shares the generic asset path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetType {
    Texture,
    Mesh,
    Skeleton,
    Material,
    Sound,
    Animation,
    Generic,
}

impl AssetType {
    /// Whether this category uses the texture transfer path.
    pub fn is_texture(&self) -> bool {
        matches!(self, AssetType::Texture)
    }

    /// Display name of this category.
    pub fn name(&self) -> &'static str {
        match self {
            AssetType::Texture => "Texture",
            AssetType::Mesh => "Mesh",
            AssetType::Skeleton => "Skeleton",
            AssetType::Material => "Material",
            AssetType::Sound => "Sound",
            AssetType::Animation => "Animation",
            AssetType::Generic => "Generic",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_canonical_uuid() {
        let id = AssetId::parse("c2d9b2a4-7c4e-4b8a-9f2d-1e5a6b7c8d9e").unwrap();
        assert_eq!(id.to_string(), "c2d9b2a4-7c4e-4b8a-9f2d-1e5a6b7c8d9e");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(matches!(
            AssetId::parse("not-a-uuid"),
            Err(AssetIdError::Malformed(_))
        ));
        assert!(!AssetId::is_valid(""));
    }

    #[test]
    fn parse_rejects_nil() {
        assert!(matches!(
            AssetId::parse("00000000-0000-0000-0000-000000000000"),
            Err(AssetIdError::Nil)
        ));
    }

    #[test]
    fn texture_classification() {
        assert!(AssetType::Texture.is_texture());
        assert!(!AssetType::Mesh.is_texture());
        assert!(!AssetType::Generic.is_texture());
    }
}
