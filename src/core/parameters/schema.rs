//! Static parameter schema
//!
//! Maps every parameter name the daemon understands to a numeric id and a
//! scalar type. Names and ids are both unique; the mapping is a bijection
//! fixed at build time. Iteration order is the insertion order below and is
//! stable across runs, which also defines the order of PARAM_EXT_REQUEST_LIST
//! responses.

use std::sync::OnceLock;

use super::ParamType;

pub const CAMERA_MODE: &str = "camera-mode";
pub const BRIGHTNESS: &str = "brightness";
pub const CONTRAST: &str = "contrast";
pub const SATURATION: &str = "saturation";
pub const HUE: &str = "hue";
pub const WHITE_BALANCE_MODE: &str = "wb-mode";
pub const GAMMA: &str = "gamma";
pub const GAIN: &str = "gain";
pub const POWER_LINE_FREQ_MODE: &str = "power-mode";
pub const WHITE_BALANCE_TEMPERATURE: &str = "wb-temp";
pub const SHARPNESS: &str = "sharpness";
pub const BACKLIGHT_COMPENSATION: &str = "backlight";
pub const EXPOSURE_MODE: &str = "exp-mode";
pub const EXPOSURE_ABSOLUTE: &str = "exp-absolute";
pub const IMAGE_SIZE: &str = "image-size";
pub const IMAGE_FORMAT: &str = "image-format";
pub const PIXEL_FORMAT: &str = "pixel-format";
pub const SCENE_MODE: &str = "scene-mode";
pub const VIDEO_SIZE: &str = "video-size";
pub const VIDEO_FRAME_FORMAT: &str = "video-format";
pub const VIDEO_SNAPSHOT_SUPPORTED: &str = "video-snapshot";

/// One schema entry: `(name, id, type)`.
#[derive(Debug, Clone, Copy)]
pub struct SchemaEntry {
    pub name: &'static str,
    pub id: u32,
    pub param_type: ParamType,
}

/// Registry of every parameter the daemon understands.
pub struct ParamSchema {
    entries: Vec<SchemaEntry>,
}

impl ParamSchema {
    /// Shared schema instance, populated on first use.
    pub fn global() -> &'static ParamSchema {
        static SCHEMA: OnceLock<ParamSchema> = OnceLock::new();
        SCHEMA.get_or_init(ParamSchema::standard)
    }

    fn standard() -> Self {
        let names: [(&'static str, ParamType); 21] = [
            (CAMERA_MODE, ParamType::Uint32),
            (BRIGHTNESS, ParamType::Uint32),
            (CONTRAST, ParamType::Uint32),
            (SATURATION, ParamType::Uint32),
            (HUE, ParamType::Int32),
            (WHITE_BALANCE_MODE, ParamType::Uint32),
            (GAMMA, ParamType::Uint32),
            (GAIN, ParamType::Uint32),
            (POWER_LINE_FREQ_MODE, ParamType::Uint32),
            (WHITE_BALANCE_TEMPERATURE, ParamType::Uint32),
            (SHARPNESS, ParamType::Uint32),
            (BACKLIGHT_COMPENSATION, ParamType::Uint32),
            (EXPOSURE_MODE, ParamType::Uint32),
            (EXPOSURE_ABSOLUTE, ParamType::Uint32),
            (IMAGE_SIZE, ParamType::Uint32),
            (IMAGE_FORMAT, ParamType::Uint32),
            (PIXEL_FORMAT, ParamType::Uint32),
            (SCENE_MODE, ParamType::Uint32),
            (VIDEO_SIZE, ParamType::Uint32),
            (VIDEO_FRAME_FORMAT, ParamType::Uint32),
            (VIDEO_SNAPSHOT_SUPPORTED, ParamType::Uint32),
        ];

        let entries = names
            .iter()
            .enumerate()
            .map(|(idx, &(name, param_type))| SchemaEntry {
                name,
                id: idx as u32 + 1,
                param_type,
            })
            .collect();

        Self { entries }
    }

    pub fn lookup(&self, name: &str) -> Option<&SchemaEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn lookup_by_id(&self, id: u32) -> Option<&SchemaEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SchemaEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
