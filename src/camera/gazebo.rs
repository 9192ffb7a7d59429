//! Simulated Gazebo camera
//!
//! A virtual feed standing in for the camera sensor of a simulated vehicle.
//! All parameters are store-only; the advertised formats mirror what the
//! simulator renders.

use crate::core::parameters::{schema, ParamStore, ParamValue};

use super::plugin::CameraPlugin;
use super::stream::{FrameSize, VideoFormat};
use super::{CameraDevice, CameraInfo, CameraMode, DeviceError};

pub const DEFAULT_GAZEBO_URI: &str = "gazebo://camera";

/// Plugin returning the static simulated camera list.
pub struct GazeboPlugin {
    enabled: bool,
    uri: String,
}

impl GazeboPlugin {
    pub fn new(enabled: bool, uri: impl Into<String>) -> Self {
        Self {
            enabled,
            uri: uri.into(),
        }
    }
}

impl CameraPlugin for GazeboPlugin {
    fn name(&self) -> &'static str {
        "gazebo"
    }

    fn list_devices(&self) -> Vec<String> {
        if self.enabled {
            vec![self.uri.clone()]
        } else {
            Vec::new()
        }
    }

    fn create_device(&self, uri: &str) -> Result<Box<dyn CameraDevice>, DeviceError> {
        if uri != self.uri {
            return Err(DeviceError::UnknownUri(uri.to_string()));
        }
        Ok(Box::new(GazeboCamera::new(uri)))
    }
}

pub struct GazeboCamera {
    info: CameraInfo,
    formats: Vec<VideoFormat>,
    store: ParamStore,
    mode: CameraMode,
}

impl GazeboCamera {
    pub fn new(uri: &str) -> Self {
        let info = CameraInfo {
            vendor_name: "Gazebo".to_string(),
            model_name: uri.to_string(),
            firmware_version: 1,
            focal_length: 3.6,
            sensor_size_h: 4.8,
            sensor_size_v: 3.6,
            resolution_h: 1920,
            resolution_v: 1080,
            lens_id: 0,
            flags: 0,
            cam_definition_version: 1,
            cam_definition_uri: String::new(),
        };

        let formats = vec![VideoFormat::new(
            *b"RGB3",
            vec![
                FrameSize::new(640, 480),
                FrameSize::new(1280, 720),
                FrameSize::new(1920, 1080),
            ],
        )];

        let mut store = ParamStore::new();
        for mode in 0u32..=2 {
            let _ = store.set_supported(schema::CAMERA_MODE, ParamValue::Uint32(mode));
        }
        for wb in 0u32..=7 {
            let _ = store.set_supported(schema::WHITE_BALANCE_MODE, ParamValue::Uint32(wb));
        }
        for exp in 0u32..=1 {
            let _ = store.set_supported(schema::EXPOSURE_MODE, ParamValue::Uint32(exp));
        }

        let defaults = [
            (schema::CAMERA_MODE, ParamValue::Uint32(CameraMode::Video as u32)),
            (schema::BRIGHTNESS, ParamValue::Uint32(56)),
            (schema::CONTRAST, ParamValue::Uint32(32)),
            (schema::SATURATION, ParamValue::Uint32(64)),
            (schema::HUE, ParamValue::Int32(0)),
            (schema::WHITE_BALANCE_MODE, ParamValue::Uint32(0)),
            (schema::GAMMA, ParamValue::Uint32(100)),
            (schema::GAIN, ParamValue::Uint32(0)),
            (schema::EXPOSURE_MODE, ParamValue::Uint32(0)),
            (schema::VIDEO_SNAPSHOT_SUPPORTED, ParamValue::Uint32(0)),
        ];
        for (name, value) in defaults {
            let _ = store.set_current(name, value);
        }

        Self {
            info,
            formats,
            store,
            mode: CameraMode::Video,
        }
    }
}

impl CameraDevice for GazeboCamera {
    fn info(&self) -> &CameraInfo {
        &self.info
    }

    fn formats(&self) -> &[VideoFormat] {
        &self.formats
    }

    fn store(&self) -> &ParamStore {
        &self.store
    }

    fn store_mut(&mut self) -> &mut ParamStore {
        &mut self.store
    }

    fn apply_param(&mut self, _name: &str, _value: ParamValue) -> Result<(), DeviceError> {
        // Simulated feed: nothing to push to hardware.
        Ok(())
    }

    fn set_mode(&mut self, mode: CameraMode) -> Result<(), DeviceError> {
        self.mode = mode;
        Ok(())
    }

    fn mode(&self) -> CameraMode {
        self.mode
    }
}
