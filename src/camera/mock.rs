//! Scriptable in-memory camera used by tests.

use crate::core::parameters::{schema, ParamStore, ParamValue};

use super::stream::{FrameSize, VideoFormat};
use super::{CameraDevice, CameraInfo, CameraMode, DeviceError};

pub struct MockCamera {
    info: CameraInfo,
    formats: Vec<VideoFormat>,
    store: ParamStore,
    mode: CameraMode,
    /// Parameter whose device-side setter is scripted to fail.
    failing: Option<&'static str>,
    /// Every apply_param call seen, in order.
    applied: Vec<(String, ParamValue)>,
}

impl MockCamera {
    pub fn new(info: CameraInfo, formats: Vec<VideoFormat>) -> Self {
        let mut store = ParamStore::new();
        let defaults = [
            (schema::CAMERA_MODE, ParamValue::Uint32(CameraMode::Video as u32)),
            (schema::BRIGHTNESS, ParamValue::Uint32(64)),
            (schema::CONTRAST, ParamValue::Uint32(32)),
            (schema::SATURATION, ParamValue::Uint32(32)),
            (schema::HUE, ParamValue::Int32(0)),
            (schema::VIDEO_SNAPSHOT_SUPPORTED, ParamValue::Uint32(0)),
        ];
        for (name, value) in defaults {
            // Defaults come from the closed schema; this cannot fail.
            let _ = store.set_current(name, value);
        }

        Self {
            info,
            formats,
            store,
            mode: CameraMode::Video,
            failing: None,
            applied: Vec::new(),
        }
    }

    /// A 1920x1080-capable camera with the usual ladder of sizes.
    pub fn with_defaults() -> Self {
        let info = CameraInfo {
            vendor_name: "Intel".to_string(),
            model_name: "X".to_string(),
            firmware_version: 1,
            focal_length: 2.8,
            sensor_size_h: 4.6,
            sensor_size_v: 3.5,
            resolution_h: 1920,
            resolution_v: 1080,
            lens_id: 0,
            flags: 0,
            cam_definition_version: 1,
            cam_definition_uri: String::new(),
        };
        let formats = vec![VideoFormat::new(
            *b"YUYV",
            vec![
                FrameSize::new(640, 480),
                FrameSize::new(1280, 720),
                FrameSize::new(1920, 1080),
            ],
        )];
        Self::new(info, formats)
    }

    /// Script the device-side setter for `name` to fail.
    pub fn failing_on(mut self, name: &'static str) -> Self {
        self.failing = Some(name);
        self
    }

    pub fn applied(&self) -> &[(String, ParamValue)] {
        &self.applied
    }
}

impl CameraDevice for MockCamera {
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

    fn apply_param(&mut self, name: &str, value: ParamValue) -> Result<(), DeviceError> {
        if self.failing == Some(name) {
            return Err(DeviceError::Rejected(name.to_string()));
        }
        self.applied.push((name.to_string(), value));
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
