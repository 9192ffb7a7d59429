//! Camera device abstraction
//!
//! A `CameraDevice` is the uniform surface the MAVLink side talks to,
//! whether the camera is a real V4L2 node or a simulated feed. Devices own
//! their parameter store; the shared `set_param` flow validates against the
//! schema, runs the device-side setter, and only then records the value.

pub mod gazebo;
pub mod mock;
pub mod plugin;
pub mod stream;
#[cfg(feature = "v4l2")]
pub mod v4l2;

use crate::core::parameters::{schema, ParamError, ParamSchema, ParamStore, ParamType, ParamValue};

/// Device-side failure
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("device i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("device rejected {0}")]
    Rejected(String),

    #[error("device probe failed: {0}")]
    Probe(String),

    #[error("unknown device uri {0:?}")]
    UnknownUri(String),
}

/// Camera operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    Preview = 0,
    Still = 1,
    Video = 2,
}

impl CameraMode {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(CameraMode::Preview),
            1 => Some(CameraMode::Still),
            2 => Some(CameraMode::Video),
            _ => None,
        }
    }
}

/// Static per-device record advertised through CAMERA_INFORMATION.
///
/// Immutable after device init. String fields are truncated to the wire
/// field widths (32/32/140 bytes) when emitted.
#[derive(Debug, Clone)]
pub struct CameraInfo {
    pub vendor_name: String,
    pub model_name: String,
    pub firmware_version: u32,
    pub focal_length: f32,
    /// Sensor size, millimetres.
    pub sensor_size_h: f32,
    pub sensor_size_v: f32,
    /// Native resolution, pixels.
    pub resolution_h: u16,
    pub resolution_v: u16,
    pub lens_id: u8,
    /// CAMERA_CAP_FLAGS bitmask.
    pub flags: u32,
    pub cam_definition_version: u16,
    pub cam_definition_uri: String,
}

/// Uniform surface over real and simulated cameras.
pub trait CameraDevice: Send {
    fn info(&self) -> &CameraInfo;

    /// Advertised capture formats, in advertisement order.
    fn formats(&self) -> &[stream::VideoFormat];

    fn store(&self) -> &ParamStore;

    fn store_mut(&mut self) -> &mut ParamStore;

    /// Device-side effect of a parameter write. Called after schema and
    /// supported-set validation, before the store is updated. Store-only
    /// parameters accept and do nothing.
    fn apply_param(&mut self, name: &str, value: ParamValue) -> Result<(), DeviceError>;

    fn set_mode(&mut self, mode: CameraMode) -> Result<(), DeviceError>;

    fn mode(&self) -> CameraMode;

    /// Validate, dispatch to the device, and record the new value.
    ///
    /// Writing `camera-mode` switches the device mode; the store is left
    /// untouched when the device rejects the write.
    fn set_param(&mut self, name: &str, value: ParamValue) -> Result<(), ParamError> {
        let canonical = self.store().validate(name, value)?;

        if canonical == schema::CAMERA_MODE {
            if let ParamValue::Uint32(raw) = value {
                let mode = CameraMode::from_u32(raw)
                    .ok_or_else(|| ParamError::Unsupported(canonical.to_string()))?;
                self.set_mode(mode).map_err(|source| ParamError::Device {
                    name: canonical.to_string(),
                    source,
                })?;
            }
        }

        self.apply_param(canonical, value)
            .map_err(|source| ParamError::Device {
                name: canonical.to_string(),
                source,
            })?;
        self.store_mut().set_current(canonical, value)
    }

    fn get_param(&self, name: &str) -> Result<ParamValue, ParamError> {
        self.store().get_current(name)
    }

    fn param_type(&self, name: &str) -> Result<ParamType, ParamError> {
        ParamSchema::global()
            .lookup(name)
            .map(|e| e.param_type)
            .ok_or_else(|| ParamError::UnknownParam(name.to_string()))
    }

    /// Current values in schema order.
    fn param_list(&self) -> Vec<(&'static str, ParamValue)> {
        self.store().list_current()
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockCamera;
    use super::*;
    use crate::core::parameters::schema;

    #[test]
    fn test_set_param_records_value() {
        let mut camera = MockCamera::with_defaults();
        camera
            .set_param(schema::BRIGHTNESS, ParamValue::Uint32(200))
            .unwrap();
        assert_eq!(
            camera.get_param(schema::BRIGHTNESS).unwrap(),
            ParamValue::Uint32(200)
        );
        // The device-side setter saw exactly this write
        assert_eq!(
            camera.applied(),
            &[(schema::BRIGHTNESS.to_string(), ParamValue::Uint32(200))]
        );
    }

    #[test]
    fn test_camera_mode_param_switches_mode() {
        let mut camera = MockCamera::with_defaults();
        assert_eq!(camera.mode(), CameraMode::Video);

        camera
            .set_param(schema::CAMERA_MODE, ParamValue::Uint32(CameraMode::Still as u32))
            .unwrap();
        assert_eq!(camera.mode(), CameraMode::Still);
        assert_eq!(
            camera.get_param(schema::CAMERA_MODE).unwrap(),
            ParamValue::Uint32(CameraMode::Still as u32)
        );
    }

    #[test]
    fn test_camera_mode_param_rejects_unknown_mode() {
        let mut camera = MockCamera::with_defaults();
        let err = camera
            .set_param(schema::CAMERA_MODE, ParamValue::Uint32(9))
            .unwrap_err();
        assert!(matches!(err, ParamError::Unsupported(_)));
        assert_eq!(camera.mode(), CameraMode::Video);
    }

    #[test]
    fn test_device_rejection_leaves_store() {
        let mut camera = MockCamera::with_defaults().failing_on(schema::BRIGHTNESS);
        let before = camera.get_param(schema::BRIGHTNESS).unwrap();

        let err = camera
            .set_param(schema::BRIGHTNESS, ParamValue::Uint32(200))
            .unwrap_err();
        assert!(matches!(err, ParamError::Device { .. }));
        assert_eq!(camera.get_param(schema::BRIGHTNESS).unwrap(), before);
    }

    #[test]
    fn test_param_type_delegates_to_schema() {
        let camera = MockCamera::with_defaults();
        assert_eq!(
            camera.param_type(schema::HUE).unwrap(),
            ParamType::Int32
        );
        assert!(matches!(
            camera.param_type("zoom"),
            Err(ParamError::UnknownParam(_))
        ));
    }

    #[test]
    fn test_mode_round_trip() {
        let mut camera = MockCamera::with_defaults();
        camera.set_mode(CameraMode::Still).unwrap();
        assert_eq!(camera.mode(), CameraMode::Still);
    }
}
