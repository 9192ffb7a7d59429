//! V4L2 camera device
//!
//! Wraps a Linux video4linux2 capture node. Formats and frame sizes come
//! from the kernel's enumeration ioctls; the image controls (brightness,
//! contrast, ...) map onto V4L2 control ids. Pipeline-level parameters
//! (image-size, pixel-format, scene-mode, video-size, video-format) are
//! accepted here and realised by the streaming pipeline, which is outside
//! this device's scope.

use std::path::Path;

use tracing::{debug, warn};
use v4l::control::{Control, Value};
use v4l::framesize::FrameSizeEnum;
use v4l::video::Capture;
use v4l::Device;

use crate::core::parameters::{schema, ParamStore, ParamValue};

use super::plugin::CameraPlugin;
use super::stream::{FrameSize, VideoFormat};
use super::{CameraDevice, CameraInfo, CameraMode, DeviceError};

// V4L2 user-class and camera-class control ids (videodev2.h).
const CID_USER_BASE: u32 = 0x0098_0900;
const CID_BRIGHTNESS: u32 = CID_USER_BASE;
const CID_CONTRAST: u32 = CID_USER_BASE + 1;
const CID_SATURATION: u32 = CID_USER_BASE + 2;
const CID_HUE: u32 = CID_USER_BASE + 3;
const CID_AUTO_WHITE_BALANCE: u32 = CID_USER_BASE + 12;
const CID_GAMMA: u32 = CID_USER_BASE + 16;
const CID_GAIN: u32 = CID_USER_BASE + 19;
const CID_POWER_LINE_FREQUENCY: u32 = CID_USER_BASE + 24;
const CID_WHITE_BALANCE_TEMPERATURE: u32 = CID_USER_BASE + 26;
const CID_SHARPNESS: u32 = CID_USER_BASE + 27;
const CID_BACKLIGHT_COMPENSATION: u32 = CID_USER_BASE + 28;
const CID_CAMERA_BASE: u32 = 0x009a_0900;
const CID_EXPOSURE_AUTO: u32 = CID_CAMERA_BASE + 1;
const CID_EXPOSURE_ABSOLUTE: u32 = CID_CAMERA_BASE + 2;
const CID_SCENE_MODE: u32 = CID_CAMERA_BASE + 37;

/// Plugin scanning /dev/video* capture nodes.
pub struct V4l2Plugin;

impl CameraPlugin for V4l2Plugin {
    fn name(&self) -> &'static str {
        "v4l2"
    }

    fn list_devices(&self) -> Vec<String> {
        let mut nodes = Vec::new();
        let entries = match std::fs::read_dir("/dev") {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, "cannot scan /dev for video nodes");
                return nodes;
            }
        };
        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(index) = name.strip_prefix("video") {
                if !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()) {
                    nodes.push(format!("/dev/{name}"));
                }
            }
        }
        nodes.sort();
        nodes
    }

    fn create_device(&self, uri: &str) -> Result<Box<dyn CameraDevice>, DeviceError> {
        Ok(Box::new(V4l2Camera::open(uri)?))
    }
}

pub struct V4l2Camera {
    path: String,
    info: CameraInfo,
    formats: Vec<VideoFormat>,
    store: ParamStore,
    mode: CameraMode,
}

impl V4l2Camera {
    pub fn open(path: &str) -> Result<Self, DeviceError> {
        let dev = Device::with_path(Path::new(path))?;
        let caps = dev.query_caps()?;

        if !caps
            .capabilities
            .contains(v4l::capability::Flags::VIDEO_CAPTURE)
        {
            return Err(DeviceError::Probe(format!("{path}: not a capture node")));
        }

        let formats = probe_formats(&dev);
        if formats.is_empty() {
            return Err(DeviceError::Probe(format!(
                "{path}: no discrete capture formats"
            )));
        }

        // Native resolution: the largest advertised frame size.
        let max = formats
            .iter()
            .flat_map(|f| f.frame_sizes.iter())
            .max_by_key(|fs| (fs.width, fs.height))
            .copied()
            .unwrap_or(FrameSize::new(0, 0));

        let info = CameraInfo {
            vendor_name: caps.driver.clone(),
            model_name: caps.card.clone(),
            firmware_version: 1,
            focal_length: 0.0,
            sensor_size_h: 0.0,
            sensor_size_v: 0.0,
            resolution_h: max.width.min(u16::MAX as u32) as u16,
            resolution_v: max.height.min(u16::MAX as u32) as u16,
            lens_id: 0,
            flags: 0,
            cam_definition_version: 1,
            cam_definition_uri: String::new(),
        };

        let mut camera = Self {
            path: path.to_string(),
            info,
            formats,
            store: ParamStore::new(),
            mode: CameraMode::Video,
        };
        camera.init_default_values();
        Ok(camera)
    }

    /// Seed the store with whatever the driver currently reports. Controls a
    /// driver does not expose are simply absent from the store.
    fn init_default_values(&mut self) {
        let _ = self
            .store
            .set_current(schema::CAMERA_MODE, ParamValue::Uint32(CameraMode::Video as u32));
        let _ = self
            .store
            .set_current(schema::VIDEO_SNAPSHOT_SUPPORTED, ParamValue::Uint32(0));

        for (name, cid) in control_map() {
            match self.read_control(cid) {
                Ok(raw) => {
                    let value = if name == schema::HUE {
                        ParamValue::Int32(raw as i32)
                    } else {
                        ParamValue::Uint32(raw.max(0) as u32)
                    };
                    let _ = self.store.set_current(name, value);
                }
                Err(err) => {
                    debug!(device = %self.path, param = name, error = %err, "control not readable");
                }
            }
        }
    }

    fn read_control(&self, cid: u32) -> Result<i64, DeviceError> {
        let dev = Device::with_path(Path::new(&self.path))?;
        let control = dev.control(cid)?;
        match control.value {
            Value::Integer(v) => Ok(v),
            Value::Boolean(v) => Ok(v as i64),
            _ => Err(DeviceError::Rejected(format!("control {cid:#x} type"))),
        }
    }

    fn write_control(&self, cid: u32, value: i64) -> Result<(), DeviceError> {
        let dev = Device::with_path(Path::new(&self.path))?;
        dev.set_control(Control {
            id: cid,
            value: Value::Integer(value),
        })?;
        Ok(())
    }
}

fn probe_formats(dev: &Device) -> Vec<VideoFormat> {
    let mut formats = Vec::new();
    for desc in dev.enum_formats().unwrap_or_default() {
        let mut sizes = Vec::new();
        for framesize in dev.enum_framesizes(desc.fourcc).unwrap_or_default() {
            if let FrameSizeEnum::Discrete(discrete) = framesize.size {
                sizes.push(FrameSize::new(discrete.width, discrete.height));
            }
        }
        if !sizes.is_empty() {
            formats.push(VideoFormat::new(desc.fourcc.repr, sizes));
        }
    }
    formats
}

/// Parameters backed by a V4L2 control, with their control ids.
fn control_map() -> [(&'static str, u32); 14] {
    [
        (schema::BRIGHTNESS, CID_BRIGHTNESS),
        (schema::CONTRAST, CID_CONTRAST),
        (schema::SATURATION, CID_SATURATION),
        (schema::HUE, CID_HUE),
        (schema::WHITE_BALANCE_MODE, CID_AUTO_WHITE_BALANCE),
        (schema::GAMMA, CID_GAMMA),
        (schema::GAIN, CID_GAIN),
        (schema::POWER_LINE_FREQ_MODE, CID_POWER_LINE_FREQUENCY),
        (schema::WHITE_BALANCE_TEMPERATURE, CID_WHITE_BALANCE_TEMPERATURE),
        (schema::SHARPNESS, CID_SHARPNESS),
        (schema::BACKLIGHT_COMPENSATION, CID_BACKLIGHT_COMPENSATION),
        (schema::EXPOSURE_MODE, CID_EXPOSURE_AUTO),
        (schema::EXPOSURE_ABSOLUTE, CID_EXPOSURE_ABSOLUTE),
        (schema::SCENE_MODE, CID_SCENE_MODE),
    ]
}

fn control_id(name: &str) -> Option<u32> {
    control_map()
        .iter()
        .find(|(n, _)| *n == name)
        .map(|&(_, cid)| cid)
}

impl CameraDevice for V4l2Camera {
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
        if let Some(cid) = control_id(name) {
            let raw = match value {
                ParamValue::Uint8(v) => v as i64,
                ParamValue::Int32(v) => v as i64,
                ParamValue::Uint32(v) => v as i64,
                ParamValue::Real32(v) => v.round() as i64,
            };
            return self.write_control(cid, raw);
        }

        // image-size, image-format, pixel-format, video-size, video-format:
        // realised when the streaming pipeline is (re)built.
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
