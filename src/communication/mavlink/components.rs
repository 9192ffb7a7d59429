//! Camera component registry
//!
//! Binds camera devices to MAVLink component ids in the camera range
//! (MAV_COMP_ID_CAMERA through MAV_COMP_ID_CAMERA6, six slots). Assignment
//! is first-free ascending. Each binding couples the device with its
//! advertised video stream.

use std::collections::BTreeMap;

use crate::camera::stream::VideoStream;
use crate::camera::CameraDevice;
use crate::core::parameters::{schema, ParamError, ParamType, ParamValue};

use super::{COMP_ID_CAMERA_FIRST, COMP_ID_CAMERA_LAST};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("all camera component slots are bound")]
    OutOfSlots,
}

/// One camera bound to a component id: the device plus its stream.
pub struct CameraComponent {
    device: Box<dyn CameraDevice>,
    stream: VideoStream,
    stream_name: String,
}

impl CameraComponent {
    fn new(stream_name: String, device: Box<dyn CameraDevice>, stream_id: u8) -> Self {
        let stream = VideoStream::new(stream_id, device.formats().to_vec());
        Self {
            device,
            stream,
            stream_name,
        }
    }

    pub fn device(&self) -> &dyn CameraDevice {
        self.device.as_ref()
    }

    pub fn stream(&self) -> &VideoStream {
        &self.stream
    }

    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    /// Write a parameter through the device, then apply component-level
    /// side effects. `video-size` carries the requested stream resolution
    /// packed as `(width << 16) | height`; a zero half clears the selection,
    /// anything else resolves against the advertised formats.
    pub fn set_param(&mut self, name: &str, value: ParamValue) -> Result<(), ParamError> {
        self.device.set_param(name, value)?;

        if name == schema::VIDEO_SIZE {
            if let ParamValue::Uint32(packed) = value {
                let width = packed >> 16;
                let height = packed & 0xFFFF;
                if width == 0 || height == 0 {
                    self.stream.clear_selection();
                } else {
                    self.stream.select(width, height);
                }
            }
        }

        Ok(())
    }

    pub fn get_param(&self, name: &str) -> Result<ParamValue, ParamError> {
        self.device.get_param(name)
    }

    pub fn param_type(&self, name: &str) -> Result<ParamType, ParamError> {
        self.device.param_type(name)
    }

    pub fn param_list(&self) -> Vec<(&'static str, ParamValue)> {
        self.device.param_list()
    }
}

pub struct ComponentRegistry {
    slots: BTreeMap<u8, CameraComponent>,
    next_stream_id: u8,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self {
            slots: BTreeMap::new(),
            next_stream_id: 1,
        }
    }

    /// Bind a device at the first free component id.
    pub fn add(
        &mut self,
        stream_name: String,
        device: Box<dyn CameraDevice>,
    ) -> Result<u8, RegistryError> {
        for id in COMP_ID_CAMERA_FIRST..=COMP_ID_CAMERA_LAST {
            if self.slots.contains_key(&id) {
                continue;
            }
            let stream_id = self.next_stream_id;
            self.next_stream_id = self.next_stream_id.wrapping_add(1);
            self.slots
                .insert(id, CameraComponent::new(stream_name, device, stream_id));
            return Ok(id);
        }
        Err(RegistryError::OutOfSlots)
    }

    /// Unbind a component id. No-op on unknown ids.
    pub fn remove(&mut self, component_id: u8) -> Option<CameraComponent> {
        self.slots.remove(&component_id)
    }

    pub fn lookup(&self, component_id: u8) -> Option<&CameraComponent> {
        if !(COMP_ID_CAMERA_FIRST..=COMP_ID_CAMERA_LAST).contains(&component_id) {
            return None;
        }
        self.slots.get(&component_id)
    }

    pub fn lookup_mut(&mut self, component_id: u8) -> Option<&mut CameraComponent> {
        if !(COMP_ID_CAMERA_FIRST..=COMP_ID_CAMERA_LAST).contains(&component_id) {
            return None;
        }
        self.slots.get_mut(&component_id)
    }

    /// Bound components in ascending component-id order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &CameraComponent)> {
        self.slots.iter().map(|(&id, component)| (id, component))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::mock::MockCamera;

    fn add_mock(registry: &mut ComponentRegistry) -> Result<u8, RegistryError> {
        registry.add("video0".to_string(), Box::new(MockCamera::with_defaults()))
    }

    #[test]
    fn test_assignment_is_first_free_ascending() {
        let mut registry = ComponentRegistry::new();
        for expected in COMP_ID_CAMERA_FIRST..=COMP_ID_CAMERA_LAST {
            assert_eq!(add_mock(&mut registry).unwrap(), expected);
        }
        assert!(matches!(
            add_mock(&mut registry),
            Err(RegistryError::OutOfSlots)
        ));
    }

    #[test]
    fn test_removed_slot_is_reused() {
        let mut registry = ComponentRegistry::new();
        for _ in 0..6 {
            add_mock(&mut registry).unwrap();
        }

        assert!(registry.remove(102).is_some());
        assert_eq!(add_mock(&mut registry).unwrap(), 102);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut registry = ComponentRegistry::new();
        add_mock(&mut registry).unwrap();
        assert!(registry.remove(104).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_outside_camera_range() {
        let mut registry = ComponentRegistry::new();
        add_mock(&mut registry).unwrap();
        assert!(registry.lookup(1).is_none());
        assert!(registry.lookup(99).is_none());
        assert!(registry.lookup(106).is_none());
        assert!(registry.lookup(100).is_some());
    }

    #[test]
    fn test_stream_ids_unique() {
        let mut registry = ComponentRegistry::new();
        add_mock(&mut registry).unwrap();
        add_mock(&mut registry).unwrap();
        let ids: Vec<u8> = registry.iter().map(|(_, c)| c.stream().id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_video_size_param_drives_selection() {
        let mut registry = ComponentRegistry::new();
        let id = add_mock(&mut registry).unwrap();
        let component = registry.lookup_mut(id).unwrap();

        component
            .set_param(schema::VIDEO_SIZE, ParamValue::Uint32((1000 << 16) | 1000))
            .unwrap();
        let selected = component.stream().selected_frame_size().unwrap();
        assert_eq!((selected.width, selected.height), (640, 480));

        component
            .set_param(schema::VIDEO_SIZE, ParamValue::Uint32(0))
            .unwrap();
        assert!(component.stream().selected_frame_size().is_none());
    }
}
