//! Camera discovery plugins
//!
//! Each plugin knows how to enumerate one family of cameras and turn a
//! device URI into a live `CameraDevice`. Discovery failures are logged and
//! never fatal: a broken node must not keep the rest of the cameras off the
//! network.

use tracing::{info, warn};

use super::{CameraDevice, DeviceError};

pub trait CameraPlugin {
    fn name(&self) -> &'static str;

    /// Device URIs this plugin can currently instantiate.
    fn list_devices(&self) -> Vec<String>;

    fn create_device(&self, uri: &str) -> Result<Box<dyn CameraDevice>, DeviceError>;
}

/// Walk every plugin and instantiate whatever it advertises.
pub fn discover(plugins: &[Box<dyn CameraPlugin>]) -> Vec<(String, Box<dyn CameraDevice>)> {
    let mut devices = Vec::new();
    for plugin in plugins {
        for uri in plugin.list_devices() {
            match plugin.create_device(&uri) {
                Ok(device) => {
                    info!(plugin = plugin.name(), uri = %uri, "camera discovered");
                    devices.push((uri, device));
                }
                Err(err) => {
                    warn!(plugin = plugin.name(), uri = %uri, error = %err, "skipping camera");
                }
            }
        }
    }
    devices
}
