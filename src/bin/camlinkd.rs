//! camlinkd - MAVLink camera streaming daemon
//!
//! Usage:
//!   camlinkd [CONFIG_FILE]
//!
//! The config path falls back to the CAMLINK_CONFIG environment variable,
//! then to /etc/camlink/main.conf. A missing file runs with defaults.

use std::path::PathBuf;

use anyhow::Context;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use camlink::camera::gazebo::GazeboPlugin;
use camlink::camera::plugin::{discover, CameraPlugin};
#[cfg(feature = "v4l2")]
use camlink::camera::v4l2::V4l2Plugin;
use camlink::communication::mavlink::components::ComponentRegistry;
use camlink::communication::mavlink::dispatcher::MessageDispatcher;
use camlink::communication::mavlink::server::MavlinkServer;
use camlink::config::Config;
use camlink::rtsp::{RtspRoutes, DEFAULT_RTSP_PORT};

const DEFAULT_CONFIG_PATH: &str = "/etc/camlink/main.conf";

/// Stream name for a device URI: "/dev/video0" -> "video0".
fn stream_name(uri: &str) -> String {
    uri.rsplit('/').next().unwrap_or(uri).to_string()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("CAMLINK_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load_or_default(&PathBuf::from(&config_path))
        .with_context(|| format!("loading {config_path}"))?;

    let mut plugins: Vec<Box<dyn CameraPlugin>> = Vec::new();
    #[cfg(feature = "v4l2")]
    plugins.push(Box::new(V4l2Plugin));
    plugins.push(Box::new(GazeboPlugin::new(
        config.gazebo.enable,
        config.gazebo.uri.clone(),
    )));

    let mut registry = ComponentRegistry::new();
    for (uri, device) in discover(&plugins) {
        if let Err(err) = registry.add(stream_name(&uri), device) {
            warn!(uri = %uri, error = %err, "camera not registered");
        }
    }

    let dispatcher = MessageDispatcher::new(
        config.mavlink.system_id(),
        config.mavlink.component_id(),
        RtspRoutes::new(config.mavlink.rtsp_server_addr.clone(), DEFAULT_RTSP_PORT),
        registry,
    );

    let mut server = MavlinkServer::bind(&config.mavlink, dispatcher)
        .await
        .context("binding MAVLink UDP endpoint")?;
    server.run().await.context("serving MAVLink endpoint")?;
    Ok(())
}
