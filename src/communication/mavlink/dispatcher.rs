//! Message dispatcher
//!
//! Routes decoded MAVLink messages to the camera and parameter handlers and
//! collects their replies. COMMAND_LONG traffic is filtered by target
//! system and component before any handler runs; everything outside this
//! server's scope is dropped without a response.
//!
//! Handlers return batches of replies. A send failure aborts only the rest
//! of its own batch, which is how a failed CAMERA_INFORMATION suppresses
//! its COMMAND_ACK while one lost PARAM_EXT_VALUE leaves the rest of a
//! parameter list burst intact.

use mavlink::common::*;
use tracing::debug;

use crate::rtsp::RtspRoutes;

use super::components::ComponentRegistry;
use super::handlers;
use super::{COMP_ID_CAMERA_FIRST, COMP_ID_CAMERA_LAST};

/// Where a reply is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyDest {
    /// The datagram's source peer.
    Peer,
    /// The configured broadcast address.
    Broadcast,
}

/// One outbound message, stamped with the component id it is sent from.
pub struct Reply {
    pub component_id: u8,
    pub dest: ReplyDest,
    pub message: MavMessage,
}

impl Reply {
    pub fn to_peer(component_id: u8, message: MavMessage) -> Self {
        Self {
            component_id,
            dest: ReplyDest::Peer,
            message,
        }
    }

    pub fn broadcast(component_id: u8, message: MavMessage) -> Self {
        Self {
            component_id,
            dest: ReplyDest::Broadcast,
            message,
        }
    }
}

/// Replies whose remainder is dropped after a send failure.
pub type ReplyBatch = Vec<Reply>;

pub struct MessageDispatcher {
    system_id: u8,
    component_id: u8,
    rtsp: RtspRoutes,
    registry: ComponentRegistry,
}

impl MessageDispatcher {
    pub fn new(
        system_id: u8,
        component_id: u8,
        rtsp: RtspRoutes,
        registry: ComponentRegistry,
    ) -> Self {
        Self {
            system_id,
            component_id,
            rtsp,
            registry,
        }
    }

    pub fn system_id(&self) -> u8 {
        self.system_id
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Route one decoded message. An empty result means "no reply".
    pub fn handle_message(&mut self, message: &MavMessage) -> Vec<ReplyBatch> {
        match message {
            MavMessage::COMMAND_LONG(cmd) => {
                if cmd.target_system != self.system_id
                    || cmd.target_component < COMP_ID_CAMERA_FIRST
                    || cmd.target_component > COMP_ID_CAMERA_LAST
                {
                    return Vec::new();
                }
                self.handle_command(cmd)
            }

            MavMessage::PARAM_EXT_REQUEST_READ(req) => {
                handlers::param::request_read(&self.registry, req)
            }
            MavMessage::PARAM_EXT_REQUEST_LIST(req) => {
                handlers::param::request_list(&self.registry, req)
            }
            MavMessage::PARAM_EXT_SET(req) => handlers::param::set(&mut self.registry, req),

            // Anything else is not ours
            _ => Vec::new(),
        }
    }

    fn handle_command(&mut self, cmd: &COMMAND_LONG_DATA) -> Vec<ReplyBatch> {
        match cmd.command {
            MavCmd::MAV_CMD_REQUEST_CAMERA_INFORMATION => {
                handlers::camera::request_camera_information(&self.registry, cmd)
            }
            MavCmd::MAV_CMD_REQUEST_CAMERA_SETTINGS => {
                handlers::camera::request_camera_settings(&self.registry, cmd)
            }
            MavCmd::MAV_CMD_REQUEST_STORAGE_INFORMATION => {
                handlers::camera::request_storage_information(&self.registry, cmd)
            }
            MavCmd::MAV_CMD_REQUEST_VIDEO_STREAM_INFORMATION => {
                handlers::camera::request_video_stream_information(
                    &self.registry,
                    self.component_id,
                    &self.rtsp,
                    cmd,
                )
            }
            other => {
                debug!(command = ?other, "command unhandled, discarding");
                Vec::new()
            }
        }
    }

    /// One HEARTBEAT per bound component, addressed to broadcast.
    pub fn heartbeats(&self) -> ReplyBatch {
        self.registry
            .iter()
            .map(|(component_id, _)| {
                Reply::broadcast(
                    component_id,
                    MavMessage::HEARTBEAT(HEARTBEAT_DATA {
                        custom_mode: 0,
                        mavtype: MavType::MAV_TYPE_GENERIC,
                        autopilot: MavAutopilot::MAV_AUTOPILOT_INVALID,
                        base_mode: MavModeFlag::empty(),
                        system_status: MavState::MAV_STATE_ACTIVE,
                        mavlink_version: 3,
                    }),
                )
            })
            .collect()
    }
}
