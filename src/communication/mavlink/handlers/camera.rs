//! Camera protocol handlers
//!
//! COMMAND_LONG requests for camera information, settings, storage, and
//! video stream information. Every flow except the stream-information
//! request ends with a COMMAND_ACK; the ack reports ACCEPTED exactly when
//! the target component exists.

use mavlink::common::*;

use crate::camera::CameraInfo;
use crate::rtsp::RtspRoutes;

use super::super::components::ComponentRegistry;
use super::super::dispatcher::{Reply, ReplyBatch};
use super::pad_bytes;

fn ack(cmd: &COMMAND_LONG_DATA, success: bool) -> Reply {
    Reply::to_peer(
        cmd.target_component,
        MavMessage::COMMAND_ACK(COMMAND_ACK_DATA {
            command: cmd.command,
            result: if success {
                MavResult::MAV_RESULT_ACCEPTED
            } else {
                MavResult::MAV_RESULT_FAILED
            },
        }),
    )
}

pub fn request_camera_information(
    registry: &ComponentRegistry,
    cmd: &COMMAND_LONG_DATA,
) -> Vec<ReplyBatch> {
    if cmd.param1 != 1.0 {
        return vec![vec![ack(cmd, true)]];
    }

    match registry.lookup(cmd.target_component) {
        Some(component) => {
            let info = camera_information(component.device().info());
            vec![vec![
                Reply::to_peer(cmd.target_component, info),
                ack(cmd, true),
            ]]
        }
        None => vec![vec![ack(cmd, false)]],
    }
}

fn camera_information(info: &CameraInfo) -> MavMessage {
    MavMessage::CAMERA_INFORMATION(CAMERA_INFORMATION_DATA {
        time_boot_ms: 0,
        firmware_version: info.firmware_version,
        focal_length: info.focal_length,
        sensor_size_h: info.sensor_size_h,
        sensor_size_v: info.sensor_size_v,
        flags: CameraCapFlags::from_bits_truncate(info.flags),
        resolution_h: info.resolution_h,
        resolution_v: info.resolution_v,
        cam_definition_version: info.cam_definition_version,
        vendor_name: pad_bytes::<32>(info.vendor_name.as_bytes()),
        model_name: pad_bytes::<32>(info.model_name.as_bytes()),
        lens_id: info.lens_id,
        cam_definition_uri: pad_bytes::<140>(info.cam_definition_uri.as_bytes()),
    })
}

pub fn request_camera_settings(
    registry: &ComponentRegistry,
    cmd: &COMMAND_LONG_DATA,
) -> Vec<ReplyBatch> {
    if cmd.param1 != 1.0 {
        return vec![vec![ack(cmd, true)]];
    }

    match registry.lookup(cmd.target_component) {
        Some(_) => {
            // TODO: plumb the actual device mode once the pipeline reports it
            let settings = MavMessage::CAMERA_SETTINGS(CAMERA_SETTINGS_DATA {
                time_boot_ms: 0,
                mode_id: CameraMode::CAMERA_MODE_VIDEO,
            });
            vec![vec![
                Reply::to_peer(cmd.target_component, settings),
                ack(cmd, true),
            ]]
        }
        None => vec![vec![ack(cmd, false)]],
    }
}

pub fn request_storage_information(
    registry: &ComponentRegistry,
    cmd: &COMMAND_LONG_DATA,
) -> Vec<ReplyBatch> {
    if cmd.param1 != 1.0 {
        return vec![vec![ack(cmd, true)]];
    }

    match registry.lookup(cmd.target_component) {
        Some(_) => {
            let storage = MavMessage::STORAGE_INFORMATION(STORAGE_INFORMATION_DATA {
                time_boot_ms: 0,
                total_capacity: 50.0,
                used_capacity: 0.0,
                available_capacity: 50.0,
                read_speed: 128.0,
                write_speed: 128.0,
                storage_id: 1,
                storage_count: 1,
                status: StorageStatus::STORAGE_STATUS_READY,
            });
            vec![vec![
                Reply::to_peer(cmd.target_component, storage),
                ack(cmd, true),
            ]]
        }
        None => vec![vec![ack(cmd, false)]],
    }
}

/// `param1` selects a stream id (0 for all), `param2` must be 1 to request.
/// Emits one VIDEO_STREAM_INFORMATION per matching stream; this command
/// sends no ack.
pub fn request_video_stream_information(
    registry: &ComponentRegistry,
    server_component_id: u8,
    rtsp: &RtspRoutes,
    cmd: &COMMAND_LONG_DATA,
) -> Vec<ReplyBatch> {
    let camera_id = cmd.param1 as u8;
    let action = cmd.param2 as u32;
    if action != 1 {
        return Vec::new();
    }

    let total = registry.len() as u8;
    let mut batch = Vec::new();

    for (_, component) in registry.iter() {
        let stream = component.stream();
        if camera_id != 0 && stream.id != camera_id {
            continue;
        }

        let selected = stream.selected_frame_size();
        let Some(frame_size) = selected.or_else(|| stream.best_frame_size(u32::MAX, u32::MAX))
        else {
            continue;
        };

        let query = match selected {
            Some(fs) => format!("?width={}&height={}", fs.width, fs.height),
            None => String::new(),
        };
        let uri = rtsp.stream_uri(component.stream_name(), &query);

        batch.push(Reply::to_peer(
            server_component_id,
            MavMessage::VIDEO_STREAM_INFORMATION(VIDEO_STREAM_INFORMATION_DATA {
                framerate: 0.0,
                bitrate: 0,
                flags: if stream.is_streaming {
                    VideoStreamStatusFlags::VIDEO_STREAM_STATUS_FLAGS_RUNNING
                } else {
                    VideoStreamStatusFlags::empty()
                },
                resolution_h: frame_size.width as u16,
                resolution_v: frame_size.height as u16,
                rotation: 0,
                hfov: 0,
                stream_id: stream.id,
                count: total,
                mavtype: VideoStreamType::VIDEO_STREAM_TYPE_RTSP,
                name: pad_bytes::<32>(component.stream_name().as_bytes()),
                uri: pad_bytes::<160>(uri.as_bytes()),
            }),
        ));
    }

    vec![batch]
}
