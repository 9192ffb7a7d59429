//! End-to-end tests speaking MAVLink v2 over loopback UDP against a
//! running server task, the way a GCS would.

use std::net::SocketAddr;
use std::time::Duration;

use mavlink::common::*;
use mavlink::MavHeader;
use tokio::net::UdpSocket;
use tokio::time::timeout;

use camlink::camera::mock::MockCamera;
use camlink::communication::mavlink::codec::{self, FrameDecoder};
use camlink::communication::mavlink::components::ComponentRegistry;
use camlink::communication::mavlink::dispatcher::MessageDispatcher;
use camlink::communication::mavlink::server::MavlinkServer;
use camlink::config::Config;
use camlink::core::parameters::{encode_param_id, schema, ParamValue};
use camlink::rtsp::{RtspRoutes, DEFAULT_RTSP_PORT};

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// A minimal GCS: one UDP socket plus a frame decoder.
struct Gcs {
    socket: UdpSocket,
    decoder: FrameDecoder,
    server_addr: SocketAddr,
    sequence: u8,
}

impl Gcs {
    async fn new(server_addr: SocketAddr) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        Self {
            socket,
            decoder: FrameDecoder::new(),
            server_addr,
            sequence: 0,
        }
    }

    async fn send(&mut self, message: &MavMessage) {
        let header = MavHeader {
            system_id: 255,
            component_id: 190,
            sequence: self.sequence,
        };
        self.sequence = self.sequence.wrapping_add(1);
        let frame = codec::encode(header, message).unwrap();
        self.socket.send_to(&frame, self.server_addr).await.unwrap();
    }

    async fn recv_message(&mut self) -> (MavHeader, MavMessage) {
        loop {
            let mut buf = [0u8; 2048];
            let (len, _) = timeout(RECV_TIMEOUT, self.socket.recv_from(&mut buf))
                .await
                .expect("timed out waiting for a reply")
                .unwrap();
            if let Some(message) = self.decoder.decode(&buf[..len]).into_iter().next() {
                return message;
            }
        }
    }
}

/// Spawn a server with one mock camera at component 100, system id 1.
async fn start_server() -> SocketAddr {
    let config: Config = toml::from_str("[mavlink]\nport = 0\n").unwrap();
    let config = config.sanitized();

    let mut registry = ComponentRegistry::new();
    registry
        .add("video0".to_string(), Box::new(MockCamera::with_defaults()))
        .unwrap();

    let dispatcher = MessageDispatcher::new(
        config.mavlink.system_id(),
        config.mavlink.component_id(),
        RtspRoutes::new(Some("10.0.0.2".to_string()), DEFAULT_RTSP_PORT),
        registry,
    );

    let mut server = MavlinkServer::bind(&config.mavlink, dispatcher)
        .await
        .unwrap();
    let mut addr = server.local_addr().unwrap();
    addr.set_ip("127.0.0.1".parse().unwrap());

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    addr
}

fn command_long(target_component: u8, command: MavCmd, param1: f32, param2: f32) -> MavMessage {
    MavMessage::COMMAND_LONG(COMMAND_LONG_DATA {
        param1,
        param2,
        param3: 0.0,
        param4: 0.0,
        param5: 0.0,
        param6: 0.0,
        param7: 0.0,
        command,
        target_system: 1,
        target_component,
        confirmation: 0,
    })
}

#[tokio::test]
async fn camera_information_round_trip() {
    let addr = start_server().await;
    let mut gcs = Gcs::new(addr).await;

    gcs.send(&command_long(
        100,
        MavCmd::MAV_CMD_REQUEST_CAMERA_INFORMATION,
        1.0,
        0.0,
    ))
    .await;

    let (header, first) = gcs.recv_message().await;
    assert_eq!(header.system_id, 1);
    assert_eq!(header.component_id, 100);
    match first {
        MavMessage::CAMERA_INFORMATION(info) => {
            assert_eq!(&info.vendor_name[..5], b"Intel");
            assert_eq!(info.resolution_h, 1920);
            assert_eq!(info.resolution_v, 1080);
        }
        other => panic!("expected CAMERA_INFORMATION, got {other:?}"),
    }

    let (_, second) = gcs.recv_message().await;
    match second {
        MavMessage::COMMAND_ACK(ack) => {
            assert_eq!(ack.command, MavCmd::MAV_CMD_REQUEST_CAMERA_INFORMATION);
            assert_eq!(ack.result, MavResult::MAV_RESULT_ACCEPTED);
        }
        other => panic!("expected COMMAND_ACK, got {other:?}"),
    }
}

#[tokio::test]
async fn camera_information_shortcut_sends_only_ack() {
    let addr = start_server().await;
    let mut gcs = Gcs::new(addr).await;

    gcs.send(&command_long(
        100,
        MavCmd::MAV_CMD_REQUEST_CAMERA_INFORMATION,
        0.0,
        0.0,
    ))
    .await;

    let (_, reply) = gcs.recv_message().await;
    match reply {
        MavMessage::COMMAND_ACK(ack) => {
            assert_eq!(ack.result, MavResult::MAV_RESULT_ACCEPTED);
        }
        other => panic!("expected COMMAND_ACK, got {other:?}"),
    }
}

#[tokio::test]
async fn filtered_command_produces_no_traffic() {
    let addr = start_server().await;
    let mut gcs = Gcs::new(addr).await;

    // Wrong target system
    gcs.send(&MavMessage::COMMAND_LONG(COMMAND_LONG_DATA {
        param1: 1.0,
        param2: 0.0,
        param3: 0.0,
        param4: 0.0,
        param5: 0.0,
        param6: 0.0,
        param7: 0.0,
        command: MavCmd::MAV_CMD_REQUEST_CAMERA_INFORMATION,
        target_system: 9,
        target_component: 100,
        confirmation: 0,
    }))
    .await;

    let mut buf = [0u8; 2048];
    let outcome = timeout(Duration::from_millis(300), gcs.socket.recv_from(&mut buf)).await;
    assert!(outcome.is_err(), "expected silence, got a datagram");
}

#[tokio::test]
async fn param_set_then_read() {
    let addr = start_server().await;
    let mut gcs = Gcs::new(addr).await;
    let value = ParamValue::Uint32(128);

    gcs.send(&MavMessage::PARAM_EXT_SET(PARAM_EXT_SET_DATA {
        target_system: 1,
        target_component: 100,
        param_id: encode_param_id(schema::BRIGHTNESS),
        param_value: value.encode_wire(),
        param_type: MavParamExtType::MAV_PARAM_EXT_TYPE_UINT32,
    }))
    .await;

    let (_, ack) = gcs.recv_message().await;
    match ack {
        MavMessage::PARAM_EXT_ACK(ack) => {
            assert_eq!(ack.param_result, ParamAck::PARAM_ACK_ACCEPTED);
            assert_eq!(ack.param_value, value.encode_wire());
        }
        other => panic!("expected PARAM_EXT_ACK, got {other:?}"),
    }

    gcs.send(&MavMessage::PARAM_EXT_REQUEST_READ(
        PARAM_EXT_REQUEST_READ_DATA {
            target_system: 1,
            target_component: 100,
            param_id: encode_param_id(schema::BRIGHTNESS),
            param_index: -1,
        },
    ))
    .await;

    let (_, reply) = gcs.recv_message().await;
    match reply {
        MavMessage::PARAM_EXT_VALUE(pv) => {
            assert_eq!(pv.param_count, 1);
            assert_eq!(pv.param_index, 0);
            assert_eq!(pv.param_type, MavParamExtType::MAV_PARAM_EXT_TYPE_UINT32);
            assert_eq!(pv.param_value, value.encode_wire());
        }
        other => panic!("expected PARAM_EXT_VALUE, got {other:?}"),
    }
}

#[tokio::test]
async fn param_list_reports_count_and_indexes() {
    let addr = start_server().await;
    let mut gcs = Gcs::new(addr).await;

    gcs.send(&MavMessage::PARAM_EXT_REQUEST_LIST(
        PARAM_EXT_REQUEST_LIST_DATA {
            target_system: 1,
            target_component: 100,
        },
    ))
    .await;

    let (_, first) = gcs.recv_message().await;
    let count = match &first {
        MavMessage::PARAM_EXT_VALUE(pv) => pv.param_count,
        other => panic!("expected PARAM_EXT_VALUE, got {other:?}"),
    };
    assert!(count > 0);

    let mut indexes = vec![match &first {
        MavMessage::PARAM_EXT_VALUE(pv) => pv.param_index,
        _ => unreachable!(),
    }];
    for _ in 1..count {
        let (_, message) = gcs.recv_message().await;
        match message {
            MavMessage::PARAM_EXT_VALUE(pv) => {
                assert_eq!(pv.param_count, count);
                indexes.push(pv.param_index);
            }
            other => panic!("expected PARAM_EXT_VALUE, got {other:?}"),
        }
    }

    indexes.sort_unstable();
    let expected: Vec<u16> = (0..count).collect();
    assert_eq!(indexes, expected);
}

#[tokio::test]
async fn stream_settings_select_and_clear() {
    let addr = start_server().await;
    let mut gcs = Gcs::new(addr).await;

    // Request (1000, 1000): the largest advertised size under both ceilings
    // is 640x480.
    gcs.send(&MavMessage::PARAM_EXT_SET(PARAM_EXT_SET_DATA {
        target_system: 1,
        target_component: 100,
        param_id: encode_param_id(schema::VIDEO_SIZE),
        param_value: ParamValue::Uint32((1000 << 16) | 1000).encode_wire(),
        param_type: MavParamExtType::MAV_PARAM_EXT_TYPE_UINT32,
    }))
    .await;
    let (_, ack) = gcs.recv_message().await;
    assert!(matches!(
        ack,
        MavMessage::PARAM_EXT_ACK(PARAM_EXT_ACK_DATA {
            param_result: ParamAck::PARAM_ACK_ACCEPTED,
            ..
        })
    ));

    gcs.send(&command_long(
        100,
        MavCmd::MAV_CMD_REQUEST_VIDEO_STREAM_INFORMATION,
        1.0,
        1.0,
    ))
    .await;
    let (_, info) = gcs.recv_message().await;
    match info {
        MavMessage::VIDEO_STREAM_INFORMATION(info) => {
            assert_eq!(info.resolution_h, 640);
            assert_eq!(info.resolution_v, 480);
            let uri = String::from_utf8_lossy(&info.uri);
            let uri = uri.trim_end_matches('\0').to_string();
            assert!(uri.ends_with("?width=640&height=480"), "uri was {uri}");
        }
        other => panic!("expected VIDEO_STREAM_INFORMATION, got {other:?}"),
    }

    // Zero clears the selection; the advertised maximum comes back and the
    // query suffix disappears.
    gcs.send(&MavMessage::PARAM_EXT_SET(PARAM_EXT_SET_DATA {
        target_system: 1,
        target_component: 100,
        param_id: encode_param_id(schema::VIDEO_SIZE),
        param_value: ParamValue::Uint32(0).encode_wire(),
        param_type: MavParamExtType::MAV_PARAM_EXT_TYPE_UINT32,
    }))
    .await;
    let _ = gcs.recv_message().await;

    gcs.send(&command_long(
        100,
        MavCmd::MAV_CMD_REQUEST_VIDEO_STREAM_INFORMATION,
        1.0,
        1.0,
    ))
    .await;
    let (_, info) = gcs.recv_message().await;
    match info {
        MavMessage::VIDEO_STREAM_INFORMATION(info) => {
            assert_eq!(info.resolution_h, 1920);
            assert_eq!(info.resolution_v, 1080);
            let uri = String::from_utf8_lossy(&info.uri);
            let uri = uri.trim_end_matches('\0').to_string();
            assert!(!uri.contains("?width="), "uri was {uri}");
            assert_eq!(uri, "rtsp://10.0.0.2:8554/video0");
        }
        other => panic!("expected VIDEO_STREAM_INFORMATION, got {other:?}"),
    }
}
