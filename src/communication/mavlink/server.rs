//! MAVLink UDP server
//!
//! Owns the UDP socket, the stateful frame decoder, and the heartbeat
//! timer. The run loop is single-threaded and cooperative: each datagram's
//! messages are handled to completion before the next is drained, and
//! heartbeat emission interleaves only at timer ticks.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use mavlink::MavHeader;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

use crate::config::MavlinkConfig;

use super::codec::{self, CodecError, FrameDecoder};
use super::dispatcher::{MessageDispatcher, Reply, ReplyBatch, ReplyDest};

pub const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

pub struct MavlinkServer {
    socket: UdpSocket,
    broadcast_addr: SocketAddr,
    dispatcher: MessageDispatcher,
    decoder: FrameDecoder,
    sequence: u8,
}

impl MavlinkServer {
    /// Bind the endpoint in broadcast-enabled mode.
    pub async fn bind(
        config: &MavlinkConfig,
        dispatcher: MessageDispatcher,
    ) -> Result<Self, ServerError> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, config.port)).await?;
        socket.set_broadcast(true)?;

        // sanitized config guarantees a parseable dotted quad
        let ip: IpAddr = config
            .broadcast_addr
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::BROADCAST));
        let port = if config.port == 0 {
            crate::config::DEFAULT_MAVLINK_PORT
        } else {
            config.port
        };

        Ok(Self {
            socket,
            broadcast_addr: SocketAddr::new(ip, port),
            dispatcher,
            decoder: FrameDecoder::new(),
            sequence: 0,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.socket.local_addr()?)
    }

    /// Serve until the owning task is dropped. The heartbeat timer lives
    /// and dies with this future.
    pub async fn run(&mut self) -> Result<(), ServerError> {
        info!(
            addr = %self.socket.local_addr()?,
            system_id = self.dispatcher.system_id(),
            cameras = self.dispatcher.registry().len(),
            "mavlink camera server listening"
        );

        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        let mut buf = [0u8; 2048];

        loop {
            tokio::select! {
                received = self.socket.recv_from(&mut buf) => {
                    let (len, peer) = received?;
                    self.process_datagram(peer, &buf[..len]).await;
                }
                _ = heartbeat.tick() => {
                    self.send_heartbeats().await;
                }
            }
        }
    }

    /// Decode one datagram's payload and run every contained message.
    pub async fn process_datagram(&mut self, peer: SocketAddr, payload: &[u8]) {
        let messages = self.decoder.decode(payload);
        for (header, message) in messages {
            debug!(
                from_system = header.system_id,
                from_component = header.component_id,
                "message received"
            );
            let batches = self.dispatcher.handle_message(&message);
            self.send_batches(peer, batches).await;
        }
    }

    async fn send_batches(&mut self, peer: SocketAddr, batches: Vec<ReplyBatch>) {
        for batch in batches {
            for reply in batch {
                if let Err(err) = self.send_reply(peer, &reply).await {
                    warn!(error = %err, "send failed, dropping remaining replies for this message");
                    break;
                }
            }
        }
    }

    pub async fn send_heartbeats(&mut self) {
        for reply in self.dispatcher.heartbeats() {
            if let Err(err) = self.send_reply(self.broadcast_addr, &reply).await {
                warn!(error = %err, component = reply.component_id, "sending heartbeat failed");
            }
        }
    }

    async fn send_reply(&mut self, peer: SocketAddr, reply: &Reply) -> Result<(), ServerError> {
        let header = MavHeader {
            system_id: self.dispatcher.system_id(),
            component_id: reply.component_id,
            sequence: self.next_sequence(),
        };
        let frame = codec::encode(header, &reply.message)?;

        let dest = match reply.dest {
            ReplyDest::Peer => peer,
            ReplyDest::Broadcast => self.broadcast_addr,
        };
        let sent = self.socket.send_to(&frame, dest).await?;
        if sent == 0 {
            return Err(ServerError::Io(std::io::Error::other("zero-length send")));
        }
        Ok(())
    }

    fn next_sequence(&mut self) -> u8 {
        let seq = self.sequence;
        self.sequence = self.sequence.wrapping_add(1);
        seq
    }
}
