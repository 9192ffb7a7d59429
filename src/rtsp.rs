//! RTSP URI composition
//!
//! The daemon does not speak RTSP itself; it only advertises where the
//! media lives. When no server address is configured the RTSP server's
//! wildcard bind is advertised and the GCS substitutes the sender address.

pub const DEFAULT_RTSP_PORT: u16 = 8554;

const DEFAULT_RTSP_SERVER_ADDR: &str = "0.0.0.0";

#[derive(Debug, Clone)]
pub struct RtspRoutes {
    server_addr: Option<String>,
    port: u16,
}

impl RtspRoutes {
    pub fn new(server_addr: Option<String>, port: u16) -> Self {
        Self { server_addr, port }
    }

    /// URI for one stream, with an optional query suffix such as
    /// `?width=640&height=480`.
    pub fn stream_uri(&self, stream_name: &str, query: &str) -> String {
        let host = self.server_addr.as_deref().unwrap_or(DEFAULT_RTSP_SERVER_ADDR);
        format!("rtsp://{host}:{}/{stream_name}{query}", self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_with_configured_host() {
        let routes = RtspRoutes::new(Some("192.168.1.10".to_string()), DEFAULT_RTSP_PORT);
        assert_eq!(
            routes.stream_uri("video0", ""),
            "rtsp://192.168.1.10:8554/video0"
        );
    }

    #[test]
    fn test_uri_with_query_suffix() {
        let routes = RtspRoutes::new(Some("192.168.1.10".to_string()), DEFAULT_RTSP_PORT);
        assert_eq!(
            routes.stream_uri("video0", "?width=640&height=480"),
            "rtsp://192.168.1.10:8554/video0?width=640&height=480"
        );
    }

    #[test]
    fn test_uri_without_host_falls_back_to_wildcard() {
        let routes = RtspRoutes::new(None, DEFAULT_RTSP_PORT);
        assert_eq!(routes.stream_uri("cam", ""), "rtsp://0.0.0.0:8554/cam");
    }
}
