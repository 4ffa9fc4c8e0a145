use async_trait::async_trait;
use std::io::ErrorKind;
use tokio::net::UdpSocket;

/// Accepts one encoded telemetry payload for a destination port.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn send(&self, port: u16, payload: &[u8]) -> Result<(), std::io::Error>;
}

/// Sends every payload as a single UDP datagram to `host:port`.
pub struct UdpTelemetrySink {
    socket: UdpSocket,
    host: String,
}

impl UdpTelemetrySink {
    pub async fn bind(host: &str) -> Result<Self, std::io::Error> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        Ok(Self {
            socket,
            host: host.to_string(),
        })
    }

    pub fn host(&self) -> &str { &self.host }
}

#[async_trait]
impl TelemetrySink for UdpTelemetrySink {
    async fn send(&self, port: u16, payload: &[u8]) -> Result<(), std::io::Error> {
        let sent = self.socket.send_to(payload, (self.host.as_str(), port)).await?;
        if sent == payload.len() {
            Ok(())
        } else {
            Err(std::io::Error::new(ErrorKind::WriteZero, format!("sent {sent} of {} bytes", payload.len())))
        }
    }
}
