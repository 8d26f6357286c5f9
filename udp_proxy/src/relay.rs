//! Forwards UDP datagrams to an HTTP target and returns any reply.
//!
//! Each datagram is posted hex encoded as the request body. A non-empty
//! response body is a hex encoded reply datagram for the original sender.

use std::{io, net::SocketAddr, sync::Arc, time::Duration};

use tokio::net::UdpSocket;

use crate::{error::RelayError, telemetry};

/// The default client useragent for upstream requests
static USERAGENT: &str = concat!("udp-proxy/", env!("CARGO_PKG_VERSION"));

const MAX_DATAGRAM: usize = 65_535;

pub fn http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USERAGENT)
        .timeout(timeout)
        .build()
}

pub struct Relay {
    target: String,
    url: String,
    socket: Arc<UdpSocket>,
    client: reqwest::Client,
}

impl Relay {
    pub async fn bind(
        addr: SocketAddr,
        target: String,
        url: String,
        client: reqwest::Client,
    ) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self {
            target,
            url,
            socket: Arc::new(socket),
            client,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub async fn run(self, shutdown: triggered::Listener) -> anyhow::Result<()> {
        let local_addr = self.local_addr()?;
        tracing::info!(upstream = %self.target, %local_addr, "starting relay");
        let mut buf = vec![0u8; MAX_DATAGRAM];
        loop {
            let (len, peer) = tokio::select! {
                _ = shutdown.clone() => break,
                received = self.socket.recv_from(&mut buf) => match received {
                    Ok(received) => received,
                    Err(err) => {
                        tracing::warn!(upstream = %self.target, ?err, "udp receive failed");
                        continue;
                    }
                },
            };
            tracing::debug!(upstream = %self.target, %peer, len, "datagram received");
            telemetry::count_datagram(&self.target);

            let payload = buf[..len].to_vec();
            let socket = self.socket.clone();
            let client = self.client.clone();
            let url = self.url.clone();
            let target = self.target.clone();
            tokio::spawn(async move {
                match relay_datagram(&client, &url, &socket, peer, &payload).await {
                    Ok(true) => telemetry::count_reply(&target),
                    Ok(false) => (),
                    Err(err) => {
                        tracing::warn!(upstream = %target, %peer, %err, "relay failed");
                        telemetry::count_failure(&target);
                    }
                }
            });
        }
        tracing::info!(upstream = %self.target, "stopping relay");
        Ok(())
    }
}

async fn relay_datagram(
    client: &reqwest::Client,
    url: &str,
    socket: &UdpSocket,
    peer: SocketAddr,
    payload: &[u8],
) -> Result<bool, RelayError> {
    let Some(reply) = forward(client, url, payload).await? else {
        return Ok(false);
    };
    socket.send_to(&reply, peer).await?;
    tracing::debug!(%peer, len = reply.len(), "reply sent");
    Ok(true)
}

/// Posts one datagram upstream. Returns the decoded reply, if any.
pub async fn forward(
    client: &reqwest::Client,
    url: &str,
    payload: &[u8],
) -> Result<Option<Vec<u8>>, RelayError> {
    let response = client.post(url).body(hex::encode(payload)).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(RelayError::Status(status));
    }
    let body = response.bytes().await?;
    let body = body.trim_ascii();
    if body.is_empty() {
        return Ok(None);
    }
    Ok(Some(hex::decode(body)?))
}
