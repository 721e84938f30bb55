use crate::ports::LocalAddressPort;
use log::debug;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

/// Finds the outbound interface by connecting a UDP socket.
///
/// Connecting a datagram socket only asks the kernel for a route; no packet
/// leaves the host.
pub struct UdpLocalAddress {
    probe: SocketAddr,
}

impl UdpLocalAddress {
    pub fn new(probe: SocketAddr) -> Self {
        Self { probe }
    }
}

impl LocalAddressPort for UdpLocalAddress {
    fn primary_ipv4(&self) -> Option<Ipv4Addr> {
        let socket = UdpSocket::bind(("0.0.0.0", 0))
            .map_err(|e| debug!("cannot bind probe socket: {}", e))
            .ok()?;
        socket
            .connect(self.probe)
            .map_err(|e| debug!("no route towards {}: {}", self.probe, e))
            .ok()?;
        match socket.local_addr().ok()?.ip() {
            IpAddr::V4(ip) if !ip.is_unspecified() => Some(ip),
            _ => None,
        }
    }
}

/// A fixed answer, for tests and hosts without a usable interface.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticLocalAddress(Option<Ipv4Addr>);

impl StaticLocalAddress {
    pub fn new(addr: Option<Ipv4Addr>) -> Self {
        Self(addr)
    }
}

impl LocalAddressPort for StaticLocalAddress {
    fn primary_ipv4(&self) -> Option<Ipv4Addr> {
        self.0
    }
}
