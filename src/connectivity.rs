// src/connectivity.rs
use crate::config::ProbeConfig;
use std::net::{TcpStream, ToSocketAddrs};

/// "Can we reach a known external host?" Guard before any network-dependent action.
pub trait ConnectivityProbe: Send {
    fn is_online(&self) -> bool;
}

/// One TCP connect attempt per resolved address, bounded by the configured timeout. No retry.
pub struct TcpProbe {
    config: ProbeConfig,
}

impl TcpProbe {
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }
}

impl ConnectivityProbe for TcpProbe {
    fn is_online(&self) -> bool {
        let target = (self.config.host.as_str(), self.config.port);
        let addrs = match target.to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(e) => {
                log::warn!("probe: cannot resolve {}: {e}", self.config.host);
                return false;
            }
        };
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.config.timeout()) {
                Ok(_) => return true,
                Err(e) => log::debug!("probe: {addr} unreachable: {e}"),
            }
        }
        log::warn!(
            "probe: {}:{} unreachable",
            self.config.host,
            self.config.port
        );
        false
    }
}
