//! Informations réseau affichées par les vues de diagnostic.

use pmoutils::{FALLBACK_MAC_ADDRESS, guess_local_ip, interface_ipv4, qualified_hostname, read_mac_address};

pub const DEFAULT_NETWORK_INTERFACE: &str = "eth0";
pub const DEFAULT_HOSTNAME_SUFFIX: &str = ".clients.dur.ac.uk";

/// Source des informations d'hôte. Jamais en erreur : chaque valeur a un repli.
pub trait HostInfo {
    fn mac_address(&self) -> String;
    fn hostname(&self) -> String;
    fn ip_address(&self) -> String;
}

/// Lit les informations de la machine courante.
#[derive(Debug, Clone)]
pub struct SystemHost {
    interface: String,
    hostname_suffix: String,
}

impl SystemHost {
    pub fn new(interface: impl Into<String>, hostname_suffix: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            hostname_suffix: hostname_suffix.into(),
        }
    }
}

impl Default for SystemHost {
    fn default() -> Self {
        Self::new(DEFAULT_NETWORK_INTERFACE, DEFAULT_HOSTNAME_SUFFIX)
    }
}

impl HostInfo for SystemHost {
    fn mac_address(&self) -> String {
        let mac = read_mac_address(&self.interface);
        if mac == FALLBACK_MAC_ADDRESS {
            tracing::debug!(interface=%self.interface, "No MAC address, using fallback");
        }
        mac
    }

    fn hostname(&self) -> String {
        qualified_hostname(&self.hostname_suffix)
    }

    /// Adresse de l'interface configurée, sinon celle utilisée pour sortir.
    fn ip_address(&self) -> String {
        interface_ipv4(&self.interface).unwrap_or_else(guess_local_ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_interface_falls_back() {
        let host = SystemHost::new("pmoradio-test0", ".example.org");
        assert_eq!(host.mac_address(), FALLBACK_MAC_ADDRESS);
        assert!(host.hostname().ends_with(".example.org"));
        assert!(host.ip_address().parse::<std::net::Ipv4Addr>().is_ok());
    }
}
