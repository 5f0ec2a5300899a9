//! Utilitaires système pour PMORadio.
//!
//! - [`guess_local_ip`] / [`interface_ipv4`] : adresses IP de la machine
//! - [`read_mac_address`] / [`qualified_hostname`] : informations de diagnostic
//!   affichées sur l'écran
//! - [`process`] : lancement et arrêt de processus dans leur propre groupe
mod host;
mod ip_utils;
pub mod process;

pub use host::{
    FALLBACK_MAC_ADDRESS, hostname, qualified_hostname, read_mac_address, read_mac_address_from,
};
pub use ip_utils::{guess_local_ip, interface_ipv4};
