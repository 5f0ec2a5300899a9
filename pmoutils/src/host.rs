use std::fs;
use std::path::Path;

use sysinfo::System;

/// Adresse affichée quand l'interface n'expose pas de fichier `address`.
pub const FALLBACK_MAC_ADDRESS: &str = "00:00:00:00:00:00";

const SYS_CLASS_NET: &str = "/sys/class/net";
const MAC_ADDRESS_LEN: usize = 17;

/// Lit l'adresse MAC d'une interface réseau depuis `/sys/class/net/<iface>/address`.
///
/// Ne renvoie jamais d'erreur : si le fichier est absent ou illisible,
/// [`FALLBACK_MAC_ADDRESS`] est retourné.
///
/// # Examples
///
/// ```no_run
/// let mac = pmoutils::read_mac_address("eth0");
/// assert_eq!(mac.len(), 17);
/// ```
pub fn read_mac_address(interface: &str) -> String {
    read_mac_address_from(Path::new(SYS_CLASS_NET), interface)
}

/// Variante de [`read_mac_address`] avec une racine `sys/class/net` explicite.
pub fn read_mac_address_from(root: &Path, interface: &str) -> String {
    let path = root.join(interface).join("address");
    match fs::read_to_string(&path) {
        Ok(content) => content.trim().chars().take(MAC_ADDRESS_LEN).collect(),
        Err(err) => {
            tracing::debug!(path=%path.display(), "Cannot read MAC address: {}", err);
            FALLBACK_MAC_ADDRESS.to_string()
        }
    }
}

/// Retourne le nom d'hôte de la machine, ou `"localhost"` s'il est inconnu.
pub fn hostname() -> String {
    System::host_name().unwrap_or_else(|| {
        tracing::warn!("Cannot determine host name, using localhost");
        "localhost".to_string()
    })
}

/// Nom d'hôte suivi d'un suffixe de domaine fixe (ex: `".clients.dur.ac.uk"`).
pub fn qualified_hostname(domain_suffix: &str) -> String {
    format!("{}{}", hostname(), domain_suffix)
}
