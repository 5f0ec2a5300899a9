//! Lancement de processus dans un groupe dédié.
//!
//! Certains lecteurs (mplayer avec `-playlist` par exemple) créent eux-mêmes
//! des sous-processus. En plaçant le processus lancé à la tête d'un nouveau
//! groupe, un seul signal envoyé au groupe atteint toute sa descendance.

use std::io;
use std::os::unix::process::CommandExt;
use std::process::{Child, Command};

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;

/// Lance `command` à la tête d'un nouveau groupe de processus.
///
/// L'identifiant du groupe est égal au PID du processus lancé.
pub fn spawn_process_group(command: &mut Command) -> io::Result<Child> {
    command.process_group(0).spawn()
}

/// Envoie SIGTERM à tous les processus du groupe `pgid`.
///
/// Le signal est envoyé une seule fois ; sa prise en compte n'est pas vérifiée.
/// Un groupe déjà disparu donne une erreur `ESRCH`.
pub fn terminate_process_group(pgid: u32) -> io::Result<()> {
    let raw = i32::try_from(pgid)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "process group id out of range"))?;
    if raw <= 1 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("refusing to signal process group {}", raw),
        ));
    }

    signal::killpg(Pid::from_raw(raw), Signal::SIGTERM)?;
    Ok(())
}

/// `true` si l'erreur signale un processus ou un groupe inexistant.
pub fn is_no_such_process(err: &io::Error) -> bool {
    err.raw_os_error() == Some(nix::errno::Errno::ESRCH as i32)
}

/// Récupère le statut de sortie de `child` sur un thread détaché.
///
/// Évite de laisser un zombie derrière un processus arrêté par signal
/// sans bloquer l'appelant.
pub fn reap_in_background(mut child: Child) {
    let pid = child.id();
    let spawned = std::thread::Builder::new()
        .name(format!("reap-{}", pid))
        .spawn(move || match child.wait() {
            Ok(status) => tracing::debug!(pid = pid, "Process exited: {}", status),
            Err(err) => tracing::warn!(pid = pid, "Failed to wait for process: {}", err),
        });
    if let Err(err) = spawned {
        tracing::warn!(pid = pid, "Cannot spawn reaper thread: {}", err);
    }
}
