//! Gestion du lecteur externe.
//!
//! Le flux n'est jamais décodé ici : l'URL de la station est passée telle
//! quelle à un programme externe (mplayer par défaut), lancé à la tête de son
//! propre groupe de processus pour que l'arrêt atteigne aussi ses enfants.
//! Un lecteur abandonné (radio détruite sans `close()`) est arrêté à la
//! destruction de son [`ChildProcess`].

use std::io;
use std::process::{Child, Command, Stdio};

use pmoutils::process;
use tracing::{debug, error, info, warn};

use crate::error::{RadioError, Result};

pub const DEFAULT_PLAYER_PROGRAM: &str = "mplayer";
pub const DEFAULT_PLAYLIST_FLAG: &str = "-playlist";
pub const DEFAULT_INSTALL_HINT: &str = "install with `sudo apt-get install mplayer`";

/// Ligne de commande du lecteur.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerCommand {
    pub program: String,
    pub args: Vec<String>,
    pub playlist_flag: String,
    /// Extensions (sans le point) signalant une playlist.
    pub playlist_extensions: Vec<String>,
}

impl Default for PlayerCommand {
    fn default() -> Self {
        Self {
            program: DEFAULT_PLAYER_PROGRAM.to_string(),
            args: vec!["-quiet".to_string()],
            playlist_flag: DEFAULT_PLAYLIST_FLAG.to_string(),
            playlist_extensions: vec!["m3u".to_string(), "pls".to_string()],
        }
    }
}

impl PlayerCommand {
    /// `true` si le chemin de l'URL (requête et fragment exclus) se termine
    /// par une extension de playlist.
    pub fn is_playlist(&self, source: &str) -> bool {
        let path = source.split(['?', '#']).next().unwrap_or(source);
        let file = path.rsplit('/').next().unwrap_or(path);
        match file.rsplit_once('.') {
            Some((_, ext)) => self
                .playlist_extensions
                .iter()
                .any(|candidate| candidate.trim_start_matches('.').eq_ignore_ascii_case(ext)),
            None => false,
        }
    }

    /// Arguments passés au programme pour jouer `source`.
    pub fn invocation(&self, source: &str) -> Vec<String> {
        let mut args = self.args.clone();
        if self.is_playlist(source) {
            args.push(self.playlist_flag.clone());
        }
        args.push(source.to_string());
        args
    }

    fn command(&self, source: &str, show_output: bool) -> Command {
        let mut command = Command::new(&self.program);
        command.args(self.invocation(source)).stdin(Stdio::null());
        if !show_output {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }
        command
    }
}

/// Lance le lecteur sur une source.
pub trait PlayerLauncher {
    type Process: PlayerProcess;

    fn launch(&mut self, source: &str) -> Result<Self::Process>;
}

/// Un lecteur en cours d'exécution.
pub trait PlayerProcess {
    /// Identifiant du processus (et du groupe).
    fn id(&self) -> u32;

    /// Demande l'arrêt du lecteur et de ses enfants.
    ///
    /// En cas d'erreur, le lecteur est peut-être toujours en cours.
    fn terminate(&mut self) -> Result<()>;
}

/// Lanceur réel : exécute directement le programme, sans shell intermédiaire.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    command: PlayerCommand,
    show_output: bool,
    install_hint: String,
}

impl ProcessLauncher {
    pub fn new(command: PlayerCommand) -> Self {
        Self {
            command,
            show_output: false,
            install_hint: DEFAULT_INSTALL_HINT.to_string(),
        }
    }

    pub fn with_output(mut self, show_output: bool) -> Self {
        self.show_output = show_output;
        self
    }

    pub fn with_install_hint(mut self, hint: impl Into<String>) -> Self {
        self.install_hint = hint.into();
        self
    }

    pub fn command(&self) -> &PlayerCommand {
        &self.command
    }

    /// Vérifie que le programme est installé en le lançant une fois à vide.
    pub fn check_available(&self) -> Result<()> {
        let status = Command::new(&self.command.program)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match status {
            Ok(status) => {
                debug!(program=%self.command.program, "Player found ({})", status);
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(RadioError::PlayerNotFound {
                program: self.command.program.clone(),
                hint: self.install_hint.clone(),
            }),
            Err(source) => Err(RadioError::PlayerSpawn {
                program: self.command.program.clone(),
                source,
            }),
        }
    }
}

impl PlayerLauncher for ProcessLauncher {
    type Process = ChildProcess;

    fn launch(&mut self, source: &str) -> Result<ChildProcess> {
        let mut command = self.command.command(source, self.show_output);
        let child =
            process::spawn_process_group(&mut command).map_err(|source| RadioError::PlayerSpawn {
                program: self.command.program.clone(),
                source,
            })?;
        info!(pid = child.id(), program=%self.command.program, "Player started");
        Ok(ChildProcess {
            pid: child.id(),
            child: Some(child),
        })
    }
}

/// Lecteur lancé par [`ProcessLauncher`], chef de son groupe de processus.
#[derive(Debug)]
pub struct ChildProcess {
    pid: u32,
    /// `None` une fois le groupe arrêté et confié au thread de récupération.
    child: Option<Child>,
}

impl PlayerProcess for ChildProcess {
    fn id(&self) -> u32 {
        self.pid
    }

    fn terminate(&mut self) -> Result<()> {
        let Some(child) = self.child.take() else {
            return Ok(());
        };
        let pgid = self.pid;
        match process::terminate_process_group(pgid) {
            Ok(()) => debug!(pgid = pgid, "SIGTERM sent to player group"),
            // Le lecteur s'est déjà arrêté tout seul (flux coupé, crash)
            Err(err) if process::is_no_such_process(&err) => {
                warn!(pgid = pgid, "Player group already gone");
            }
            Err(source) => {
                // Rien ne garantit qu'il s'arrêtera : pas d'attente bloquante
                self.child = Some(child);
                return Err(RadioError::PlayerSignal { pgid, source });
            }
        }
        process::reap_in_background(child);
        Ok(())
    }
}

impl Drop for ChildProcess {
    fn drop(&mut self) {
        if self.child.is_none() {
            return;
        }
        warn!(pgid = self.pid, "Player dropped while running, stopping it");
        if let Err(err) = self.terminate() {
            error!(pgid = self.pid, "Cannot stop abandoned player: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;
    use std::time::{Duration, Instant};

    fn sleep_launcher() -> ProcessLauncher {
        ProcessLauncher::new(PlayerCommand {
            program: "sleep".to_string(),
            args: Vec::new(),
            playlist_flag: DEFAULT_PLAYLIST_FLAG.to_string(),
            playlist_extensions: Vec::new(),
        })
    }

    /// Attend que `pid` ait disparu (terminé et récupéré).
    fn wait_until_gone(pid: u32) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if kill(Pid::from_raw(pid as i32), None) == Err(Errno::ESRCH) {
                return true;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        false
    }

    #[test]
    fn test_playlist_detection() {
        let command = PlayerCommand::default();
        assert!(command.is_playlist("http://www.radiofeeds.co.uk/bbcradio1.pls"));
        assert!(command.is_playlist("http://host/list.M3U"));
        assert!(command.is_playlist("http://host/list.pls?session=42"));
        assert!(!command.is_playlist("http://media-ice.musicradio.com/HeartTyneWearMP3"));
        assert!(!command.is_playlist("http://tx.sharp-stream.com/icecast.php?i=metro.mp3"));
        assert!(!command.is_playlist("http://host.pls/stream"));
    }

    #[test]
    fn test_invocation() {
        let command = PlayerCommand::default();
        assert_eq!(
            command.invocation("http://www.radiofeeds.co.uk/bbcradio2.pls"),
            vec!["-quiet", "-playlist", "http://www.radiofeeds.co.uk/bbcradio2.pls"]
        );
        assert_eq!(
            command.invocation("http://stream.purpleradio.co.uk/stream.php"),
            vec!["-quiet", "http://stream.purpleradio.co.uk/stream.php"]
        );
    }

    #[test]
    fn test_missing_player_is_reported() {
        let launcher = ProcessLauncher::new(PlayerCommand {
            program: "pmoradio-no-such-player".to_string(),
            ..PlayerCommand::default()
        });
        match launcher.check_available() {
            Err(RadioError::PlayerNotFound { program, hint }) => {
                assert_eq!(program, "pmoradio-no-such-player");
                assert_eq!(hint, DEFAULT_INSTALL_HINT);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_launch_and_terminate_real_process() {
        let mut launcher = sleep_launcher();
        launcher.check_available().unwrap();

        let mut process = launcher.launch("30").unwrap();
        let pid = process.id();
        assert!(pid > 1);
        process.terminate().unwrap();
        assert!(wait_until_gone(pid));

        // Un second arrêt ne fait rien
        process.terminate().unwrap();
    }

    #[test]
    fn test_dropped_process_is_stopped() {
        let process = sleep_launcher().launch("30").unwrap();
        let pid = process.id();
        drop(process);
        assert!(wait_until_gone(pid));
    }
}
