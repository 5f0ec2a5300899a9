//! Télécommande infrarouge via le démon lircd.
//!
//! lircd diffuse sur sa socket Unix une ligne par trame décodée :
//!
//! ```text
//! 0000000000f40bf0 00 KEY_UP mceusb
//! ```
//!
//! (code hexadécimal, compteur de répétition hexadécimal, nom de touche, télécommande).

use std::io::{BufRead, BufReader};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;

use crate::error::Result;
use crate::event::InputEvent;
use crate::sources::report_failure;

const SOURCE_NAME: &str = "lirc";

pub const DEFAULT_LIRCD_SOCKET: &str = "/var/run/lirc/lircd";

/// Trame décodée par lircd.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LircPacket {
    pub code: u64,
    pub repeat: u32,
    pub button: String,
    pub remote: String,
}

impl LircPacket {
    /// Analyse une ligne diffusée par lircd.
    ///
    /// Retourne `None` pour les lignes qui ne sont pas des trames
    /// (réponses `BEGIN`/`END` aux commandes par exemple).
    pub fn parse(line: &str) -> Option<Self> {
        let mut fields = line.split_whitespace();
        let code = u64::from_str_radix(fields.next()?, 16).ok()?;
        let repeat = u32::from_str_radix(fields.next()?, 16).ok()?;
        let button = fields.next()?.to_string();
        let remote = fields.next()?.to_string();
        if fields.next().is_some() {
            return None;
        }
        Some(Self {
            code,
            repeat,
            button,
            remote,
        })
    }
}

pub struct LircSource {
    socket: PathBuf,
}

impl LircSource {
    pub fn new(socket: impl Into<PathBuf>) -> Self {
        Self {
            socket: socket.into(),
        }
    }

    /// Se connecte à lircd puis relaie les touches dans un thread dédié.
    ///
    /// Les répétitions (touche maintenue) sont ignorées.
    pub fn spawn(self, events: Sender<InputEvent>) -> Result<JoinHandle<()>> {
        let stream = UnixStream::connect(&self.socket)?;
        tracing::info!(socket=%self.socket.display(), "Connected to lircd");

        let handle = thread::Builder::new()
            .name(SOURCE_NAME.to_string())
            .spawn(move || relay(BufReader::new(stream), &events))?;
        Ok(handle)
    }
}

fn relay<R: BufRead>(reader: R, events: &Sender<InputEvent>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                report_failure(events, SOURCE_NAME, format!("reading from lircd: {}", err));
                return;
            }
        };
        let Some(packet) = LircPacket::parse(&line) else {
            tracing::trace!(line=%line, "Ignoring lircd line");
            continue;
        };
        if packet.repeat != 0 {
            continue;
        }
        tracing::debug!(button=%packet.button, remote=%packet.remote, "IR event");
        if events.send(InputEvent::ir(packet.button)).is_err() {
            return;
        }
    }
    tracing::warn!("lircd closed the connection");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::io::{Cursor, Write};
    use std::os::unix::net::UnixListener;

    #[test]
    fn test_parse_packet() {
        assert_eq!(
            LircPacket::parse("0000000000f40bf0 00 KEY_UP mceusb"),
            Some(LircPacket {
                code: 0xf40bf0,
                repeat: 0,
                button: "KEY_UP".to_string(),
                remote: "mceusb".to_string(),
            })
        );
        assert_eq!(
            LircPacket::parse("0000000000000003 1a 3 piface").map(|p| p.repeat),
            Some(0x1a)
        );
    }

    #[test]
    fn test_parse_rejects_replies() {
        assert_eq!(LircPacket::parse("BEGIN"), None);
        assert_eq!(LircPacket::parse("SIGHUP"), None);
        assert_eq!(LircPacket::parse(""), None);
        assert_eq!(LircPacket::parse("00 00 KEY_UP remote extra"), None);
    }

    #[test]
    fn test_source_relays_first_press_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lircd");
        let server = UnixListener::bind(&path).unwrap();

        let (tx, rx) = unbounded();
        let handle = LircSource::new(&path).spawn(tx).unwrap();

        let (mut client, _) = server.accept().unwrap();
        client
            .write_all(
                b"0000000000000005 00 5 remote\n\
                  0000000000000005 01 5 remote\n\
                  BEGIN\n\
                  0000000000f40bf0 00 KEY_PLAY remote\n",
            )
            .unwrap();
        drop(client);
        handle.join().unwrap();

        let events: Vec<InputEvent> = rx.try_iter().collect();
        assert_eq!(events, vec![InputEvent::ir("5"), InputEvent::ir("KEY_PLAY")]);
    }

    #[test]
    fn test_read_error_is_reported_to_listener() {
        let (tx, rx) = unbounded();
        relay(Cursor::new(b"0000000000000005 00 5 remote\n\xff\xfe\n".to_vec()), &tx);

        let events: Vec<InputEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], InputEvent::ir("5"));
        assert!(matches!(
            &events[1],
            InputEvent::SourceFailed { name, .. } if name == "lirc"
        ));
    }
}
