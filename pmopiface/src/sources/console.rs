//! Saisie clavier sur l'entrée standard, pour le mode sans carte.
//!
//! | ligne       | événement                     |
//! |-------------|-------------------------------|
//! | `s<N>`      | bouton N enfoncé              |
//! | `ir <CODE>` | touche de télécommande `CODE` |
//! | `q`, `quit` | arrêt                         |

use std::io::{self, BufRead};
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;

use crate::error::Result;
use crate::event::InputEvent;

pub struct ConsoleSource;

impl ConsoleSource {
    pub fn parse(line: &str) -> Option<InputEvent> {
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
            return Some(InputEvent::Shutdown);
        }
        if let Some(code) = line.strip_prefix("ir ") {
            let code = code.trim();
            return (!code.is_empty()).then(|| InputEvent::ir(code));
        }
        let pin = line.strip_prefix('s')?.parse::<u8>().ok()?;
        Some(InputEvent::switch_pressed(pin))
    }

    /// Lit stdin dans un thread dédié ; la fin du flux (Ctrl+D) vaut `q`.
    pub fn spawn(events: Sender<InputEvent>) -> Result<JoinHandle<()>> {
        let handle = thread::Builder::new()
            .name("console-input".to_string())
            .spawn(move || {
                Self::relay(io::stdin().lock(), &events);
                let _ = events.send(InputEvent::Shutdown);
            })?;
        Ok(handle)
    }

    /// Relaie les lignes de `reader` jusqu'à la fin du flux ou la fermeture de la boucle.
    pub fn relay<R: BufRead>(reader: R, events: &Sender<InputEvent>) {
        for line in reader.lines().map_while(|line| line.ok()) {
            match Self::parse(&line) {
                Some(event) => {
                    if events.send(event).is_err() {
                        return;
                    }
                }
                None if line.trim().is_empty() => {}
                None => tracing::warn!(line=%line, "Unknown console command (s<N>, ir <CODE>, q)"),
            }
        }
    }
}
