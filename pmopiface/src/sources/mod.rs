//! Producteurs d'[`InputEvent`](crate::InputEvent).
//!
//! Chaque source tourne dans son propre thread et publie sur le canal
//! fourni par [`EventListener::sender`](crate::EventListener::sender).
//! Une source s'arrête dès que la boucle d'écoute a disparu. Si elle
//! s'arrête sur une erreur, elle le signale d'abord par un
//! [`InputEvent::SourceFailed`].

use std::fmt::Display;

use crossbeam_channel::Sender;

use crate::event::InputEvent;

pub mod console;
pub mod lirc;
pub mod switches;

pub use console::ConsoleSource;
pub use lirc::{DEFAULT_LIRCD_SOCKET, LircPacket, LircSource};
pub use switches::SwitchSource;

/// Journalise l'erreur fatale d'une source et la transmet à la boucle d'écoute.
pub(crate) fn report_failure(events: &Sender<InputEvent>, name: &str, err: impl Display) {
    tracing::error!(source = name, "Input source stopped: {}", err);
    if events.send(InputEvent::source_failed(name, err)).is_err() {
        tracing::debug!(source = name, "Input listener already gone");
    }
}
