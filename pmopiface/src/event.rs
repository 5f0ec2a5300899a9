//! Événements d'entrée produits par les sources.

use std::fmt;

/// Sens de la transition d'un bouton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Bouton enfoncé
    On,
    /// Bouton relâché
    Off,
}

/// Événement délivré à la boucle de l'[`EventListener`](crate::EventListener).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Transition d'un bouton de la carte (`pin` de 0 à 7).
    Switch { pin: u8, direction: Direction },
    /// Touche de télécommande décodée par lircd (nom de la touche).
    Ir { code: String },
    /// Demande d'arrêt de la boucle d'écoute.
    Shutdown,
    /// Une source s'est arrêtée sur une erreur matérielle ; la boucle
    /// d'écoute se termine en erreur.
    SourceFailed { name: String, reason: String },
}

impl InputEvent {
    pub fn switch_pressed(pin: u8) -> Self {
        InputEvent::Switch {
            pin,
            direction: Direction::On,
        }
    }

    pub fn ir(code: impl Into<String>) -> Self {
        InputEvent::Ir { code: code.into() }
    }

    pub fn source_failed(name: impl Into<String>, reason: impl ToString) -> Self {
        InputEvent::SourceFailed {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Valeur numérique associée à l'événement : numéro du bouton, ou code IR
    /// s'il s'agit d'un nombre.
    pub fn number(&self) -> Option<i64> {
        match self {
            InputEvent::Switch { pin, .. } => Some(i64::from(*pin)),
            InputEvent::Ir { code } => code.trim().parse().ok(),
            InputEvent::Shutdown | InputEvent::SourceFailed { .. } => None,
        }
    }
}

impl fmt::Display for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputEvent::Switch { pin, direction } => write!(f, "switch {} {:?}", pin, direction),
            InputEvent::Ir { code } => write!(f, "ir {}", code),
            InputEvent::Shutdown => write!(f, "shutdown"),
            InputEvent::SourceFailed { name, reason } => {
                write!(f, "source {} failed: {}", name, reason)
            }
        }
    }
}
