//! Association des entrées (boutons, télécommande) aux opérations de la radio.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use pmopiface::{EventListener, InputEvent, Lcd, Trigger};
use tracing::warn;

use crate::controller::RadioController;
use crate::error::{RadioError, Result};
use crate::player::PlayerLauncher;

/// Clé IR qui capture toutes les touches de la télécommande.
pub const ANY_IR_KEY: &str = "any";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioAction {
    TogglePlaying,
    PreviousStation,
    NextStation,
    ViewHostname,
    ViewMacAddress,
    ViewIpAddress,
    /// Station désignée par l'événement lui-même (numéro de bouton ou touche numérique).
    PresetFromEvent,
    Preset(i64),
}

impl RadioAction {
    pub fn apply<D, L>(self, radio: &mut RadioController<D, L>, event: &InputEvent) -> Result<()>
    where
        D: Lcd,
        L: PlayerLauncher,
    {
        tracing::debug!(action=%self, event=%event, "Applying action");
        match self {
            RadioAction::TogglePlaying => radio.toggle_playing(),
            RadioAction::PreviousStation => radio.previous_station(),
            RadioAction::NextStation => radio.next_station(),
            RadioAction::ViewHostname => radio.view_hostname(),
            RadioAction::ViewMacAddress => radio.view_mac_address(),
            RadioAction::ViewIpAddress => radio.view_ip_address(),
            RadioAction::Preset(index) => radio.change_station(index),
            RadioAction::PresetFromEvent => match event.number() {
                Some(index) => radio.change_station(index),
                None => {
                    warn!(event=%event, "Event does not designate a station, ignored");
                    Ok(())
                }
            },
        }
    }
}

impl FromStr for RadioAction {
    type Err = RadioError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_lowercase();
        let action = match name.as_str() {
            "toggle" => RadioAction::TogglePlaying,
            "previous" | "prev" => RadioAction::PreviousStation,
            "next" => RadioAction::NextStation,
            "hostname" => RadioAction::ViewHostname,
            "mac" => RadioAction::ViewMacAddress,
            "ip" => RadioAction::ViewIpAddress,
            "preset" => RadioAction::PresetFromEvent,
            other => match other.strip_prefix("preset:") {
                Some(index) => index
                    .trim()
                    .parse()
                    .map(RadioAction::Preset)
                    .map_err(|_| RadioError::InvalidAction(s.to_string()))?,
                None => return Err(RadioError::InvalidAction(s.to_string())),
            },
        };
        Ok(action)
    }
}

impl fmt::Display for RadioAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RadioAction::TogglePlaying => write!(f, "toggle"),
            RadioAction::PreviousStation => write!(f, "previous"),
            RadioAction::NextStation => write!(f, "next"),
            RadioAction::ViewHostname => write!(f, "hostname"),
            RadioAction::ViewMacAddress => write!(f, "mac"),
            RadioAction::ViewIpAddress => write!(f, "ip"),
            RadioAction::PresetFromEvent => write!(f, "preset"),
            RadioAction::Preset(index) => write!(f, "preset:{}", index),
        }
    }
}

/// Table boutons → actions et touches IR → actions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    switches: BTreeMap<u8, RadioAction>,
    ir: BTreeMap<String, RadioAction>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Boutons 0 à 4 de la PiFace : lecture/arrêt, précédente, suivante,
    /// nom d'hôte, adresse MAC.
    pub fn piface_defaults() -> Self {
        Self::new()
            .bind_switch(0, RadioAction::TogglePlaying)
            .bind_switch(1, RadioAction::PreviousStation)
            .bind_switch(2, RadioAction::NextStation)
            .bind_switch(3, RadioAction::ViewHostname)
            .bind_switch(4, RadioAction::ViewMacAddress)
    }

    pub fn bind_switch(mut self, pin: u8, action: RadioAction) -> Self {
        self.switches.insert(pin, action);
        self
    }

    /// Les touches IR sont comparées sans tenir compte de la casse ;
    /// [`ANY_IR_KEY`] capture toutes les touches.
    pub fn bind_ir(mut self, key: impl Into<String>, action: RadioAction) -> Self {
        self.ir.insert(key.into().to_lowercase(), action);
        self
    }

    pub fn switches(&self) -> &BTreeMap<u8, RadioAction> {
        &self.switches
    }

    pub fn ir(&self) -> &BTreeMap<String, RadioAction> {
        &self.ir
    }

    /// Enregistre un handler par association dans `listener`.
    pub fn register<D, L>(&self, listener: &mut EventListener<RadioController<D, L>, RadioError>)
    where
        D: Lcd + 'static,
        L: PlayerLauncher + 'static,
    {
        for (&pin, &action) in &self.switches {
            listener.register(Trigger::switch_on(pin), move |radio, event| {
                action.apply(radio, event)
            });
        }
        for (key, &action) in &self.ir {
            let trigger = if key == ANY_IR_KEY {
                Trigger::AnyIr
            } else {
                Trigger::ir(key.clone())
            };
            listener.register(trigger, move |radio, event| action.apply(radio, event));
        }
    }
}
