//! Extension pour lire la section `radio` de pmoconfig
//!
//! Ce module fournit le trait `RadioConfigExt` qui ajoute à
//! `pmoconfig::Config` les getters de la radio :
//!
//! - catalogue des stations et station de départ
//! - horaires de démarrage automatique
//! - commande du lecteur externe
//! - écran et vues de diagnostic
//! - association des boutons et touches IR
//!
//! # Exemple
//!
//! ```no_run
//! use pmoconfig::get_config;
//! use pmoradio::RadioConfigExt;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = get_config();
//! for station in config.get_radio_stations()? {
//!     println!("{} -> {}", station.name, station.source);
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use pmoconfig::Config;
use pmopiface::sources::DEFAULT_LIRCD_SOCKET;
use serde_yaml::Value;

use crate::actions::{Bindings, RadioAction};
use crate::controller::{DEFAULT_DIAGNOSTIC_HOLD, RadioOptions};
use crate::diagnostics::{DEFAULT_HOSTNAME_SUFFIX, DEFAULT_NETWORK_INTERFACE, SystemHost};
use crate::player::{DEFAULT_INSTALL_HINT, PlayerCommand, ProcessLauncher};
use crate::schedule::{self, ScheduleGate};
use crate::station::Station;

pub const DEFAULT_START_STATION: i64 = 3;

/// Écran utilisé par le binaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayBackend {
    /// Carte PiFace Control & Display réelle.
    Piface,
    /// Écran émulé, journalisé, piloté depuis stdin.
    Console,
}

impl FromStr for DisplayBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "piface" => Ok(DisplayBackend::Piface),
            "console" => Ok(DisplayBackend::Console),
            other => Err(anyhow!("Unknown display backend '{}'", other)),
        }
    }
}

impl fmt::Display for DisplayBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayBackend::Piface => write!(f, "piface"),
            DisplayBackend::Console => write!(f, "console"),
        }
    }
}

/// Trait d'extension pour la configuration de la radio dans pmoconfig
///
/// Comme pour les autres extensions, les getters des valeurs simples
/// persistent la valeur par défaut quand la clé est absente.
pub trait RadioConfigExt {
    // ========================================================================
    // Stations
    // ========================================================================

    /// Catalogue des stations (`radio.stations`), dans l'ordre du fichier.
    fn get_radio_stations(&self) -> Result<Vec<Station>>;

    /// Index de la station sélectionnée au démarrage (défaut 3).
    fn get_radio_start_station(&self) -> Result<i64>;

    fn set_radio_start_station(&self, index: i64) -> Result<()>;

    // ========================================================================
    // Schedule
    // ========================================================================

    /// Seuils de démarrage automatique (`radio.schedule`).
    fn get_radio_schedule(&self) -> Result<ScheduleGate>;

    /// Quitter (code 0) après l'écran de veille plutôt qu'attendre les boutons.
    fn get_radio_exit_when_asleep(&self) -> Result<bool>;

    fn set_radio_exit_when_asleep(&self, exit: bool) -> Result<()>;

    // ========================================================================
    // Player
    // ========================================================================

    fn get_radio_player_command(&self) -> Result<PlayerCommand>;

    /// Lanceur complet : commande, sortie du lecteur, message d'installation.
    fn get_radio_player_launcher(&self) -> Result<ProcessLauncher>;

    // ========================================================================
    // Display
    // ========================================================================

    fn get_radio_display_backend(&self) -> Result<DisplayBackend>;

    fn set_radio_display_backend(&self, backend: DisplayBackend) -> Result<()>;

    fn get_radio_diagnostic_hold(&self) -> Result<Duration>;

    fn get_radio_network_interface(&self) -> Result<String>;

    fn get_radio_hostname_suffix(&self) -> Result<String>;

    /// Options du contrôleur construites à partir de la section `radio.display`.
    fn get_radio_options(&self) -> Result<RadioOptions>;

    // ========================================================================
    // Input
    // ========================================================================

    /// Associations `radio.input.switches` et `radio.input.ir`.
    fn get_radio_bindings(&self) -> Result<Bindings>;

    fn get_radio_lirc_enabled(&self) -> Result<bool>;

    fn get_radio_lirc_socket(&self) -> Result<String>;
}

impl RadioConfigExt for Config {
    fn get_radio_stations(&self) -> Result<Vec<Station>> {
        let value = self
            .get_value(&["radio", "stations"])
            .context("No station list in configuration")?;
        serde_yaml::from_value(value).context("Invalid radio.stations entry")
    }

    fn get_radio_start_station(&self) -> Result<i64> {
        if let Ok(Value::Number(n)) = self.get_value(&["radio", "start_station"]) {
            if let Some(index) = n.as_i64() {
                return Ok(index);
            }
        }
        self.set_radio_start_station(DEFAULT_START_STATION)?;
        Ok(DEFAULT_START_STATION)
    }

    fn set_radio_start_station(&self, index: i64) -> Result<()> {
        self.set_value(
            &["radio", "start_station"],
            Value::Number(serde_yaml::Number::from(index)),
        )
    }

    fn get_radio_schedule(&self) -> Result<ScheduleGate> {
        let wake = hour_or(self, "wake_hour", schedule::DEFAULT_WAKE_HOUR);
        let bedtime = hour_or(
            self,
            "weekday_bedtime_hour",
            schedule::DEFAULT_WEEKDAY_BEDTIME_HOUR,
        );
        let mut gate = ScheduleGate::new(wake, bedtime)?;

        if let Ok(value) = self.get_value(&["radio", "schedule", "late_days"]) {
            let names: Vec<String> =
                serde_yaml::from_value(value).context("Invalid radio.schedule.late_days")?;
            let days = names
                .iter()
                .map(|name| schedule::parse_weekday(name))
                .collect::<crate::Result<Vec<_>>>()?;
            gate = gate.with_late_days(days);
        }
        Ok(gate)
    }

    fn get_radio_exit_when_asleep(&self) -> Result<bool> {
        match self.get_value(&["radio", "schedule", "exit_when_asleep"]) {
            Ok(Value::Bool(b)) => Ok(b),
            _ => {
                self.set_radio_exit_when_asleep(true)?;
                Ok(true)
            }
        }
    }

    fn set_radio_exit_when_asleep(&self, exit: bool) -> Result<()> {
        self.set_value(&["radio", "schedule", "exit_when_asleep"], Value::Bool(exit))
    }

    fn get_radio_player_command(&self) -> Result<PlayerCommand> {
        let defaults = PlayerCommand::default();
        let program = string_or(self, &["radio", "player", "program"], &defaults.program);
        let playlist_flag = string_or(
            self,
            &["radio", "player", "playlist_flag"],
            &defaults.playlist_flag,
        );
        let args = match self.get_value(&["radio", "player", "args"]) {
            Ok(value) => serde_yaml::from_value(value).context("Invalid radio.player.args")?,
            Err(_) => defaults.args,
        };
        let playlist_extensions = match self.get_value(&["radio", "player", "playlist_extensions"])
        {
            Ok(value) => serde_yaml::from_value(value)
                .context("Invalid radio.player.playlist_extensions")?,
            Err(_) => defaults.playlist_extensions,
        };
        Ok(PlayerCommand {
            program,
            args,
            playlist_flag,
            playlist_extensions,
        })
    }

    fn get_radio_player_launcher(&self) -> Result<ProcessLauncher> {
        let show_output = matches!(
            self.get_value(&["radio", "player", "show_output"]),
            Ok(Value::Bool(true))
        );
        let hint = string_or(self, &["radio", "player", "install_hint"], DEFAULT_INSTALL_HINT);
        Ok(ProcessLauncher::new(self.get_radio_player_command()?)
            .with_output(show_output)
            .with_install_hint(hint))
    }

    fn get_radio_display_backend(&self) -> Result<DisplayBackend> {
        match self.get_value(&["radio", "display", "backend"]) {
            Ok(Value::String(s)) => s.parse(),
            _ => {
                self.set_radio_display_backend(DisplayBackend::Piface)?;
                Ok(DisplayBackend::Piface)
            }
        }
    }

    fn set_radio_display_backend(&self, backend: DisplayBackend) -> Result<()> {
        self.set_value(
            &["radio", "display", "backend"],
            Value::String(backend.to_string()),
        )
    }

    fn get_radio_diagnostic_hold(&self) -> Result<Duration> {
        match self.get_value(&["radio", "display", "diagnostic_hold_secs"]) {
            Ok(Value::Number(n)) => match n.as_f64() {
                Some(secs) if secs >= 0.0 && secs.is_finite() => Ok(Duration::from_secs_f64(secs)),
                _ => Err(anyhow!("Invalid radio.display.diagnostic_hold_secs: {}", n)),
            },
            _ => Ok(DEFAULT_DIAGNOSTIC_HOLD),
        }
    }

    fn get_radio_network_interface(&self) -> Result<String> {
        Ok(string_or(
            self,
            &["radio", "display", "network_interface"],
            DEFAULT_NETWORK_INTERFACE,
        ))
    }

    fn get_radio_hostname_suffix(&self) -> Result<String> {
        Ok(string_or(
            self,
            &["radio", "display", "hostname_suffix"],
            DEFAULT_HOSTNAME_SUFFIX,
        ))
    }

    fn get_radio_options(&self) -> Result<RadioOptions> {
        Ok(RadioOptions {
            hold: self.get_radio_diagnostic_hold()?,
            host: Box::new(SystemHost::new(
                self.get_radio_network_interface()?,
                self.get_radio_hostname_suffix()?,
            )),
        })
    }

    fn get_radio_bindings(&self) -> Result<Bindings> {
        let mut bindings = Bindings::new();

        match self.get_value(&["radio", "input", "switches"]) {
            Ok(Value::Mapping(map)) => {
                for (key, value) in map {
                    let pin = switch_pin(&key)?;
                    bindings = bindings.bind_switch(pin, action(&value)?);
                }
            }
            Ok(Value::Null) => {}
            Ok(other) => return Err(anyhow!("Invalid radio.input.switches: {:?}", other)),
            Err(_) => bindings = Bindings::piface_defaults(),
        }

        if let Ok(Value::Mapping(map)) = self.get_value(&["radio", "input", "ir"]) {
            for (key, value) in map {
                bindings = bindings.bind_ir(ir_key(&key)?, action(&value)?);
            }
        }
        Ok(bindings)
    }

    fn get_radio_lirc_enabled(&self) -> Result<bool> {
        Ok(matches!(
            self.get_value(&["radio", "input", "lirc_enabled"]),
            Ok(Value::Bool(true))
        ))
    }

    fn get_radio_lirc_socket(&self) -> Result<String> {
        Ok(string_or(
            self,
            &["radio", "input", "lirc_socket"],
            DEFAULT_LIRCD_SOCKET,
        ))
    }
}

fn string_or(config: &Config, path: &[&str], default: &str) -> String {
    match config.get_value(path) {
        Ok(Value::String(s)) => s,
        _ => default.to_string(),
    }
}

fn hour_or(config: &Config, key: &str, default: u32) -> u32 {
    match config.get_value(&["radio", "schedule", key]) {
        Ok(Value::Number(n)) => n
            .as_u64()
            .and_then(|h| u32::try_from(h).ok())
            .unwrap_or(default),
        _ => default,
    }
}

fn switch_pin(key: &Value) -> Result<u8> {
    let pin = match key {
        Value::Number(n) => n.as_u64().and_then(|n| u8::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    pin.ok_or_else(|| anyhow!("Invalid switch number {:?}", key))
}

// Les touches numériques (`5: preset:5`) arrivent comme des nombres YAML
fn ir_key(key: &Value) -> Result<String> {
    match key {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(anyhow!("Invalid IR key {:?}", other)),
    }
}

fn action(value: &Value) -> Result<RadioAction> {
    match value {
        Value::String(s) => Ok(s.parse::<RadioAction>()?),
        other => Err(anyhow!("Invalid action {:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use std::fs;
    use tempfile::TempDir;

    fn config_with(yaml: Option<&str>) -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        if let Some(yaml) = yaml {
            fs::write(dir.path().join("config.yaml"), yaml).unwrap();
        }
        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        (dir, config)
    }

    #[test]
    fn test_default_catalog() {
        let (_dir, config) = config_with(None);
        let stations = config.get_radio_stations().unwrap();
        assert_eq!(stations.len(), 7);
        assert_eq!(stations[0].name, "Purple Radio");
        assert_eq!(stations[3].name, "Heart");
        assert_eq!(stations[6].name, "Planet Rock");
        assert_eq!(config.get_radio_start_station().unwrap(), 3);
    }

    #[test]
    fn test_default_schedule_and_player() {
        let (_dir, config) = config_with(None);
        assert_eq!(config.get_radio_schedule().unwrap(), ScheduleGate::default());
        assert!(config.get_radio_exit_when_asleep().unwrap());
        assert_eq!(
            config.get_radio_player_command().unwrap(),
            PlayerCommand::default()
        );
        assert_eq!(
            config.get_radio_display_backend().unwrap(),
            DisplayBackend::Piface
        );
        assert_eq!(
            config.get_radio_diagnostic_hold().unwrap(),
            Duration::from_secs(5)
        );
        assert_eq!(config.get_radio_lirc_socket().unwrap(), DEFAULT_LIRCD_SOCKET);
        assert!(!config.get_radio_lirc_enabled().unwrap());
    }

    #[test]
    fn test_default_bindings() {
        let (_dir, config) = config_with(None);
        assert_eq!(
            config.get_radio_bindings().unwrap(),
            Bindings::piface_defaults()
        );
    }

    #[test]
    fn test_overrides() {
        let (_dir, config) = config_with(Some(
            "radio:\n  \
               stations:\n    \
                 - name: Test FM\n      \
                   source: http://localhost/test.m3u\n  \
               schedule:\n    \
                 wake_hour: 6\n    \
                 late_days: [sun]\n  \
               display:\n    \
                 backend: Console\n    \
                 diagnostic_hold_secs: 0\n  \
               input:\n    \
                 switches:\n      \
                   5: preset\n    \
                 ir:\n      \
                   KEY_PLAY: toggle\n      \
                   7: preset:6\n      \
                   any: preset\n",
        ));

        let stations = config.get_radio_stations().unwrap();
        assert_eq!(stations, vec![Station::new("Test FM", "http://localhost/test.m3u")]);

        let gate = config.get_radio_schedule().unwrap();
        assert_eq!(gate.wake_hour(), 6);
        assert_eq!(gate.late_days(), &[Weekday::Sun]);

        assert_eq!(
            config.get_radio_display_backend().unwrap(),
            DisplayBackend::Console
        );
        assert_eq!(config.get_radio_diagnostic_hold().unwrap(), Duration::ZERO);

        // Les associations par défaut restent fusionnées avec celles du fichier
        let bindings = config.get_radio_bindings().unwrap();
        assert_eq!(bindings.switches()[&5], RadioAction::PresetFromEvent);
        assert_eq!(bindings.switches()[&0], RadioAction::TogglePlaying);
        assert_eq!(bindings.ir()["key_play"], RadioAction::TogglePlaying);
        assert_eq!(bindings.ir()["7"], RadioAction::Preset(6));
        assert_eq!(bindings.ir()["any"], RadioAction::PresetFromEvent);
    }

    #[test]
    fn test_invalid_action_is_reported() {
        let (_dir, config) = config_with(Some("radio:\n  input:\n    switches:\n      0: dance\n"));
        assert!(config.get_radio_bindings().is_err());
    }

    #[test]
    fn test_setters_persist() {
        let (dir, config) = config_with(None);
        config.set_radio_start_station(5).unwrap();
        config.set_radio_exit_when_asleep(false).unwrap();
        config
            .set_radio_display_backend(DisplayBackend::Console)
            .unwrap();

        let reloaded = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(reloaded.get_radio_start_station().unwrap(), 5);
        assert!(!reloaded.get_radio_exit_when_asleep().unwrap());
        assert_eq!(
            reloaded.get_radio_display_backend().unwrap(),
            DisplayBackend::Console
        );
    }
}
