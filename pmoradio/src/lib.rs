//! # pmoradio - Radio Internet sur PiFace CAD
//!
//! Le cœur de PMORadio :
//!
//! - [`StationCatalog`] : liste fixe des stations, index circulaire
//! - [`player`] : lancement et arrêt du lecteur externe (mplayer) dans son
//!   propre groupe de processus
//! - [`RadioController`] : état lecture/arrêt, station courante, affichage
//! - [`ScheduleGate`] : décision de démarrage automatique au boot
//! - [`Bindings`] : association boutons / touches IR → [`RadioAction`]
//! - [`RadioConfigExt`] : lecture de la section `radio` de la configuration
//! - [`logs`] : initialisation de `tracing`
//!
//! ## Exemple
//!
//! ```no_run
//! use pmoconfig::get_config;
//! use pmopiface::MemoryLcd;
//! use pmoradio::{RadioConfigExt, RadioController, StationCatalog};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = get_config();
//! let catalog = StationCatalog::new(config.get_radio_stations()?)?;
//! let mut radio = RadioController::new(
//!     MemoryLcd::new(),
//!     config.get_radio_player_launcher()?,
//!     catalog,
//!     config.get_radio_start_station()?,
//!     config.get_radio_options()?,
//! )?;
//! radio.toggle_playing()?;
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod config_ext;
pub mod controller;
pub mod diagnostics;
pub mod error;
pub mod logs;
pub mod player;
pub mod schedule;
pub mod station;

pub use actions::{Bindings, RadioAction};
pub use config_ext::{DisplayBackend, RadioConfigExt};
pub use controller::{RadioController, RadioOptions};
pub use diagnostics::{HostInfo, SystemHost};
pub use error::{RadioError, Result};
pub use logs::{LogHandle, init_logging};
pub use player::{ChildProcess, PlayerCommand, PlayerLauncher, PlayerProcess, ProcessLauncher};
pub use schedule::ScheduleGate;
pub use station::{Station, StationCatalog};
