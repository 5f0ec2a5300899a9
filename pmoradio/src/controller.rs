//! Contrôleur de la radio.
//!
//! Possède l'écran, le lanceur du lecteur et le catalogue. Chaque changement
//! d'état (lecture, arrêt, changement de station) est répercuté sur l'écran :
//!
//! ```text
//! ┌────────────────┐
//! │▶               │  glyphe PLAY / PAUSE
//! │4/7 Heart       │  index/total nom
//! └────────────────┘
//! ```
//!
//! Le contrôleur n'est pas partagé : la boucle d'écoute le reçoit en `&mut`
//! et appelle ses opérations une à une.

use std::thread;
use std::time::Duration;

use pmopiface::{LCD_WIDTH, Lcd, LcdBitmap};
use tracing::{debug, info};

use crate::diagnostics::{HostInfo, SystemHost};
use crate::error::{RadioError, Result};
use crate::player::{PlayerLauncher, PlayerProcess};
use crate::schedule::format_hour;
use crate::station::{Station, StationCatalog};

pub const PLAY_SYMBOL_INDEX: u8 = 0;
pub const PAUSE_SYMBOL_INDEX: u8 = 1;

pub const PLAY_SYMBOL: LcdBitmap = LcdBitmap::new([0x10, 0x18, 0x1c, 0x1e, 0x1c, 0x18, 0x10, 0x0]);
pub const PAUSE_SYMBOL: LcdBitmap = LcdBitmap::new([0x0, 0x1b, 0x1b, 0x1b, 0x1b, 0x1b, 0x0, 0x0]);

pub const DEFAULT_DIAGNOSTIC_HOLD: Duration = Duration::from_secs(5);

const MAC_TITLE: &str = "MAC ADDRESS";
const IP_TITLE: &str = "IP ADDRESS";
const SLEEP_TITLE: &str = "SLEEPING...zzzzz";

/// Réglages d'affichage du contrôleur.
pub struct RadioOptions {
    /// Durée d'affichage des vues de diagnostic.
    pub hold: Duration,
    pub host: Box<dyn HostInfo + Send>,
}

impl Default for RadioOptions {
    fn default() -> Self {
        Self {
            hold: DEFAULT_DIAGNOSTIC_HOLD,
            host: Box::new(SystemHost::default()),
        }
    }
}

enum Playback<P> {
    Stopped,
    Playing(P),
}

pub struct RadioController<D, L: PlayerLauncher> {
    display: D,
    launcher: L,
    catalog: StationCatalog,
    current: usize,
    playback: Playback<L::Process>,
    options: RadioOptions,
}

impl<D: Lcd, L: PlayerLauncher> RadioController<D, L> {
    /// Prépare l'écran (rétroéclairage, pas de curseur) et charge les glyphes.
    ///
    /// La radio démarre arrêtée sur la station `start` (repliée modulo le catalogue).
    pub fn new(
        mut display: D,
        launcher: L,
        catalog: StationCatalog,
        start: i64,
        options: RadioOptions,
    ) -> Result<Self> {
        display.blink_off()?;
        display.cursor_off()?;
        display.backlight_on()?;
        display.store_custom_bitmap(PLAY_SYMBOL_INDEX, &PLAY_SYMBOL)?;
        display.store_custom_bitmap(PAUSE_SYMBOL_INDEX, &PAUSE_SYMBOL)?;

        let current = catalog.wrap(start);
        debug!(stations = catalog.len(), start = current, "Radio controller ready");
        Ok(Self {
            display,
            launcher,
            catalog,
            current,
            playback: Playback::Stopped,
            options,
        })
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.playback, Playback::Playing(_))
    }

    /// PID du lecteur en cours, s'il y en a un.
    pub fn player_id(&self) -> Option<u32> {
        match &self.playback {
            Playback::Playing(process) => Some(process.id()),
            Playback::Stopped => None,
        }
    }

    pub fn current_station_index(&self) -> usize {
        self.current
    }

    pub fn current_station(&self) -> &Station {
        self.catalog.get(self.current as i64)
    }

    pub fn catalog(&self) -> &StationCatalog {
        &self.catalog
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    pub fn play(&mut self) -> Result<()> {
        if self.is_playing() {
            return Err(RadioError::AlreadyPlaying);
        }
        let station = self.catalog.get(self.current as i64);
        info!(station=%station.name, index = self.current, "Playing");
        let process = self.launcher.launch(&station.source)?;
        self.playback = Playback::Playing(process);
        self.update_display()
    }

    /// Arrête le lecteur. Si le signal d'arrêt échoue, la radio reste en
    /// lecture : le lecteur tourne peut-être encore.
    pub fn stop(&mut self) -> Result<()> {
        let Playback::Playing(process) = &mut self.playback else {
            return Err(RadioError::NotPlaying);
        };
        info!(pid = process.id(), "Stopping");
        process.terminate()?;
        self.playback = Playback::Stopped;
        self.update_playing()
    }

    pub fn toggle_playing(&mut self) -> Result<()> {
        if self.is_playing() {
            self.stop()
        } else {
            self.play()
        }
    }

    /// Sélectionne la station `index` (repliée modulo le catalogue).
    ///
    /// En cours de lecture, le lecteur est relancé sur la nouvelle station ;
    /// à l'arrêt, seul l'affichage change.
    pub fn change_station(&mut self, index: i64) -> Result<()> {
        let was_playing = self.is_playing();
        if was_playing {
            self.stop()?;
        }
        self.current = self.catalog.wrap(index);
        debug!(index = self.current, "Station changed");
        if was_playing {
            self.play()
        } else {
            self.update_display()
        }
    }

    pub fn next_station(&mut self) -> Result<()> {
        self.change_station(self.current as i64 + 1)
    }

    pub fn previous_station(&mut self) -> Result<()> {
        self.change_station(self.current as i64 - 1)
    }

    /// Redessine tout l'écran : glyphe en (0, 0), station en (1, 0).
    pub fn update_display(&mut self) -> Result<()> {
        self.display.clear()?;
        self.update_playing()?;
        self.update_station()
    }

    pub fn update_playing(&mut self) -> Result<()> {
        let glyph = if self.is_playing() {
            PLAY_SYMBOL_INDEX
        } else {
            PAUSE_SYMBOL_INDEX
        };
        self.display.set_cursor(0, 0)?;
        self.display.write_custom_bitmap(glyph)?;
        Ok(())
    }

    pub fn update_station(&mut self) -> Result<()> {
        let line = format!(
            "{}/{} {}",
            self.current + 1,
            self.catalog.len(),
            self.catalog.get(self.current as i64).name
        );
        self.display.set_cursor(1, 0)?;
        self.display.write(&line)?;
        Ok(())
    }

    /// Affiche l'adresse MAC. Ses 17 caractères ne tiennent pas sur 16
    /// colonnes : l'affichage est décalé d'un cran à mi-parcours.
    pub fn view_mac_address(&mut self) -> Result<()> {
        let mac = self.options.host.mac_address();
        info!(mac=%mac, "Showing MAC address");
        self.show_two_lines(MAC_TITLE, &mac)?;
        self.hold();
        self.display.move_left()?;
        self.hold();
        self.update_display()
    }

    pub fn view_hostname(&mut self) -> Result<()> {
        let hostname = self.options.host.hostname();
        info!(hostname=%hostname, "Showing hostname");
        let (first, rest) = split_at_width(&hostname, LCD_WIDTH as usize);
        self.show_two_lines(first, rest)?;
        self.hold();
        self.update_display()
    }

    pub fn view_ip_address(&mut self) -> Result<()> {
        let ip = self.options.host.ip_address();
        info!(ip=%ip, "Showing IP address");
        self.show_two_lines(IP_TITLE, &ip)?;
        self.hold();
        self.update_display()
    }

    /// Écran affiché quand la radio ne démarre pas au boot.
    pub fn show_sleep_screen(&mut self, wake_hour: u32) -> Result<()> {
        self.display.backlight_off()?;
        self.display.cursor_off()?;
        self.display.blink_off()?;
        self.display.clear()?;
        self.display
            .write(&format!("{}\nWaking up at {}", SLEEP_TITLE, format_hour(wake_hour)))?;
        Ok(())
    }

    /// Rallume l'écran après [`RadioController::show_sleep_screen`].
    pub fn wake_display(&mut self) -> Result<()> {
        self.display.backlight_on()?;
        self.update_display()
    }

    /// Arrête le lecteur s'il tourne, efface l'écran et éteint le rétroéclairage.
    pub fn close(&mut self) -> Result<()> {
        info!("Closing radio");
        if self.is_playing() {
            self.stop()?;
        }
        self.display.clear()?;
        self.display.backlight_off()?;
        Ok(())
    }

    fn show_two_lines(&mut self, top: &str, bottom: &str) -> Result<()> {
        self.display.clear()?;
        self.display.write(&format!("{}\n{}", top, bottom))?;
        Ok(())
    }

    fn hold(&self) {
        if !self.options.hold.is_zero() {
            thread::sleep(self.options.hold);
        }
    }
}

/// Coupe `text` après `width` caractères.
fn split_at_width(text: &str, width: usize) -> (&str, &str) {
    let split = text
        .char_indices()
        .nth(width)
        .map_or(text.len(), |(i, _)| i);
    text.split_at(split)
}
