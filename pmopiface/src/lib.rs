//! # pmopiface - PiFace Control & Display
//!
//! Accès à la carte PiFace CAD d'un Raspberry Pi :
//!
//! - [`Lcd`] : interface de l'écran caractères 2x16 (curseur, texte,
//!   caractères personnalisés, rétroéclairage)
//! - [`Hd44780`] : pilote HD44780 4 bits, branché sur le port B du MCP23S17
//! - [`MemoryLcd`] : émulateur en mémoire, pour les tests et le mode console
//! - [`EventListener`] : boucle de dispatch des [`InputEvent`] vers des handlers
//! - [`sources`] : producteurs d'événements (boutons, télécommande IR via lircd, stdin)
//!
//! ```no_run
//! use pmopiface::{Lcd, PiFaceCad};
//!
//! # fn main() -> pmopiface::Result<()> {
//! let (mut lcd, _switches) = PiFaceCad::open()?;
//! lcd.backlight_on()?;
//! lcd.write("Hello\nWorld")?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod event;
pub mod hd44780;
pub mod lcd;
pub mod listener;
pub mod mcp23s17;
pub mod memory;
pub mod piface;
pub mod sources;

pub use error::{CadError, Result};
pub use event::{Direction, InputEvent};
pub use hd44780::{Hd44780, LcdBus};
pub use lcd::{LCD_RAM_WIDTH, LCD_ROWS, LCD_WIDTH, Lcd, LcdBitmap, MAX_CUSTOM_BITMAPS};
pub use listener::{EventListener, Trigger};
pub use memory::MemoryLcd;
pub use piface::{PiFaceCad, PiFaceLcd, SwitchPort};
