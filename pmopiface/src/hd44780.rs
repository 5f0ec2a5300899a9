//! Pilote HD44780 en mode 4 bits.
//!
//! Le contrôleur est relié à un port 8 bits (port B du MCP23S17 sur la PiFace CAD) :
//!
//! | bit | signal    |
//! |-----|-----------|
//! | 0-3 | D4-D7     |
//! | 4   | EN        |
//! | 5   | RW        |
//! | 6   | RS        |
//! | 7   | backlight |

use std::thread;
use std::time::Duration;

use crate::error::Result;
use crate::lcd::{self, LCD_RAM_WIDTH, Lcd, LcdBitmap};

pub const PIN_ENABLE: u8 = 0x10;
pub const PIN_RW: u8 = 0x20;
pub const PIN_RS: u8 = 0x40;
pub const PIN_BACKLIGHT: u8 = 0x80;

pub const CMD_CLEAR_DISPLAY: u8 = 0x01;
pub const CMD_RETURN_HOME: u8 = 0x02;
pub const CMD_ENTRY_MODE_SET: u8 = 0x04;
pub const CMD_DISPLAY_CONTROL: u8 = 0x08;
pub const CMD_CURSOR_SHIFT: u8 = 0x10;
pub const CMD_FUNCTION_SET: u8 = 0x20;
pub const CMD_SET_CGRAM_ADDR: u8 = 0x40;
pub const CMD_SET_DDRAM_ADDR: u8 = 0x80;

// entry mode
pub const ENTRY_LEFT: u8 = 0x02;

// display control
pub const DISPLAY_ON: u8 = 0x04;
pub const CURSOR_ON: u8 = 0x02;
pub const BLINK_ON: u8 = 0x01;

// cursor / display shift
pub const DISPLAY_MOVE: u8 = 0x08;
pub const MOVE_RIGHT: u8 = 0x04;

// function set
pub const TWO_LINES: u8 = 0x08;

const ROW_OFFSETS: [u8; 2] = [0x00, 0x40];

const SETTLE_SHORT: Duration = Duration::from_micros(50);
const SETTLE_LONG: Duration = Duration::from_micros(2000);

/// Port 8 bits sur lequel le HD44780 est câblé.
pub trait LcdBus {
    fn write_port(&mut self, value: u8) -> Result<()>;
}

/// Écran HD44780 piloté en 4 bits à travers un [`LcdBus`].
pub struct Hd44780<B: LcdBus> {
    bus: B,
    backlight: bool,
    display_control: u8,
    cursor: (u8, u8),
    timing: bool,
}

impl<B: LcdBus> Hd44780<B> {
    /// Initialise le contrôleur : 4 bits, 2 lignes, affichage actif sans curseur.
    pub fn new(bus: B) -> Result<Self> {
        Self::with_timing(bus, true)
    }

    /// Comme [`Hd44780::new`], sans les temporisations (bus simulé).
    pub fn without_timing(bus: B) -> Result<Self> {
        Self::with_timing(bus, false)
    }

    fn with_timing(bus: B, timing: bool) -> Result<Self> {
        let mut lcd = Self {
            bus,
            backlight: false,
            display_control: DISPLAY_ON,
            cursor: (0, 0),
            timing,
        };
        lcd.initialise()?;
        Ok(lcd)
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    fn initialise(&mut self) -> Result<()> {
        self.settle(Duration::from_millis(15));
        // Séquence de reset par instruction : on force le mode 8 bits trois fois
        self.write_nibble(0x3, false)?;
        self.settle(Duration::from_millis(5));
        self.write_nibble(0x3, false)?;
        self.settle(Duration::from_millis(1));
        self.write_nibble(0x3, false)?;
        self.settle(Duration::from_millis(1));
        self.write_nibble(0x2, false)?;

        self.command(CMD_FUNCTION_SET | TWO_LINES)?;
        self.command(CMD_DISPLAY_CONTROL | self.display_control)?;
        self.clear()?;
        self.command(CMD_ENTRY_MODE_SET | ENTRY_LEFT)
    }

    fn settle(&self, duration: Duration) {
        if self.timing {
            thread::sleep(duration);
        }
    }

    fn port_bits(&self, nibble: u8, register_select: bool) -> u8 {
        let mut port = nibble & 0x0F;
        if register_select {
            port |= PIN_RS;
        }
        if self.backlight {
            port |= PIN_BACKLIGHT;
        }
        port
    }

    /// Présente un quartet et le valide par une impulsion sur EN.
    fn write_nibble(&mut self, nibble: u8, register_select: bool) -> Result<()> {
        let port = self.port_bits(nibble, register_select);
        self.bus.write_port(port | PIN_ENABLE)?;
        self.bus.write_port(port)
    }

    fn send(&mut self, byte: u8, register_select: bool) -> Result<()> {
        self.write_nibble(byte >> 4, register_select)?;
        self.write_nibble(byte & 0x0F, register_select)?;
        self.settle(SETTLE_SHORT);
        Ok(())
    }

    fn command(&mut self, command: u8) -> Result<()> {
        self.send(command, false)?;
        if command == CMD_CLEAR_DISPLAY || command == CMD_RETURN_HOME {
            self.settle(SETTLE_LONG);
        }
        Ok(())
    }

    fn update_display_control(&mut self, set: u8, clear: u8) -> Result<()> {
        self.display_control = (self.display_control | set) & !clear;
        self.command(CMD_DISPLAY_CONTROL | self.display_control)
    }

    fn set_backlight(&mut self, on: bool) -> Result<()> {
        self.backlight = on;
        // Pas d'impulsion EN : seule la broche de rétroéclairage change
        let port = self.port_bits(0, false);
        self.bus.write_port(port)
    }
}

impl<B: LcdBus> Lcd for Hd44780<B> {
    fn clear(&mut self) -> Result<()> {
        self.command(CMD_CLEAR_DISPLAY)?;
        self.cursor = (0, 0);
        Ok(())
    }

    fn home(&mut self) -> Result<()> {
        self.command(CMD_RETURN_HOME)?;
        self.cursor = (0, 0);
        Ok(())
    }

    fn set_cursor(&mut self, row: u8, col: u8) -> Result<()> {
        lcd::check_cursor(row, col)?;
        self.command(CMD_SET_DDRAM_ADDR | (ROW_OFFSETS[row as usize] + col))?;
        self.cursor = (row, col);
        Ok(())
    }

    fn cursor(&self) -> (u8, u8) {
        self.cursor
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.send(byte, true)?;
        let (row, col) = self.cursor;
        let next = lcd::advance(row, col);
        if next.0 != row {
            // Le contrôleur ne saute pas de lui-même de 0x27 à 0x40
            self.set_cursor(next.0, next.1)?;
        }
        self.cursor = next;
        Ok(())
    }

    fn store_custom_bitmap(&mut self, index: u8, bitmap: &LcdBitmap) -> Result<()> {
        lcd::check_bitmap_index(index)?;
        self.command(CMD_SET_CGRAM_ADDR | (index << 3))?;
        for row in bitmap.rows() {
            self.send(row, true)?;
        }
        // Retour en DDRAM à la position courante
        let (row, col) = self.cursor;
        self.set_cursor(row, col.min(LCD_RAM_WIDTH - 1))
    }

    fn backlight_on(&mut self) -> Result<()> {
        self.set_backlight(true)
    }

    fn backlight_off(&mut self) -> Result<()> {
        self.set_backlight(false)
    }

    fn cursor_on(&mut self) -> Result<()> {
        self.update_display_control(CURSOR_ON, 0)
    }

    fn cursor_off(&mut self) -> Result<()> {
        self.update_display_control(0, CURSOR_ON)
    }

    fn blink_on(&mut self) -> Result<()> {
        self.update_display_control(BLINK_ON, 0)
    }

    fn blink_off(&mut self) -> Result<()> {
        self.update_display_control(0, BLINK_ON)
    }

    fn move_left(&mut self) -> Result<()> {
        self.command(CMD_CURSOR_SHIFT | DISPLAY_MOVE)
    }

    fn move_right(&mut self) -> Result<()> {
        self.command(CMD_CURSOR_SHIFT | DISPLAY_MOVE | MOVE_RIGHT)
    }
}
