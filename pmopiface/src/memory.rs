//! Écran émulé en mémoire.
//!
//! Reproduit la géométrie d'un HD44780 2x16 (40 octets de DDRAM par ligne,
//! 8 caractères personnalisés, décalage de l'affichage) sans matériel.
//! Sert aux tests et au mode `console`, où chaque changement est journalisé.

use crate::error::Result;
use crate::lcd::{self, LCD_RAM_WIDTH, LCD_ROWS, LCD_WIDTH, Lcd, LcdBitmap, MAX_CUSTOM_BITMAPS};

const RAM_WIDTH: usize = LCD_RAM_WIDTH as usize;
const ROWS: usize = LCD_ROWS as usize;

#[derive(Debug, Clone)]
pub struct MemoryLcd {
    ddram: [[u8; RAM_WIDTH]; ROWS],
    cgram: [LcdBitmap; MAX_CUSTOM_BITMAPS as usize],
    cursor: (u8, u8),
    shift: u8,
    backlight: bool,
    cursor_visible: bool,
    blink: bool,
    echo: bool,
}

impl Default for MemoryLcd {
    fn default() -> Self {
        Self {
            ddram: [[b' '; RAM_WIDTH]; ROWS],
            cgram: [LcdBitmap::default(); MAX_CUSTOM_BITMAPS as usize],
            cursor: (0, 0),
            shift: 0,
            backlight: false,
            cursor_visible: false,
            blink: false,
            echo: false,
        }
    }
}

impl MemoryLcd {
    pub fn new() -> Self {
        Self::default()
    }

    /// Écran qui journalise son contenu visible après chaque écriture.
    pub fn with_echo() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    /// Octets visibles d'une ligne, compte tenu du décalage de l'affichage.
    pub fn visible_bytes(&self, row: u8) -> Vec<u8> {
        let line = &self.ddram[row as usize % ROWS];
        (0..LCD_WIDTH as usize)
            .map(|col| line[(col + self.shift as usize) % RAM_WIDTH])
            .collect()
    }

    /// Texte visible d'une ligne ; un caractère personnalisé `n` apparaît
    /// comme le caractère de code `n`.
    pub fn visible_text(&self, row: u8) -> String {
        self.visible_bytes(row).into_iter().map(char::from).collect()
    }

    /// Texte visible des deux lignes, caractères personnalisés rendus par `#`.
    pub fn render(&self) -> [String; 2] {
        [0, 1].map(|row| {
            self.visible_bytes(row)
                .into_iter()
                .map(|b| {
                    if b < MAX_CUSTOM_BITMAPS {
                        '#'
                    } else {
                        char::from(b)
                    }
                })
                .collect()
        })
    }

    /// Contenu complet de la DDRAM d'une ligne, espaces de fin retirés.
    pub fn line(&self, row: u8) -> String {
        let text: String = self.ddram[row as usize % ROWS]
            .iter()
            .map(|b| char::from(*b))
            .collect();
        text.trim_end().to_string()
    }

    pub fn custom_bitmap(&self, index: u8) -> Option<LcdBitmap> {
        self.cgram.get(index as usize).copied()
    }

    pub fn is_backlight_on(&self) -> bool {
        self.backlight
    }

    pub fn is_cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    pub fn is_blinking(&self) -> bool {
        self.blink
    }

    pub fn shift(&self) -> u8 {
        self.shift
    }

    fn changed(&self) {
        if self.echo {
            let [top, bottom] = self.render();
            tracing::info!(
                target: "pmopiface::lcd",
                backlight = self.backlight,
                "|{}|{}|",
                top,
                bottom
            );
        }
    }
}

impl Lcd for MemoryLcd {
    fn clear(&mut self) -> Result<()> {
        self.ddram = [[b' '; RAM_WIDTH]; ROWS];
        self.cursor = (0, 0);
        self.shift = 0;
        Ok(())
    }

    fn home(&mut self) -> Result<()> {
        self.cursor = (0, 0);
        self.shift = 0;
        Ok(())
    }

    fn set_cursor(&mut self, row: u8, col: u8) -> Result<()> {
        lcd::check_cursor(row, col)?;
        self.cursor = (row, col);
        Ok(())
    }

    fn cursor(&self) -> (u8, u8) {
        self.cursor
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        let (row, col) = self.cursor;
        self.ddram[row as usize][col as usize] = byte;
        self.cursor = lcd::advance(row, col);
        Ok(())
    }

    fn write(&mut self, text: &str) -> Result<()> {
        for ch in text.chars() {
            if ch == '\n' {
                self.cursor = ((self.cursor.0 + 1) % LCD_ROWS, 0);
            } else {
                self.write_byte(lcd::lcd_byte(ch))?;
            }
        }
        self.changed();
        Ok(())
    }

    fn write_custom_bitmap(&mut self, index: u8) -> Result<()> {
        lcd::check_bitmap_index(index)?;
        self.write_byte(index)?;
        self.changed();
        Ok(())
    }

    fn store_custom_bitmap(&mut self, index: u8, bitmap: &LcdBitmap) -> Result<()> {
        lcd::check_bitmap_index(index)?;
        self.cgram[index as usize] = LcdBitmap::new(bitmap.rows());
        Ok(())
    }

    fn backlight_on(&mut self) -> Result<()> {
        self.backlight = true;
        Ok(())
    }

    fn backlight_off(&mut self) -> Result<()> {
        self.backlight = false;
        self.changed();
        Ok(())
    }

    fn cursor_on(&mut self) -> Result<()> {
        self.cursor_visible = true;
        Ok(())
    }

    fn cursor_off(&mut self) -> Result<()> {
        self.cursor_visible = false;
        Ok(())
    }

    fn blink_on(&mut self) -> Result<()> {
        self.blink = true;
        Ok(())
    }

    fn blink_off(&mut self) -> Result<()> {
        self.blink = false;
        Ok(())
    }

    fn move_left(&mut self) -> Result<()> {
        self.shift = (self.shift + 1) % LCD_RAM_WIDTH;
        self.changed();
        Ok(())
    }

    fn move_right(&mut self) -> Result<()> {
        self.shift = (self.shift + LCD_RAM_WIDTH - 1) % LCD_RAM_WIDTH;
        self.changed();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_and_newline() {
        let mut lcd = MemoryLcd::new();
        lcd.write("MAC ADDRESS\nb8:27").unwrap();
        assert_eq!(lcd.line(0), "MAC ADDRESS");
        assert_eq!(lcd.line(1), "b8:27");
        assert_eq!(lcd.cursor(), (1, 5));
    }

    #[test]
    fn test_visible_window_is_sixteen_columns() {
        let mut lcd = MemoryLcd::new();
        lcd.write("00:11:22:33:44:55").unwrap();
        assert_eq!(lcd.visible_text(0), "00:11:22:33:44:5");
        assert_eq!(lcd.line(0), "00:11:22:33:44:55");
    }

    #[test]
    fn test_move_left_reveals_overflow() {
        let mut lcd = MemoryLcd::new();
        lcd.write("00:11:22:33:44:55").unwrap();
        lcd.move_left().unwrap();
        assert_eq!(lcd.visible_text(0), "0:11:22:33:44:55");

        lcd.move_right().unwrap();
        assert_eq!(lcd.shift(), 0);
    }

    #[test]
    fn test_clear_resets_content_cursor_and_shift() {
        let mut lcd = MemoryLcd::new();
        lcd.write("abc").unwrap();
        lcd.move_left().unwrap();
        lcd.clear().unwrap();

        assert_eq!(lcd.line(0), "");
        assert_eq!(lcd.cursor(), (0, 0));
        assert_eq!(lcd.shift(), 0);
    }

    #[test]
    fn test_custom_bitmaps() {
        let mut lcd = MemoryLcd::new();
        let bitmap = LcdBitmap::new([0x0, 0x1b, 0x1b, 0x1b, 0x1b, 0x1b, 0x0, 0x0]);
        lcd.store_custom_bitmap(1, &bitmap).unwrap();
        lcd.write_custom_bitmap(1).unwrap();

        assert_eq!(lcd.custom_bitmap(1), Some(bitmap));
        assert_eq!(lcd.visible_bytes(0)[0], 1);
        assert_eq!(lcd.render()[0].chars().next(), Some('#'));
        assert!(lcd.store_custom_bitmap(8, &bitmap).is_err());
    }

    #[test]
    fn test_display_flags() {
        let mut lcd = MemoryLcd::new();
        lcd.backlight_on().unwrap();
        lcd.cursor_on().unwrap();
        lcd.blink_on().unwrap();
        assert!(lcd.is_backlight_on() && lcd.is_cursor_visible() && lcd.is_blinking());

        lcd.backlight_off().unwrap();
        lcd.cursor_off().unwrap();
        lcd.blink_off().unwrap();
        assert!(!lcd.is_backlight_on() && !lcd.is_cursor_visible() && !lcd.is_blinking());
    }
}
