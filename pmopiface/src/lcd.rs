//! Interface de l'écran caractères.

use crate::error::{CadError, Result};

/// Nombre de colonnes visibles.
pub const LCD_WIDTH: u8 = 16;
/// Nombre de lignes.
pub const LCD_ROWS: u8 = 2;
/// Taille de la mémoire d'affichage (DDRAM) par ligne en mode 2 lignes.
pub const LCD_RAM_WIDTH: u8 = 40;
/// Nombre d'emplacements de caractères personnalisés (CGRAM).
pub const MAX_CUSTOM_BITMAPS: u8 = 8;

/// Caractère personnalisé 5x8 : une ligne de 5 pixels par octet (bits 0..=4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LcdBitmap(pub [u8; 8]);

impl LcdBitmap {
    pub const fn new(rows: [u8; 8]) -> Self {
        Self(rows)
    }

    /// Lignes du caractère, bits hors des 5 colonnes masqués.
    pub fn rows(&self) -> [u8; 8] {
        self.0.map(|row| row & 0x1F)
    }
}

/// Écran caractères piloté ligne/colonne.
///
/// Les implémentations ne fournissent que les primitives ; [`Lcd::write`] et
/// [`Lcd::write_custom_bitmap`] sont construits dessus.
pub trait Lcd {
    /// Efface l'écran, ramène le curseur en (0, 0) et annule tout décalage.
    fn clear(&mut self) -> Result<()>;

    /// Ramène le curseur en (0, 0) et annule tout décalage.
    fn home(&mut self) -> Result<()>;

    /// Place le curseur. `col` est une adresse en mémoire d'affichage (< 40).
    fn set_cursor(&mut self, row: u8, col: u8) -> Result<()>;

    /// Position courante du curseur `(row, col)`.
    fn cursor(&self) -> (u8, u8);

    /// Écrit un octet brut à la position du curseur et avance celui-ci.
    fn write_byte(&mut self, byte: u8) -> Result<()>;

    fn store_custom_bitmap(&mut self, index: u8, bitmap: &LcdBitmap) -> Result<()>;

    fn backlight_on(&mut self) -> Result<()>;
    fn backlight_off(&mut self) -> Result<()>;
    fn cursor_on(&mut self) -> Result<()>;
    fn cursor_off(&mut self) -> Result<()>;
    fn blink_on(&mut self) -> Result<()>;
    fn blink_off(&mut self) -> Result<()>;

    /// Décale tout l'affichage d'une colonne vers la gauche.
    fn move_left(&mut self) -> Result<()>;
    /// Décale tout l'affichage d'une colonne vers la droite.
    fn move_right(&mut self) -> Result<()>;

    /// Écrit du texte. `'\n'` passe au début de la ligne suivante ;
    /// les caractères non ASCII sont remplacés par `'?'`.
    fn write(&mut self, text: &str) -> Result<()> {
        for ch in text.chars() {
            if ch == '\n' {
                let (row, _) = self.cursor();
                self.set_cursor((row + 1) % LCD_ROWS, 0)?;
            } else {
                self.write_byte(lcd_byte(ch))?;
            }
        }
        Ok(())
    }

    /// Affiche le caractère personnalisé `index` à la position du curseur.
    fn write_custom_bitmap(&mut self, index: u8) -> Result<()> {
        check_bitmap_index(index)?;
        self.write_byte(index)
    }
}

pub(crate) fn check_bitmap_index(index: u8) -> Result<()> {
    if index < MAX_CUSTOM_BITMAPS {
        Ok(())
    } else {
        Err(CadError::InvalidBitmapIndex(index))
    }
}

pub(crate) fn check_cursor(row: u8, col: u8) -> Result<()> {
    if row < LCD_ROWS && col < LCD_RAM_WIDTH {
        Ok(())
    } else {
        Err(CadError::InvalidCursor { row, col })
    }
}

/// Position qui suit `(row, col)` après l'écriture d'un octet.
///
/// En mode 2 lignes l'adresse DDRAM passe de la fin d'une ligne au début de l'autre.
pub(crate) fn advance(row: u8, col: u8) -> (u8, u8) {
    if col + 1 >= LCD_RAM_WIDTH {
        ((row + 1) % LCD_ROWS, 0)
    } else {
        (row, col + 1)
    }
}

pub(crate) fn lcd_byte(ch: char) -> u8 {
    match ch {
        ' '..='~' => ch as u8,
        _ => b'?',
    }
}
