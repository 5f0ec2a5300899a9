//! La carte PiFace Control & Display.
//!
//! Un MCP23S17 sur SPI0/CE1 : port A relié aux 8 boutons, port B à l'écran.
//! La sortie d'interruption INTA du MCP23S17 est reliée à la GPIO 25.

use std::sync::{Arc, Mutex, MutexGuard};

use rppal::spi::{Bus, SlaveSelect};

use crate::error::{CadError, Result};
use crate::event::Direction;
use crate::hd44780::{Hd44780, LcdBus};
use crate::mcp23s17::{
    GPINTENA, GPIOA, GPIOB, GPPUA, INTCAPA, INTCONA, INTFA, IOCON, IOCON_HAEN, IODIRA,
    IODIRB, IPOLA, Mcp23s17,
};

/// GPIO du Raspberry Pi reliée à INTA.
pub const INTERRUPT_GPIO: u8 = 25;
/// Nombre de boutons sur le port A (5 boutons + 3 positions du navigateur).
pub const SWITCH_COUNT: u8 = 8;

type SharedChip = Arc<Mutex<Mcp23s17>>;

fn lock(chip: &SharedChip) -> Result<MutexGuard<'_, Mcp23s17>> {
    chip.lock()
        .map_err(|_| CadError::Other("MCP23S17 lock poisoned".to_string()))
}

/// Écran de la PiFace CAD.
pub type PiFaceLcd = Hd44780<LcdPort>;

/// Point d'entrée : configure le MCP23S17 et sépare l'écran et les boutons.
pub struct PiFaceCad;

impl PiFaceCad {
    /// Ouvre la carte à l'adresse matérielle 0 sur `/dev/spidev0.1`.
    pub fn open() -> Result<(PiFaceLcd, SwitchPort)> {
        Self::open_at(Bus::Spi0, SlaveSelect::Ss1, 0)
    }

    pub fn open_at(
        bus: Bus,
        slave: SlaveSelect,
        hardware_address: u8,
    ) -> Result<(PiFaceLcd, SwitchPort)> {
        let mut chip = Mcp23s17::open(bus, slave, hardware_address)?;

        chip.write_register(IOCON, IOCON_HAEN)?;
        // Port A : boutons en entrée, pull-up, polarité inversée (1 = appuyé)
        chip.write_register(IODIRA, 0xFF)?;
        chip.write_register(GPPUA, 0xFF)?;
        chip.write_register(IPOLA, 0xFF)?;
        // Interruption sur tout changement par rapport à l'état précédent
        chip.write_register(INTCONA, 0x00)?;
        chip.write_register(GPINTENA, 0xFF)?;
        // Port B : écran en sortie
        chip.write_register(IODIRB, 0x00)?;
        chip.write_register(GPIOB, 0x00)?;

        let chip: SharedChip = Arc::new(Mutex::new(chip));
        let lcd = Hd44780::new(LcdPort { chip: chip.clone() })?;
        tracing::info!("PiFace Control & Display ready");
        Ok((lcd, SwitchPort { chip }))
    }
}

/// Port B du MCP23S17, vu comme bus du HD44780.
pub struct LcdPort {
    chip: SharedChip,
}

impl LcdBus for LcdPort {
    fn write_port(&mut self, value: u8) -> Result<()> {
        lock(&self.chip)?.write_register(GPIOB, value)
    }
}

/// Changement d'état d'un bouton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchChange {
    pub pin: u8,
    pub direction: Direction,
}

/// Port A du MCP23S17 : lecture des boutons.
#[derive(Clone)]
pub struct SwitchPort {
    chip: SharedChip,
}

impl SwitchPort {
    /// État courant des 8 boutons (bit à 1 = appuyé).
    pub fn read_state(&self) -> Result<u8> {
        lock(&self.chip)?.read_register(GPIOA)
    }

    /// Lit et acquitte l'interruption en attente.
    pub fn take_changes(&self) -> Result<Vec<SwitchChange>> {
        let (flags, captured) = {
            let mut chip = lock(&self.chip)?;
            let flags = chip.read_register(INTFA)?;
            // La lecture d'INTCAP libère la ligne d'interruption
            let captured = chip.read_register(INTCAPA)?;
            (flags, captured)
        };
        Ok(decode_changes(flags, captured))
    }
}

/// Convertit les registres INTF/INTCAP en changements de boutons.
pub fn decode_changes(flags: u8, captured: u8) -> Vec<SwitchChange> {
    (0..SWITCH_COUNT)
        .filter(|pin| flags & (1 << pin) != 0)
        .map(|pin| SwitchChange {
            pin,
            direction: if captured & (1 << pin) != 0 {
                Direction::On
            } else {
                Direction::Off
            },
        })
        .collect()
}
