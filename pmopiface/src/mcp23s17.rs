//! Expandeur de ports MCP23S17 sur bus SPI.
//!
//! Registres adressés avec `IOCON.BANK = 0` (registres A et B entrelacés).

use rppal::spi::{Bus, Mode, SlaveSelect, Spi};

use crate::error::Result;

pub const IODIRA: u8 = 0x00;
pub const IODIRB: u8 = 0x01;
pub const IPOLA: u8 = 0x02;
pub const GPINTENA: u8 = 0x04;
pub const INTCONA: u8 = 0x08;
pub const IOCON: u8 = 0x0A;
pub const GPPUA: u8 = 0x0C;
pub const INTFA: u8 = 0x0E;
pub const INTCAPA: u8 = 0x10;
pub const GPIOA: u8 = 0x12;
pub const GPIOB: u8 = 0x13;

// IOCON
pub const IOCON_HAEN: u8 = 0x08;

const WRITE_OPCODE: u8 = 0x40;
const READ_OPCODE: u8 = 0x41;

/// Fréquence SPI utilisée par la PiFace CAD.
pub const SPI_CLOCK_HZ: u32 = 10_000_000;

/// Un MCP23S17 identifié par son adresse matérielle (A0-A2).
pub struct Mcp23s17 {
    spi: Spi,
    hardware_address: u8,
}

impl Mcp23s17 {
    /// Ouvre le composant sur `/dev/spidev<bus>.<slave>`.
    pub fn open(bus: Bus, slave: SlaveSelect, hardware_address: u8) -> Result<Self> {
        let spi = Spi::new(bus, slave, SPI_CLOCK_HZ, Mode::Mode0)?;
        let chip = Self {
            spi,
            hardware_address: hardware_address & 0x07,
        };
        tracing::debug!(
            bus = ?bus,
            slave = ?slave,
            hardware_address = chip.hardware_address,
            "MCP23S17 opened"
        );
        Ok(chip)
    }

    fn opcode(&self, base: u8) -> u8 {
        base | (self.hardware_address << 1)
    }

    pub fn write_register(&mut self, register: u8, value: u8) -> Result<()> {
        let frame = [self.opcode(WRITE_OPCODE), register, value];
        self.spi.write(&frame)?;
        Ok(())
    }

    pub fn read_register(&mut self, register: u8) -> Result<u8> {
        let frame = [self.opcode(READ_OPCODE), register, 0];
        let mut reply = [0u8; 3];
        self.spi.transfer(&mut reply, &frame)?;
        Ok(reply[2])
    }
}
