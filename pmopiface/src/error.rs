//! Types d'erreurs pour pmopiface

/// Erreurs d'accès à la carte PiFace CAD
#[derive(Debug, thiserror::Error)]
pub enum CadError {
    #[error("SPI error: {0}")]
    Spi(#[from] rppal::spi::Error),

    #[error("GPIO error: {0}")]
    Gpio(#[from] rppal::gpio::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Custom bitmap index {0} out of range (0..=7)")]
    InvalidBitmapIndex(u8),

    #[error("Cursor position ({row}, {col}) is outside the display")]
    InvalidCursor { row: u8, col: u8 },

    #[error("Input source {name} failed: {reason}")]
    SourceFailed { name: String, reason: String },

    #[error("{0}")]
    Other(String),
}

/// Type Result spécialisé pour pmopiface
pub type Result<T> = std::result::Result<T, CadError>;
