//! Types d'erreurs pour pmoradio

use std::io;

/// Erreurs du contrôleur de radio
#[derive(Debug, thiserror::Error)]
pub enum RadioError {
    /// Le lecteur externe n'est pas installé
    #[error("{program} was not found, {hint}")]
    PlayerNotFound { program: String, hint: String },

    /// Le lecteur n'a pas pu être lancé
    #[error("Cannot start {program}: {source}")]
    PlayerSpawn { program: String, source: io::Error },

    /// Le signal d'arrêt n'a pas pu être envoyé au groupe du lecteur
    #[error("Cannot stop player process group {pgid}: {source}")]
    PlayerSignal { pgid: u32, source: io::Error },

    #[error("Radio is already playing")]
    AlreadyPlaying,

    #[error("Radio is not playing")]
    NotPlaying,

    #[error("Station catalog is empty")]
    EmptyCatalog,

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Invalid action '{0}'")]
    InvalidAction(String),

    /// Erreur de l'écran (SPI, paramètres hors limites)
    #[error("Display error: {0}")]
    Display(#[from] pmopiface::CadError),

    /// Configuration error (from pmoconfig/anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Type Result spécialisé pour pmoradio
pub type Result<T> = std::result::Result<T, RadioError>;
