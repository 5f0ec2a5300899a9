//! Stations de radio et catalogue.

use serde::{Deserialize, Serialize};

use crate::error::{RadioError, Result};

/// Une station : un nom affiché et une URL transmise telle quelle au lecteur.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

impl Station {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            info: None,
        }
    }
}

/// Liste ordonnée et non vide de stations ; l'index est le seul identifiant.
#[derive(Debug, Clone)]
pub struct StationCatalog {
    stations: Vec<Station>,
}

impl StationCatalog {
    pub fn new(stations: Vec<Station>) -> Result<Self> {
        if stations.is_empty() {
            return Err(RadioError::EmptyCatalog);
        }
        Ok(Self { stations })
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Ramène un index quelconque (négatif compris) dans `0..len()`.
    pub fn wrap(&self, index: i64) -> usize {
        // len() > 0 garanti par le constructeur
        index.rem_euclid(self.stations.len() as i64) as usize
    }

    /// Station à l'index donné, après repliement modulo la taille du catalogue.
    pub fn get(&self, index: i64) -> &Station {
        &self.stations[self.wrap(index)]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Station> {
        self.stations.iter()
    }
}
