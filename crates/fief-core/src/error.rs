//! Error type for the engine facade.

use fief_diplomacy::DiplomacyError;
use fief_gameplay::GameplayError;
use fief_store::StoreError;

use crate::config::ConfigError;

/// Errors that can surface from the engine facade.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration could not be loaded.
    #[error("config error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// A store operation failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },

    /// The gameplay engine failed.
    #[error("gameplay error: {source}")]
    Gameplay {
        /// The underlying gameplay error.
        #[from]
        source: GameplayError,
    },

    /// The diplomacy engine failed.
    #[error("diplomacy error: {source}")]
    Diplomacy {
        /// The underlying diplomacy error.
        #[from]
        source: DiplomacyError,
    },
}
