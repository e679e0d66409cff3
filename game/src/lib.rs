//! Lobby state shared by every request of a running server.
//!
//! Gameplay (rounds, turns, drawing) happens elsewhere; this crate only tracks
//! which lobbies exist, how they were configured and who is in them.

mod lobby;
mod names;
mod registry;

pub use lobby::{Lobby, LobbySettings, Player};
pub use names::{generate_player_name, MAX_PLAYER_NAME_LENGTH};
pub use registry::Registry;

use thiserror::Error;

/// Error type for lobby operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("lobby '{0}' already exists")]
    DuplicateLobby(String),
    #[error("custom word chance is set but no custom words were given")]
    MissingCustomWords,
    #[error("lobby registry unavailable: {0}")]
    Poisoned(String),
}
