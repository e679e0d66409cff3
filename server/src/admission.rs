//! Admission of players into lobbies.
//!
//! The origin limit is checked against a snapshot of the roster and the join
//! happens afterwards under a separate lock. Two concurrent joins from the
//! same origin can therefore both pass the check, so a lobby may briefly hold
//! one player more per origin than its limit allows.

use crate::{error::ApiError, form::LobbyForm};
use scribble_game::{Error as GameError, Lobby, Registry};
use scribble_types::LobbyData;
use std::{fmt::Display, sync::Arc};
use tracing::{error, info, warn};

const NO_LOBBY_ID: &str = "please supply a lobby id via the 'lobby_id' query parameter";
const LOBBY_NOT_FOUND: &str = "the requested lobby doesn't exist";
const LOBBY_FULL: &str = "lobby already full";
const ORIGIN_LIMIT_REACHED: &str = "maximum amount of players per IP reached";

/// Outcome of a successful admission.
#[derive(Debug)]
pub struct Admitted<T> {
    pub lobby_id: String,
    /// Set when a new player was created and the client must store the
    /// credential.
    pub session: Option<String>,
    pub response: T,
}

/// Validates and applies join and create requests against a [Registry].
#[derive(Clone)]
pub struct Admission {
    registry: Arc<Registry>,
}

impl Admission {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    fn resolve(&self, lobby_id: Option<&str>) -> Result<Arc<Lobby>, ApiError> {
        let lobby_id = lobby_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::BadRequest(NO_LOBBY_ID.to_string()))?;
        match self.registry.get_lobby(lobby_id) {
            Ok(Some(lobby)) => Ok(lobby),
            Ok(None) => Err(ApiError::NotFound(LOBBY_NOT_FOUND.to_string())),
            Err(e) => Err(ApiError::Internal(e.to_string())),
        }
    }

    /// Join a lobby, or reconnect when `session` belongs to one of its
    /// players.
    ///
    /// `respond` renders the public view for the caller. If it fails the
    /// join still stands.
    pub fn enter<T, E: Display>(
        &self,
        lobby_id: Option<&str>,
        session: Option<&str>,
        origin: &str,
        name: String,
        respond: impl FnOnce(&LobbyData) -> Result<T, E>,
    ) -> Result<Admitted<T>, ApiError> {
        let lobby = self.resolve(lobby_id)?;

        let reconnected = session.and_then(|session| lobby.player_by_session(session));
        let session = match reconnected {
            Some(player) => {
                lobby.set_last_known_address(&player.session, origin);
                None
            }
            None => {
                if lobby.player_count() >= lobby.max_players() {
                    warn!(lobby = lobby.id(), "Rejected join: lobby full");
                    return Err(ApiError::Unauthorized(LOBBY_FULL.to_string()));
                }

                let same_origin = lobby
                    .players()
                    .iter()
                    .filter(|player| player.last_known_address.as_deref() == Some(origin))
                    .count();
                if same_origin >= lobby.clients_per_ip_limit() {
                    warn!(lobby = lobby.id(), origin, "Rejected join: origin limit reached");
                    return Err(ApiError::Unauthorized(ORIGIN_LIMIT_REACHED.to_string()));
                }

                let player = lobby.join_player(name);
                lobby.set_last_known_address(&player.session, origin);
                info!(lobby = lobby.id(), player = %player.id, "Player joined lobby");
                Some(player.session)
            }
        };

        let data = LobbyData::new(lobby.id());
        let response = respond(&data).map_err(|e| ApiError::Internal(e.to_string()))?;
        Ok(Admitted {
            lobby_id: data.lobby_id,
            session,
            response,
        })
    }

    /// Create a lobby from a submitted form and join its creator.
    ///
    /// If `respond` fails the creator never learns the lobby id, so the
    /// lobby is removed again.
    pub fn create<T, E: Display>(
        &self,
        form: LobbyForm,
        name: String,
        origin: &str,
        respond: impl FnOnce(&LobbyData) -> Result<T, E>,
    ) -> Result<Admitted<T>, ApiError> {
        let request = match form.validate() {
            Ok(request) => request,
            Err(errors) => {
                return Err(ApiError::InvalidSettings {
                    form: Box::new(form),
                    errors,
                })
            }
        };

        let (creator, lobby) = self
            .registry
            .create_lobby(request.lobby_id, name, request.settings)
            .map_err(|e| match e {
                GameError::Poisoned(_) => ApiError::Internal(e.to_string()),
                _ => ApiError::BadRequest(e.to_string()),
            })?;
        lobby.set_last_known_address(&creator.session, origin);

        let data = LobbyData::new(lobby.id());
        match respond(&data) {
            Ok(response) => Ok(Admitted {
                lobby_id: data.lobby_id,
                session: Some(creator.session),
                response,
            }),
            Err(e) => {
                warn!(lobby = lobby.id(), "Removing lobby after failed response: {}", e);
                if let Err(rollback) = self.registry.remove_lobby(lobby.id()) {
                    error!(lobby = lobby.id(), "Failed to remove lobby: {}", rollback);
                }
                Err(ApiError::Internal(e.to_string()))
            }
        }
    }
}
