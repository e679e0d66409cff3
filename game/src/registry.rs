use crate::{Error, Lobby, LobbySettings, Player};
use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};
use tracing::{debug, error, info};
use uuid::Uuid;

/// All lobbies currently known to the process.
#[derive(Default)]
pub struct Registry {
    lobbies: RwLock<HashMap<String, Arc<Lobby>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a lobby and join its creator as the first player.
    ///
    /// A missing `id` is replaced by a generated one.
    pub fn create_lobby(
        &self,
        id: Option<String>,
        creator: impl Into<String>,
        settings: LobbySettings,
    ) -> Result<(Player, Arc<Lobby>), Error> {
        if settings.custom_words_chance > 0 && settings.custom_words.is_empty() {
            return Err(Error::MissingCustomWords);
        }
        let id = id.unwrap_or_else(|| Uuid::new_v4().simple().to_string());

        let lobby = {
            let mut lobbies = match self.lobbies.write() {
                Ok(lobbies) => lobbies,
                Err(e) => {
                    error!("Failed to acquire write lock in create_lobby: {}", e);
                    return Err(Error::Poisoned(e.to_string()));
                }
            };
            if lobbies.contains_key(&id) {
                return Err(Error::DuplicateLobby(id));
            }
            let lobby = Arc::new(Lobby::new(id.clone(), settings));
            lobbies.insert(id, lobby.clone());
            lobby
        };

        let creator = lobby.join_player(creator);
        info!(lobby = lobby.id(), "Created lobby");
        Ok((creator, lobby))
    }

    pub fn get_lobby(&self, id: &str) -> Result<Option<Arc<Lobby>>, Error> {
        let lobbies = match self.lobbies.read() {
            Ok(lobbies) => lobbies,
            Err(e) => {
                error!("Failed to acquire read lock in get_lobby: {}", e);
                return Err(Error::Poisoned(e.to_string()));
            }
        };
        Ok(lobbies.get(id).cloned())
    }

    /// Drop a lobby. Sessions of its players stop resolving.
    pub fn remove_lobby(&self, id: &str) -> Result<Option<Arc<Lobby>>, Error> {
        let mut lobbies = match self.lobbies.write() {
            Ok(lobbies) => lobbies,
            Err(e) => {
                error!("Failed to acquire write lock in remove_lobby: {}", e);
                return Err(Error::Poisoned(e.to_string()));
            }
        };
        let removed = lobbies.remove(id);
        if removed.is_some() {
            debug!(lobby = id, "Removed lobby");
        }
        Ok(removed)
    }

    pub fn len(&self) -> usize {
        match self.lobbies.read() {
            Ok(lobbies) => lobbies.len(),
            Err(e) => {
                error!("Failed to acquire read lock in len: {}", e);
                0
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Poison the registry lock so lookups fail.
    #[cfg(any(test, feature = "mocks"))]
    pub fn poison(&self) {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = self.lobbies.write().unwrap();
            panic!("poisoning registry");
        }));
        assert!(result.is_err());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_lobby_joins_creator() {
        let registry = Registry::new();
        let (creator, lobby) = registry
            .create_lobby(Some("room".to_string()), "Creator", LobbySettings::default())
            .unwrap();
        assert_eq!(lobby.id(), "room");
        assert_eq!(lobby.players(), vec![creator.clone()]);
        assert_eq!(
            lobby.player_by_session(&creator.session).map(|p| p.name),
            Some("Creator".to_string())
        );

        let found = registry.get_lobby("room").unwrap().unwrap();
        assert!(Arc::ptr_eq(&found, &lobby));
    }

    #[test]
    fn test_create_lobby_generates_id() {
        let registry = Registry::new();
        let (_, first) = registry
            .create_lobby(None, "a", LobbySettings::default())
            .unwrap();
        let (_, second) = registry
            .create_lobby(None, "b", LobbySettings::default())
            .unwrap();
        assert_ne!(first.id(), second.id());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_duplicate_lobby_rejected() {
        let registry = Registry::new();
        registry
            .create_lobby(Some("room".to_string()), "a", LobbySettings::default())
            .unwrap();
        let err = registry
            .create_lobby(Some("room".to_string()), "b", LobbySettings::default())
            .unwrap_err();
        assert_eq!(err, Error::DuplicateLobby("room".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_custom_word_chance_requires_words() {
        let registry = Registry::new();
        let settings = LobbySettings {
            custom_words_chance: 50,
            ..Default::default()
        };
        let err = registry.create_lobby(None, "a", settings).unwrap_err();
        assert_eq!(err, Error::MissingCustomWords);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_lobby() {
        let registry = Registry::new();
        registry
            .create_lobby(Some("room".to_string()), "a", LobbySettings::default())
            .unwrap();
        assert!(registry.remove_lobby("room").unwrap().is_some());
        assert!(registry.get_lobby("room").unwrap().is_none());
        assert!(registry.remove_lobby("room").unwrap().is_none());
    }

    #[test]
    fn test_poisoned_registry() {
        let registry = Registry::new();
        registry.poison();
        assert!(matches!(
            registry.get_lobby("room"),
            Err(Error::Poisoned(_))
        ));
        assert!(matches!(
            registry.remove_lobby("room"),
            Err(Error::Poisoned(_))
        ));
    }
}
