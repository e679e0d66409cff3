use scribble_types::Language;
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

/// Settings a lobby is created with. Values are expected to be validated
/// against [scribble_types::SETTING_BOUNDS] by the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LobbySettings {
    pub language: Language,
    pub drawing_time: u32,
    pub rounds: u32,
    pub max_players: usize,
    pub custom_words: Vec<String>,
    pub custom_words_chance: u8,
    pub clients_per_ip_limit: usize,
    pub enable_votekick: bool,
}

impl Default for LobbySettings {
    fn default() -> Self {
        Self {
            language: Language::English,
            drawing_time: 120,
            rounds: 4,
            max_players: 12,
            custom_words: Vec::new(),
            custom_words_chance: 0,
            clients_per_ip_limit: 1,
            enable_votekick: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    /// Opaque credential the client presents to be recognized again.
    pub session: String,
    pub last_known_address: Option<String>,
}

impl Player {
    fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            session: Uuid::new_v4().simple().to_string(),
            last_known_address: None,
        }
    }
}

/// A lobby and its roster.
///
/// Every method takes the roster lock for its own duration only. Sequences
/// such as "count players, then join" are therefore not atomic.
#[derive(Debug)]
pub struct Lobby {
    id: String,
    settings: LobbySettings,
    players: RwLock<Vec<Player>>,
}

impl Lobby {
    pub(crate) fn new(id: String, settings: LobbySettings) -> Self {
        Self {
            id,
            settings,
            players: RwLock::new(Vec::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn max_players(&self) -> usize {
        self.settings.max_players
    }

    pub fn clients_per_ip_limit(&self) -> usize {
        self.settings.clients_per_ip_limit
    }

    /// Snapshot of the roster in join order.
    pub fn players(&self) -> Vec<Player> {
        self.players
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn player_count(&self) -> usize {
        self.players
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn player_by_session(&self, session: &str) -> Option<Player> {
        self.players
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|player| player.session == session)
            .cloned()
    }

    /// Append a new player with a freshly issued session.
    pub fn join_player(&self, name: impl Into<String>) -> Player {
        let player = Player::new(name.into());
        self.players
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(player.clone());
        player
    }

    /// Returns false if no player holds `session`.
    pub fn set_last_known_address(&self, session: &str, address: impl Into<String>) -> bool {
        let mut players = self.players.write().unwrap_or_else(PoisonError::into_inner);
        match players.iter_mut().find(|player| player.session == session) {
            Some(player) => {
                player.last_known_address = Some(address.into());
                true
            }
            None => false,
        }
    }
}
