use serde::{Deserialize, Serialize};

/// Base width of the drawing board clients render at.
pub const DRAWING_BOARD_BASE_WIDTH: u32 = 1600;

/// Base height of the drawing board clients render at.
pub const DRAWING_BOARD_BASE_HEIGHT: u32 = 900;

/// Inclusive bounds for the numeric lobby settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettingBounds {
    pub min_drawing_time: i64,
    pub max_drawing_time: i64,
    pub min_rounds: i64,
    pub max_rounds: i64,
    pub min_max_players: i64,
    pub max_max_players: i64,
    pub min_clients_per_ip_limit: i64,
    pub max_clients_per_ip_limit: i64,
    pub min_custom_words_chance: i64,
    pub max_custom_words_chance: i64,
}

pub const SETTING_BOUNDS: SettingBounds = SettingBounds {
    min_drawing_time: 60,
    max_drawing_time: 300,
    min_rounds: 1,
    max_rounds: 20,
    min_max_players: 2,
    max_max_players: 24,
    min_clients_per_ip_limit: 1,
    max_clients_per_ip_limit: 24,
    min_custom_words_chance: 0,
    max_custom_words_chance: 100,
};

/// Word list languages a lobby can be created with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Italian,
    German,
    French,
    Dutch,
}

pub const SUPPORTED_LANGUAGES: [Language; 5] = [
    Language::English,
    Language::Italian,
    Language::German,
    Language::French,
    Language::Dutch,
];

impl Language {
    /// Key used in forms and configuration.
    pub fn key(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Italian => "italian",
            Language::German => "german",
            Language::French => "french",
            Language::Dutch => "dutch",
        }
    }

    /// Case-insensitive lookup by key.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        SUPPORTED_LANGUAGES
            .into_iter()
            .find(|language| language.key().eq_ignore_ascii_case(key))
    }
}

/// The public view of a lobby handed to a client after it joined or created it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyData {
    pub lobby_id: String,
    pub board_width: u32,
    pub board_height: u32,
}

impl LobbyData {
    pub fn new(lobby_id: impl Into<String>) -> Self {
        Self {
            lobby_id: lobby_id.into(),
            board_width: DRAWING_BOARD_BASE_WIDTH,
            board_height: DRAWING_BOARD_BASE_HEIGHT,
        }
    }
}
