//! Parsing of the lobby creation form.
//!
//! Every field is checked on its own so a single submission reports all of
//! its problems at once.

use scribble_game::LobbySettings;
use scribble_types::{Language, SETTING_BOUNDS};
use serde::{Deserialize, Serialize};

const MIN_LOBBY_ID_LENGTH: usize = 3;
const MAX_LOBBY_ID_LENGTH: usize = 32;

/// Raw values of the lobby creation form, exactly as submitted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LobbyForm {
    pub lobby_id: String,
    pub language: String,
    pub drawing_time: String,
    pub rounds: String,
    pub max_players: String,
    pub custom_words: String,
    pub custom_words_chance: String,
    pub clients_per_ip_limit: String,
    pub enable_votekick: String,
    pub username: String,
}

/// A lobby request that passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LobbyRequest {
    /// `None` lets the registry pick an identifier.
    pub lobby_id: Option<String>,
    pub settings: LobbySettings,
}

impl LobbyForm {
    /// Validate every field, returning all error messages on failure.
    pub fn validate(&self) -> Result<LobbyRequest, Vec<String>> {
        let mut errors = Vec::new();
        let lobby_id = collect(parse_lobby_id(&self.lobby_id), &mut errors);
        let language = collect(parse_language(&self.language), &mut errors);
        let drawing_time = collect(parse_drawing_time(&self.drawing_time), &mut errors);
        let rounds = collect(parse_rounds(&self.rounds), &mut errors);
        let max_players = collect(parse_max_players(&self.max_players), &mut errors);
        let custom_words = collect(parse_custom_words(&self.custom_words), &mut errors);
        let custom_words_chance = collect(
            parse_custom_words_chance(&self.custom_words_chance),
            &mut errors,
        );
        let clients_per_ip_limit = collect(
            parse_clients_per_ip_limit(&self.clients_per_ip_limit),
            &mut errors,
        );
        let enable_votekick = self.enable_votekick == "true";

        match (
            lobby_id,
            language,
            drawing_time,
            rounds,
            max_players,
            custom_words,
            custom_words_chance,
            clients_per_ip_limit,
        ) {
            (
                Some(lobby_id),
                Some(language),
                Some(drawing_time),
                Some(rounds),
                Some(max_players),
                Some(custom_words),
                Some(custom_words_chance),
                Some(clients_per_ip_limit),
            ) if errors.is_empty() => Ok(LobbyRequest {
                lobby_id,
                settings: LobbySettings {
                    language,
                    drawing_time,
                    rounds,
                    max_players,
                    custom_words,
                    custom_words_chance,
                    clients_per_ip_limit,
                    enable_votekick,
                },
            }),
            _ => Err(errors),
        }
    }
}

fn collect<T>(result: Result<T, String>, errors: &mut Vec<String>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            errors.push(e);
            None
        }
    }
}

/// Messages reported for a bounded integer field.
struct Numeric {
    not_numeric: &'static str,
    too_small: &'static str,
    too_large: &'static str,
}

fn parse_bounded(value: &str, min: i64, max: i64, messages: Numeric) -> Result<i64, String> {
    let value: i64 = value
        .trim()
        .parse()
        .map_err(|_| messages.not_numeric.to_string())?;
    if value < min {
        return Err(format!("{} {min}", messages.too_small));
    }
    if value > max {
        return Err(format!("{} {max}", messages.too_large));
    }
    Ok(value)
}

fn parse_lobby_id(value: &str) -> Result<Option<String>, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    let length = value.chars().count();
    if !(MIN_LOBBY_ID_LENGTH..=MAX_LOBBY_ID_LENGTH).contains(&length) {
        return Err(format!(
            "the lobby id must be between {MIN_LOBBY_ID_LENGTH} and {MAX_LOBBY_ID_LENGTH} characters long"
        ));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err("the lobby id may only contain letters, digits, '-' and '_'".to_string());
    }
    Ok(Some(value.to_string()))
}

fn parse_language(value: &str) -> Result<Language, String> {
    Language::from_key(value)
        .ok_or_else(|| "the given language doesn't match any supported language".to_string())
}

fn parse_drawing_time(value: &str) -> Result<u32, String> {
    let value = parse_bounded(
        value,
        SETTING_BOUNDS.min_drawing_time,
        SETTING_BOUNDS.max_drawing_time,
        Numeric {
            not_numeric: "the drawing time must be numeric",
            too_small: "drawing time must not be smaller than",
            too_large: "drawing time must not be greater than",
        },
    )?;
    u32::try_from(value).map_err(|e| e.to_string())
}

fn parse_rounds(value: &str) -> Result<u32, String> {
    let value = parse_bounded(
        value,
        SETTING_BOUNDS.min_rounds,
        SETTING_BOUNDS.max_rounds,
        Numeric {
            not_numeric: "the rounds amount must be numeric",
            too_small: "rounds must not be smaller than",
            too_large: "rounds must not be greater than",
        },
    )?;
    u32::try_from(value).map_err(|e| e.to_string())
}

fn parse_max_players(value: &str) -> Result<usize, String> {
    let value = parse_bounded(
        value,
        SETTING_BOUNDS.min_max_players,
        SETTING_BOUNDS.max_max_players,
        Numeric {
            not_numeric: "the max players amount must be numeric",
            too_small: "maximum players must not be smaller than",
            too_large: "maximum players must not be greater than",
        },
    )?;
    usize::try_from(value).map_err(|e| e.to_string())
}

fn parse_custom_words(value: &str) -> Result<Vec<String>, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(Vec::new());
    }
    value
        .split(',')
        .map(|word| {
            let word = word.trim().to_lowercase();
            if word.is_empty() {
                Err("custom words must not be empty".to_string())
            } else {
                Ok(word)
            }
        })
        .collect()
}

fn parse_custom_words_chance(value: &str) -> Result<u8, String> {
    let value = parse_bounded(
        value,
        SETTING_BOUNDS.min_custom_words_chance,
        SETTING_BOUNDS.max_custom_words_chance,
        Numeric {
            not_numeric: "the custom word chance must be numeric",
            too_small: "custom word chance must not be lower than",
            too_large: "custom word chance must not be higher than",
        },
    )?;
    u8::try_from(value).map_err(|e| e.to_string())
}

fn parse_clients_per_ip_limit(value: &str) -> Result<usize, String> {
    let value = parse_bounded(
        value,
        SETTING_BOUNDS.min_clients_per_ip_limit,
        SETTING_BOUNDS.max_clients_per_ip_limit,
        Numeric {
            not_numeric: "the clients per IP limit must be numeric",
            too_small: "the clients per IP limit must not be lower than",
            too_large: "the clients per IP limit must not be higher than",
        },
    )?;
    usize::try_from(value).map_err(|e| e.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn valid_form() -> LobbyForm {
        LobbyForm {
            lobby_id: String::new(),
            language: "english".to_string(),
            drawing_time: "120".to_string(),
            rounds: "4".to_string(),
            max_players: "12".to_string(),
            custom_words: String::new(),
            custom_words_chance: "0".to_string(),
            clients_per_ip_limit: "2".to_string(),
            enable_votekick: "true".to_string(),
            username: String::new(),
        }
    }

    #[test]
    fn test_valid_form() {
        let request = valid_form().validate().unwrap();
        assert_eq!(request.lobby_id, None);
        assert_eq!(
            request.settings,
            LobbySettings {
                language: Language::English,
                drawing_time: 120,
                rounds: 4,
                max_players: 12,
                custom_words: Vec::new(),
                custom_words_chance: 0,
                clients_per_ip_limit: 2,
                enable_votekick: true,
            }
        );
    }

    #[test]
    fn test_all_errors_reported() {
        let form = LobbyForm {
            drawing_time: "soon".to_string(),
            max_players: "1".to_string(),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors,
            vec![
                "the drawing time must be numeric".to_string(),
                "maximum players must not be smaller than 2".to_string(),
            ]
        );
    }

    #[test]
    fn test_every_field_invalid() {
        let form = LobbyForm {
            lobby_id: "x".to_string(),
            language: "klingon".to_string(),
            drawing_time: "1000".to_string(),
            rounds: "0".to_string(),
            max_players: "many".to_string(),
            custom_words: "a,,b".to_string(),
            custom_words_chance: "101".to_string(),
            clients_per_ip_limit: "25".to_string(),
            enable_votekick: "yes".to_string(),
            username: String::new(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 8);
        assert!(errors.contains(&"drawing time must not be greater than 300".to_string()));
        assert!(errors.contains(&"rounds must not be smaller than 1".to_string()));
        assert!(errors.contains(&"custom words must not be empty".to_string()));
        assert!(errors.contains(&"custom word chance must not be higher than 100".to_string()));
    }

    #[test]
    fn test_votekick_only_on_true() {
        let mut form = valid_form();
        form.enable_votekick = "on".to_string();
        assert!(!form.validate().unwrap().settings.enable_votekick);
        form.enable_votekick = String::new();
        assert!(!form.validate().unwrap().settings.enable_votekick);
    }

    #[test]
    fn test_custom_words_normalized() {
        assert_eq!(
            parse_custom_words(" Apple, BANANA ,cherry ").unwrap(),
            vec!["apple", "banana", "cherry"]
        );
        assert_eq!(parse_custom_words("   ").unwrap(), Vec::<String>::new());
        assert!(parse_custom_words("apple, ,cherry").is_err());
    }

    #[test]
    fn test_lobby_id_rules() {
        assert_eq!(parse_lobby_id("").unwrap(), None);
        assert_eq!(
            parse_lobby_id("my-room_1").unwrap(),
            Some("my-room_1".to_string())
        );
        assert!(parse_lobby_id("ab").is_err());
        assert!(parse_lobby_id(&"a".repeat(33)).is_err());
        assert!(parse_lobby_id("no spaces").is_err());
    }

    #[test]
    fn test_bounds_are_inclusive() {
        assert_eq!(parse_drawing_time("60").unwrap(), 60);
        assert_eq!(parse_drawing_time("300").unwrap(), 300);
        assert_eq!(parse_custom_words_chance("0").unwrap(), 0);
        assert_eq!(parse_custom_words_chance("100").unwrap(), 100);
        assert!(parse_custom_words_chance("-1").is_err());
    }
}
