pub mod lobby;
pub mod record;

pub use lobby::{
    Language, LobbyData, SettingBounds, DRAWING_BOARD_BASE_HEIGHT, DRAWING_BOARD_BASE_WIDTH,
    SETTING_BOUNDS, SUPPORTED_LANGUAGES,
};
pub use record::PlayerRecord;
