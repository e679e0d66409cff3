use rand::seq::SliceRandom;

/// Longest display name a player may carry.
pub const MAX_PLAYER_NAME_LENGTH: usize = 30;

const ADJECTIVES: &[&str] = &[
    "Brave", "Calm", "Clever", "Curious", "Eager", "Fancy", "Gentle", "Happy", "Jolly", "Lucky",
    "Mighty", "Nimble", "Proud", "Quick", "Quiet", "Sleepy", "Sneaky", "Swift", "Witty", "Zany",
];

const ANIMALS: &[&str] = &[
    "Badger", "Beaver", "Crane", "Falcon", "Ferret", "Gecko", "Heron", "Koala", "Lemur", "Lynx",
    "Marmot", "Moose", "Otter", "Panda", "Puffin", "Raven", "Seal", "Tapir", "Walrus", "Yak",
];

/// Name handed to players that did not pick one themselves.
pub fn generate_player_name() -> String {
    let mut rng = rand::thread_rng();
    let adjective = ADJECTIVES.choose(&mut rng).copied().unwrap_or("Anonymous");
    let animal = ANIMALS.choose(&mut rng).copied().unwrap_or("Player");
    format!("{adjective} {animal}")
}
