pub mod quiz;
pub mod seed;

pub use quiz::InMemoryQuizRepository;
pub use seed::{SeedError, demo_games, load_seed, parse_seed};
