//! Repository 実装
//!
//! ## 実装
//!
//! - `inmemory`: プロセス内メモリに保持する QuizRepository（JSON シード読み込み付き）

pub mod inmemory;

pub use inmemory::{InMemoryQuizRepository, SeedError, demo_games, load_seed, parse_seed};
