//! Session Orchestrator
//!
//! ゲームごとの時間制御つき状態機械。
//!
//! ```text
//! Lobby → Preparing(q) → Active(q) → Revealed(q) → … → Complete → (破棄)
//! ```
//!
//! - ゲームごとに 1 つのタスクがフェーズを順に進める
//! - 各フェーズの待機は `PhaseTimer` で中断できる（明示的な終了、プレイヤー全員の離脱）
//! - セッションの破棄は `sessions` マップからの取り出しに成功した 1 者だけが行う

pub mod game_session;
pub mod orchestrator;
pub mod timer;

pub use game_session::{AnswerOutcome, GameSession, Phase, score_for};
pub use orchestrator::SessionOrchestrator;
pub use timer::{PhaseTimer, PhaseTiming, WaitOutcome};
