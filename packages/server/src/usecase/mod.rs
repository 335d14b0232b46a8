//! UseCase 層
//!
//! 受信イベントごとに 1 つのユースケース。
//! ドメイン層の trait（QuizRepository, MessagePusher）に依存し、具体的な実装には依存しない。

pub mod admin_gate;
pub mod connect_client;
pub mod disconnect_client;
pub mod elect_admin;
pub mod end_game;
pub mod enter_lobby;
pub mod error;
pub mod get_games;
pub mod join_game;
pub mod notify;
pub mod session;
pub mod start_game;
pub mod submit_answer;

pub use admin_gate::AdminGate;
pub use connect_client::{ConnectClientUseCase, ConnectedClient};
pub use disconnect_client::{DisconnectClientUseCase, DisconnectOutcome};
pub use elect_admin::ElectAdminUseCase;
pub use end_game::EndGameUseCase;
pub use enter_lobby::EnterLobbyUseCase;
pub use error::SessionError;
pub use get_games::GetGamesUseCase;
pub use join_game::JoinGameUseCase;
pub use session::{PhaseTiming, SessionOrchestrator};
pub use start_game::StartGameUseCase;
pub use submit_answer::{AnswerVerdict, SubmitAnswerUseCase};
