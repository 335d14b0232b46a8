//! UseCase: ゲームの強制終了

use std::sync::Arc;

use crate::{
    domain::{ClientId, GameId},
    usecase::{admin_gate::AdminGate, error::SessionError, session::SessionOrchestrator},
};

/// ゲーム強制終了のユースケース（管理者のみ）
pub struct EndGameUseCase {
    admin_gate: Arc<AdminGate>,
    orchestrator: Arc<SessionOrchestrator>,
}

impl EndGameUseCase {
    pub fn new(admin_gate: Arc<AdminGate>, orchestrator: Arc<SessionOrchestrator>) -> Self {
        Self {
            admin_gate,
            orchestrator,
        }
    }

    pub async fn execute(&self, requester: &ClientId, game_id: String) -> Result<(), SessionError> {
        if !self.admin_gate.is_admin(requester).await {
            tracing::warn!("Non-admin '{}' tried to end a game", requester);
            return Err(SessionError::unauthorized("Only the admin can end the game."));
        }
        let game_id =
            GameId::new(game_id).map_err(|_| SessionError::not_found("Game not found."))?;
        self.orchestrator.end_game(&game_id).await
    }
}
