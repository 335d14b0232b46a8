//! UseCase: ゲーム開始
//!
//! 開始の可否はリクエスト元にだけ返す。失敗時はどのトピックにも配信しない。
//! 成功時は応答を返してから `launch` でフェーズの進行を始める。

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::{
    domain::{ClientId, GameId},
    usecase::{
        admin_gate::AdminGate,
        error::SessionError,
        session::{GameSession, SessionOrchestrator},
    },
};

/// ゲーム開始のユースケース
pub struct StartGameUseCase {
    admin_gate: Arc<AdminGate>,
    orchestrator: Arc<SessionOrchestrator>,
}

impl StartGameUseCase {
    pub fn new(admin_gate: Arc<AdminGate>, orchestrator: Arc<SessionOrchestrator>) -> Self {
        Self {
            admin_gate,
            orchestrator,
        }
    }

    /// セッションを用意する
    ///
    /// # Returns
    ///
    /// * `Ok(Arc<GameSession>)` - 登録済みのセッション（まだ進行していない）
    /// * `Err(SessionError)` - 管理者でない、ゲームがない、実行中など
    pub async fn execute(
        &self,
        requester: &ClientId,
        game_id: String,
    ) -> Result<Arc<GameSession>, SessionError> {
        if !self.admin_gate.is_admin(requester).await {
            tracing::warn!("Non-admin '{}' tried to start a game", requester);
            return Err(SessionError::unauthorized(
                "Only the admin can start the game.",
            ));
        }
        let game_id =
            GameId::new(game_id).map_err(|_| SessionError::not_found("Game not found."))?;
        self.orchestrator.prepare_session(&game_id).await
    }

    /// フェーズの進行を開始する
    pub fn launch(&self, session: Arc<GameSession>) -> JoinHandle<()> {
        self.orchestrator.launch(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            ConnectionId, Game, MockQuizRepository, Nickname, Player, Question, QuestionId,
            QuestionOption, QuizRepository, Topic,
        },
        infrastructure::{
            connection::{ConnectionHandle, ConnectionRegistry, MembershipIndex},
            message_pusher::WebSocketMessagePusher,
            repository::InMemoryQuizRepository,
        },
        usecase::session::PhaseTiming,
    };
    use quizhall_shared::time::FixedClock;
    use tokio::sync::mpsc;

    fn orchestrator_with(
        repository: Arc<dyn QuizRepository>,
        registry: Arc<ConnectionRegistry>,
        membership: Arc<MembershipIndex>,
    ) -> Arc<SessionOrchestrator> {
        let pusher = Arc::new(WebSocketMessagePusher::new(
            registry.clone(),
            membership.clone(),
        ));
        Arc::new(SessionOrchestrator::new(
            repository,
            pusher,
            membership,
            registry,
            Arc::new(FixedClock::new(0)),
            PhaseTiming::from_secs(3, 10, 3),
            false,
        ))
    }

    #[tokio::test]
    async fn test_non_admin_cannot_start_and_nothing_is_broadcast() {
        // テスト項目: 管理者でないクライアントの開始要求は拒否され、どのトピックにも配信されない
        // given (前提条件):
        let mut repository = MockQuizRepository::new();
        repository.expect_get_game().never();
        repository.expect_get_questions().never();
        let registry = Arc::new(ConnectionRegistry::new());
        let membership = Arc::new(MembershipIndex::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let player = ClientId::new("alice".to_string()).unwrap();
        registry.bind(
            Some(player.clone()),
            ConnectionHandle::new(ConnectionId::generate(), tx),
        );
        membership.add_member(
            &Topic::game(&GameId::new("g1".to_string()).unwrap()),
            &player,
        );
        let orchestrator = orchestrator_with(Arc::new(repository), registry, membership);
        let usecase = StartGameUseCase::new(Arc::new(AdminGate::new()), orchestrator.clone());

        // when (操作):
        let result = usecase.execute(&player, "g1".to_string()).await;

        // then (期待する結果):
        assert_eq!(
            result.err(),
            Some(SessionError::Unauthorized(
                "Only the admin can start the game.".to_string()
            ))
        );
        assert!(rx.try_recv().is_err());
        assert!(orchestrator.sessions().is_empty());
    }

    #[tokio::test]
    async fn test_admin_starts_game() {
        // テスト項目: 管理者はプレイヤーのいるゲームを開始できる
        // given (前提条件):
        let game_id = GameId::new("g1".to_string()).unwrap();
        let repository = Arc::new(InMemoryQuizRepository::new(vec![(
            Game::new(game_id.clone(), "Math".to_string()),
            vec![Question::new(
                QuestionId::new("q1".to_string()).unwrap(),
                game_id.clone(),
                "1 + 1 = ?".to_string(),
                vec![QuestionOption::new("2".to_string(), true)],
            )],
        )]));
        repository
            .add_player(Player::new(
                ClientId::new("alice".to_string()).unwrap(),
                game_id.clone(),
                Nickname::new("Alice".to_string()).unwrap(),
                0,
            ))
            .await
            .unwrap();
        let orchestrator = orchestrator_with(
            repository,
            Arc::new(ConnectionRegistry::new()),
            Arc::new(MembershipIndex::new()),
        );
        let gate = Arc::new(AdminGate::new());
        let admin = ClientId::new("admin".to_string()).unwrap();
        gate.try_elect(&admin, "pw", "pw").await;
        let usecase = StartGameUseCase::new(gate, orchestrator.clone());

        // when (操作):
        let session = usecase.execute(&admin, "g1".to_string()).await.unwrap();

        // then (期待する結果):
        assert_eq!(session.game_id(), &game_id);
        assert!(orchestrator.is_running(&game_id));
    }
}
