//! Shared application state and dependency wiring.

use std::sync::Arc;

use quizhall_shared::time::Clock;

use crate::{
    domain::{MessagePusher, QuizRepository},
    infrastructure::{
        connection::{ConnectionRegistry, MembershipIndex},
        message_pusher::WebSocketMessagePusher,
    },
    usecase::{
        AdminGate, ConnectClientUseCase, DisconnectClientUseCase, ElectAdminUseCase,
        EndGameUseCase, EnterLobbyUseCase, GetGamesUseCase, JoinGameUseCase, PhaseTiming,
        SessionOrchestrator, StartGameUseCase, SubmitAnswerUseCase,
    },
};

/// セッション関連の設定
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub admin_password: String,
    pub timing: PhaseTiming,
    /// 問題の配信に正解フラグを含めるか
    pub reveal_answer_key: bool,
}

/// Shared application state
pub struct AppState {
    pub connect_client_usecase: Arc<ConnectClientUseCase>,
    pub disconnect_client_usecase: Arc<DisconnectClientUseCase>,
    pub enter_lobby_usecase: Arc<EnterLobbyUseCase>,
    pub elect_admin_usecase: Arc<ElectAdminUseCase>,
    pub get_games_usecase: Arc<GetGamesUseCase>,
    pub join_game_usecase: Arc<JoinGameUseCase>,
    pub submit_answer_usecase: Arc<SubmitAnswerUseCase>,
    pub start_game_usecase: Arc<StartGameUseCase>,
    pub end_game_usecase: Arc<EndGameUseCase>,
    /// Connection Registry（デバッグ表示と受信メッセージの送信元解決に使う）
    pub registry: Arc<ConnectionRegistry>,
    pub membership: Arc<MembershipIndex>,
    pub admin_gate: Arc<AdminGate>,
    pub orchestrator: Arc<SessionOrchestrator>,
}

impl AppState {
    /// 依存関係を組み立てる
    ///
    /// 1. Connection Registry / Membership Index
    /// 2. MessagePusher
    /// 3. Admin Gate / Session Orchestrator
    /// 4. UseCases
    pub fn new(
        repository: Arc<dyn QuizRepository>,
        clock: Arc<dyn Clock>,
        settings: SessionSettings,
    ) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let membership = Arc::new(MembershipIndex::new());

        let message_pusher: Arc<dyn MessagePusher> = Arc::new(WebSocketMessagePusher::new(
            registry.clone(),
            membership.clone(),
        ));

        let admin_gate = Arc::new(AdminGate::new());
        let orchestrator = Arc::new(SessionOrchestrator::new(
            repository.clone(),
            message_pusher.clone(),
            membership.clone(),
            registry.clone(),
            clock.clone(),
            settings.timing,
            settings.reveal_answer_key,
        ));

        Self {
            connect_client_usecase: Arc::new(ConnectClientUseCase::new(registry.clone())),
            disconnect_client_usecase: Arc::new(DisconnectClientUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                registry.clone(),
                membership.clone(),
                orchestrator.clone(),
            )),
            enter_lobby_usecase: Arc::new(EnterLobbyUseCase::new(
                message_pusher.clone(),
                registry.clone(),
                membership.clone(),
            )),
            elect_admin_usecase: Arc::new(ElectAdminUseCase::new(
                admin_gate.clone(),
                settings.admin_password,
            )),
            get_games_usecase: Arc::new(GetGamesUseCase::new(repository.clone())),
            join_game_usecase: Arc::new(JoinGameUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                registry.clone(),
                membership.clone(),
                orchestrator.clone(),
                clock.clone(),
            )),
            submit_answer_usecase: Arc::new(SubmitAnswerUseCase::new(
                repository,
                orchestrator.clone(),
                clock,
            )),
            start_game_usecase: Arc::new(StartGameUseCase::new(
                admin_gate.clone(),
                orchestrator.clone(),
            )),
            end_game_usecase: Arc::new(EndGameUseCase::new(
                admin_gate.clone(),
                orchestrator.clone(),
            )),
            registry,
            membership,
            admin_gate,
            orchestrator,
        }
    }
}
