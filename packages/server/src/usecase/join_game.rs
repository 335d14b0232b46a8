//! UseCase: ゲーム参加
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinGameUseCase::execute() メソッド
//! - プレイヤーの登録、ゲームのトピックへの追加、実行中セッションへの追加
//!
//! ### どのような状況を想定しているか
//! - 正常系：待機中のゲームへの参加
//! - 異常系：存在しないゲーム、使用中のニックネーム、二重参加

use std::sync::Arc;

use quizhall_shared::time::Clock;

use crate::{
    domain::{
        ClientId, GameId, MessagePusher, Nickname, Player, QuizRepository, RepositoryError,
        Topic,
    },
    infrastructure::connection::{ConnectionRegistry, MembershipIndex},
    usecase::{
        error::SessionError, notify::broadcast_players_update, session::SessionOrchestrator,
    },
};

const NICKNAME_TAKEN: &str = "Nickname already taken in this game. Please choose another.";
const NOT_CONNECTED: &str = "You are no longer connected.";

/// ゲーム参加のユースケース
pub struct JoinGameUseCase {
    repository: Arc<dyn QuizRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    registry: Arc<ConnectionRegistry>,
    membership: Arc<MembershipIndex>,
    orchestrator: Arc<SessionOrchestrator>,
    clock: Arc<dyn Clock>,
}

impl JoinGameUseCase {
    pub fn new(
        repository: Arc<dyn QuizRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        registry: Arc<ConnectionRegistry>,
        membership: Arc<MembershipIndex>,
        orchestrator: Arc<SessionOrchestrator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            registry,
            membership,
            orchestrator,
            clock,
        }
    }

    /// ゲームに参加する
    ///
    /// # Returns
    ///
    /// * `Ok(GameId)` - 参加したゲーム
    /// * `Err(SessionError)` - 参加失敗（リクエスト元にだけ返す）
    pub async fn execute(
        &self,
        client_id: &ClientId,
        game_id: String,
        nickname: String,
    ) -> Result<GameId, SessionError> {
        let game_id = GameId::new(game_id).map_err(|_| SessionError::not_found("Game not found."))?;
        let nickname = Nickname::new(nickname)
            .map_err(|e| SessionError::Conflict(format!("Invalid nickname: {e}.")))?;

        // 1. ゲームの存在確認
        let game = self.repository.get_game(&game_id).await?;

        // 2. 二重参加・ニックネーム重複のチェック
        if let Some(existing) = self.repository.find_player(client_id).await? {
            let message = if existing.game_id == game.id {
                "You have already joined this game."
            } else {
                "You have already joined another game."
            };
            return Err(SessionError::conflict(message));
        }
        let players = self.repository.players_in_game(&game.id).await?;
        if players.iter().any(|player| player.nickname == nickname) {
            return Err(SessionError::conflict(NICKNAME_TAKEN));
        }

        // 3. 登録
        let player = Player::new(
            client_id.clone(),
            game.id.clone(),
            nickname,
            self.clock.now_millis(),
        );
        match self.repository.add_player(player.clone()).await {
            Ok(()) => {}
            Err(RepositoryError::PlayerAlreadyExists(_)) => {
                return Err(SessionError::conflict(NICKNAME_TAKEN));
            }
            Err(e) => return Err(e.into()),
        }

        // 4. ゲームのトピックと、実行中ならセッションに加える
        let topic = Topic::game(&game.id);
        self.membership.add_member(&topic, client_id);
        self.orchestrator.add_player(&player).await;

        // 5. 途中で切断処理が済んでいたら取り消す
        if self.registry.handle_of(client_id).is_none() {
            tracing::info!("'{}' disconnected while joining '{}'", client_id, game.id);
            self.rollback(&player, &topic).await;
            return Err(SessionError::not_found(NOT_CONNECTED));
        }

        tracing::info!(
            "'{}' joined game '{}' as '{}'",
            client_id,
            game.id,
            player.nickname.as_str()
        );
        Ok(game.id)
    }

    async fn rollback(&self, player: &Player, topic: &Topic) {
        match self.repository.remove_player(&player.id).await {
            Ok(()) | Err(RepositoryError::PlayerNotFound(_)) => {}
            Err(e) => tracing::warn!("Failed to remove player '{}': {}", player.id, e),
        }
        self.membership.remove_member(topic, &player.id);
        self.orchestrator
            .remove_player(&player.game_id, &player.id)
            .await;
    }

    /// ゲームのプレイヤー一覧をゲームのトピックへ配信
    pub async fn broadcast_players(&self, game_id: &GameId) -> usize {
        broadcast_players_update(
            self.repository.as_ref(),
            self.message_pusher.as_ref(),
            game_id,
        )
        .await
    }
}
