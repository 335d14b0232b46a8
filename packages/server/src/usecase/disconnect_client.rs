//! UseCase: クライアント切断処理
//!
//! 明示的な `PlayerDisconnectDto` と、トランスポート自身の切断通知の両方から呼ばれる。
//! 接続の紐づけ解除（`ConnectionRegistry::unbind`）に成功した最初の呼び出しだけが
//! 後片付けを行い、2 回目以降は何もしない。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectClientUseCase::execute() メソッド
//! - プレイヤー削除、トピックからの除外、通知の配信
//!
//! ### どのような状況を想定しているか
//! - 正常系：ゲーム参加中のクライアントの切断
//! - エッジケース：同じ接続に対する 2 回目の切断（何もしない）
//! - 異常系：ストアの削除失敗（ログだけ出して後片付けは続ける）

use std::sync::Arc;

use crate::{
    domain::{ClientId, ConnectionId, GameId, MessagePusher, QuizRepository, Topic},
    infrastructure::{
        connection::{ConnectionRegistry, MembershipIndex},
        dto::websocket::{MemberHasLeft, ServerEvent},
    },
    usecase::{
        notify::{broadcast_event, broadcast_players_update},
        session::SessionOrchestrator,
    },
};

/// 切断処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectOutcome {
    pub client_id: ClientId,
    /// プレイヤーとして参加していたゲーム
    pub left_game: Option<GameId>,
    /// 抜けたトピック
    pub left_topics: Vec<Topic>,
}

/// クライアント切断のユースケース
pub struct DisconnectClientUseCase {
    repository: Arc<dyn QuizRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    registry: Arc<ConnectionRegistry>,
    membership: Arc<MembershipIndex>,
    orchestrator: Arc<SessionOrchestrator>,
}

impl DisconnectClientUseCase {
    pub fn new(
        repository: Arc<dyn QuizRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        registry: Arc<ConnectionRegistry>,
        membership: Arc<MembershipIndex>,
        orchestrator: Arc<SessionOrchestrator>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            registry,
            membership,
            orchestrator,
        }
    }

    /// 切断処理を実行
    ///
    /// # Returns
    ///
    /// * `Some(DisconnectOutcome)` - この呼び出しで後片付けを行った
    /// * `None` - 処理済み、または別の接続に置き換え済み
    pub async fn execute(&self, connection_id: &ConnectionId) -> Option<DisconnectOutcome> {
        let Some(client_id) = self.registry.unbind(connection_id) else {
            tracing::debug!("Connection '{}' already cleaned up", connection_id);
            return None;
        };
        tracing::info!("Cleaning up client '{}'", client_id);

        // 1. プレイヤー記録の削除（失敗してもメモリ上の後片付けは続ける）
        let left_game = match self.repository.find_player(&client_id).await {
            Ok(Some(player)) => {
                if let Err(e) = self.repository.remove_player(&client_id).await {
                    tracing::warn!("Failed to remove player '{}': {}", client_id, e);
                }
                self.orchestrator
                    .remove_player(&player.game_id, &client_id)
                    .await;
                Some(player.game_id)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to look up player '{}': {}", client_id, e);
                None
            }
        };

        // 2. 全トピックから外す
        let left_topics: Vec<Topic> = self
            .membership
            .remove_member_everywhere(&client_id)
            .into_iter()
            .collect();

        // 3. 通知
        if let Some(game_id) = &left_game {
            broadcast_players_update(
                self.repository.as_ref(),
                self.message_pusher.as_ref(),
                game_id,
            )
            .await;
        }
        let event = ServerEvent::MemberHasLeftDto(MemberHasLeft {
            member_id: client_id.as_str().to_string(),
        });
        for topic in &left_topics {
            broadcast_event(self.message_pusher.as_ref(), topic, &event).await;
        }

        Some(DisconnectOutcome {
            client_id,
            left_game,
            left_topics,
        })
    }
}
