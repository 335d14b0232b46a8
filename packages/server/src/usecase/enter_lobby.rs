//! UseCase: ロビー入室

use std::sync::Arc;

use crate::{
    domain::{ClientId, MessagePusher, Topic},
    infrastructure::{
        connection::{ConnectionRegistry, MembershipIndex},
        dto::websocket::{LobbyUpdate, ServerEvent},
    },
    usecase::notify::broadcast_event,
};

/// ロビー入室のユースケース
pub struct EnterLobbyUseCase {
    message_pusher: Arc<dyn MessagePusher>,
    registry: Arc<ConnectionRegistry>,
    membership: Arc<MembershipIndex>,
}

impl EnterLobbyUseCase {
    pub fn new(
        message_pusher: Arc<dyn MessagePusher>,
        registry: Arc<ConnectionRegistry>,
        membership: Arc<MembershipIndex>,
    ) -> Self {
        Self {
            message_pusher,
            registry,
            membership,
        }
    }

    /// クライアントをロビーのトピックに入れる（入室済みなら何もしない）
    ///
    /// 接続が既に外されていれば入室を取り消して `false` を返す。
    pub fn execute(&self, client_id: &ClientId) -> bool {
        let topic = Topic::lobby();
        let entered = self.membership.add_member(&topic, client_id);
        if self.registry.handle_of(client_id).is_none() {
            self.membership.remove_member(&topic, client_id);
            return false;
        }
        entered
    }

    /// ロビーの全メンバーを、ロビーの全員にブロードキャスト
    pub async fn broadcast_lobby(&self) -> usize {
        let topic = Topic::lobby();
        let mut all_client_ids: Vec<String> = self
            .membership
            .members_of(&topic)
            .into_iter()
            .map(ClientId::into_string)
            .collect();
        all_client_ids.sort();

        let event = ServerEvent::ServerPutsClientInLobbyAndBroadcastsToEveryoneDto(LobbyUpdate {
            all_client_ids,
        });
        broadcast_event(self.message_pusher.as_ref(), &topic, &event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::ConnectionId,
        infrastructure::{
            connection::{ConnectionHandle, ConnectionRegistry},
            message_pusher::WebSocketMessagePusher,
        },
    };
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_enter_lobby_broadcasts_everyone() {
        // テスト項目: ロビーに入ると、ロビーの全員に全メンバーの ID が届く
        // given (前提条件):
        let registry = Arc::new(ConnectionRegistry::new());
        let membership = Arc::new(MembershipIndex::new());
        let pusher = Arc::new(WebSocketMessagePusher::new(
            registry.clone(),
            membership.clone(),
        ));
        let usecase = EnterLobbyUseCase::new(pusher, registry.clone(), membership.clone());
        let mut receivers = Vec::new();
        for id in ["bob", "alice"] {
            let (tx, rx) = mpsc::unbounded_channel();
            registry.bind(
                Some(ClientId::new(id.to_string()).unwrap()),
                ConnectionHandle::new(ConnectionId::generate(), tx),
            );
            receivers.push(rx);
        }

        // when (操作):
        usecase.execute(&ClientId::new("bob".to_string()).unwrap());
        let entered = usecase.execute(&ClientId::new("alice".to_string()).unwrap());
        let delivered = usecase.broadcast_lobby().await;

        // then (期待する結果):
        assert!(entered);
        assert_eq!(delivered, 2);
        for rx in receivers.iter_mut() {
            let raw = rx.try_recv().unwrap();
            let event: serde_json::Value = serde_json::from_str(&raw).unwrap();
            assert_eq!(
                event["eventType"],
                "ServerPutsClientInLobbyAndBroadcastsToEveryoneDto"
            );
            assert_eq!(event["allClientIds"], serde_json::json!(["alice", "bob"]));
        }
    }

    #[test]
    fn test_enter_lobby_without_connection_is_undone() {
        // テスト項目: 接続が外れたクライアントはロビーに残らない
        // given (前提条件):
        let registry = Arc::new(ConnectionRegistry::new());
        let membership = Arc::new(MembershipIndex::new());
        let pusher = Arc::new(WebSocketMessagePusher::new(
            registry.clone(),
            membership.clone(),
        ));
        let usecase = EnterLobbyUseCase::new(pusher, registry, membership.clone());
        let ghost = ClientId::new("ghost".to_string()).unwrap();

        // when (操作):
        let entered = usecase.execute(&ghost);

        // then (期待する結果):
        assert!(!entered);
        assert!(membership.members_of(&Topic::lobby()).is_empty());
        assert!(membership.topics_of(&ghost).is_empty());
    }
}
