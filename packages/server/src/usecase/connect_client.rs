//! UseCase: クライアント接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectClientUseCase::execute() メソッド
//! - クライアント ID の発行と、同じ ID での再接続による接続の置き換え
//!
//! ### どのような状況を想定しているか
//! - 正常系：ID なしでの新規接続（ID を発行）
//! - 正常系：既知の ID での再接続（古い接続を閉じる）

use std::sync::Arc;

use crate::{
    domain::{ClientId, ConnectionId, PusherChannel},
    infrastructure::connection::{ConnectionHandle, ConnectionRegistry},
};

/// 接続済みクライアント
#[derive(Debug, Clone)]
pub struct ConnectedClient {
    pub client_id: ClientId,
    pub handle: ConnectionHandle,
}

/// クライアント接続のユースケース
pub struct ConnectClientUseCase {
    registry: Arc<ConnectionRegistry>,
}

impl ConnectClientUseCase {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// 接続をクライアント ID に紐づける
    ///
    /// # Arguments
    ///
    /// * `requested` - クライアントが指定した ID（`None` なら新しく発行する）
    /// * `sender` - クライアントへのメッセージ送信用チャンネル
    pub fn execute(&self, requested: Option<ClientId>, sender: PusherChannel) -> ConnectedClient {
        let handle = ConnectionHandle::new(ConnectionId::generate(), sender);
        let (client_id, previous) = self.registry.bind(requested, handle.clone());

        // 同じクライアントの古い接続は閉じる（切断処理は新しい接続に影響しない）
        if let Some(previous) = previous {
            tracing::info!(
                "Client '{}' reconnected, closing previous connection '{}'",
                client_id,
                previous.id()
            );
            previous.close();
        }

        tracing::info!("Client '{}' connected as '{}'", client_id, handle.id());
        ConnectedClient { client_id, handle }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_connect_without_client_id() {
        // テスト項目: ID を指定しない接続には新しい ID が発行される
        // given (前提条件):
        let registry = Arc::new(ConnectionRegistry::new());
        let usecase = ConnectClientUseCase::new(registry.clone());
        let (tx, _rx) = mpsc::unbounded_channel();

        // when (操作):
        let connected = usecase.execute(None, tx);

        // then (期待する結果):
        assert_eq!(
            registry.identity_of(connected.handle.id()),
            Ok(connected.client_id.clone())
        );
    }

    #[test]
    fn test_reconnect_closes_previous_connection() {
        // テスト項目: 同じ ID で再接続すると古い接続が閉じられ、新しい接続だけが残る
        // given (前提条件):
        let registry = Arc::new(ConnectionRegistry::new());
        let usecase = ConnectClientUseCase::new(registry.clone());
        let alice = ClientId::new("alice".to_string()).unwrap();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        let first = usecase.execute(Some(alice.clone()), tx1);

        // when (操作):
        let second = usecase.execute(Some(alice.clone()), tx2);

        // then (期待する結果):
        assert!(!first.handle.is_alive());
        assert!(second.handle.is_alive());
        assert_eq!(
            registry.handle_of(&alice).map(|h| h.id().clone()),
            Some(second.handle.id().clone())
        );
        assert!(registry.identity_of(first.handle.id()).is_err());
    }
}
