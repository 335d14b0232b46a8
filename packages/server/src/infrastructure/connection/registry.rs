//! Connection Registry
//!
//! クライアント ID ↔ 接続ハンドルの双方向マップ。
//!
//! ## 不変条件
//!
//! - 1 つのクライアント ID に紐づく接続は高々 1 つ
//! - `by_connection` に残っている接続は、まだ切断処理が済んでいない接続
//!
//! `bind` は `by_client` のエントリを握ったまま `by_connection` を更新する。
//! 他の操作は両方を同時に握らないため、ロック順序は常に client → connection。

use std::collections::BTreeMap;

use dashmap::{DashMap, mapref::entry::Entry};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::domain::{ClientId, ConnectionId, MessagePushError, PusherChannel};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Connection '{0}' is not registered")]
    NotFound(String),
}

/// 1 本の WebSocket 接続へのハンドル
///
/// 送信チャンネルの受信側（送信タスク）が終了していれば死んだ接続とみなす。
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sender: PusherChannel,
    closer: CancellationToken,
}

impl ConnectionHandle {
    pub fn new(id: ConnectionId, sender: PusherChannel) -> Self {
        Self {
            id,
            sender,
            closer: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn is_alive(&self) -> bool {
        !self.sender.is_closed() && !self.closer.is_cancelled()
    }

    pub fn send(&self, content: &str) -> Result<(), MessagePushError> {
        self.sender
            .send(content.to_string())
            .map_err(|_| MessagePushError::ConnectionClosed(self.id.as_str().to_string()))
    }

    /// サーバー側から接続を閉じるよう送信タスクに要求する
    pub fn close(&self) {
        self.closer.cancel();
    }

    /// `close` が呼ばれたときに完了するトークン
    pub fn close_signal(&self) -> CancellationToken {
        self.closer.clone()
    }
}

/// クライアント ID ↔ 接続の双方向レジストリ
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    by_client: DashMap<ClientId, ConnectionHandle>,
    by_connection: DashMap<ConnectionId, ClientId>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接続をクライアント ID に紐づける
    ///
    /// `client_id` が `None` の場合は新しい ID を発行する。
    /// 同じクライアント ID に既存の接続があれば置き換え、古いハンドルを返す。
    pub fn bind(
        &self,
        client_id: Option<ClientId>,
        handle: ConnectionHandle,
    ) -> (ClientId, Option<ConnectionHandle>) {
        let client_id = client_id.unwrap_or_else(ClientId::generate);
        let connection_id = handle.id().clone();

        let previous = match self.by_client.entry(client_id.clone()) {
            Entry::Occupied(mut entry) => {
                let previous = entry.insert(handle);
                self.by_connection.remove(previous.id());
                self.by_connection.insert(connection_id, client_id.clone());
                Some(previous)
            }
            Entry::Vacant(entry) => {
                self.by_connection.insert(connection_id, client_id.clone());
                entry.insert(handle);
                None
            }
        };

        (client_id, previous)
    }

    /// 接続の紐づけを解除する
    ///
    /// 最初の呼び出しだけがクライアント ID を受け取る。2 回目以降、
    /// または別の接続に置き換え済みの場合は `None` を返す。
    pub fn unbind(&self, connection_id: &ConnectionId) -> Option<ClientId> {
        let (_, client_id) = self.by_connection.remove(connection_id)?;
        self.by_client
            .remove_if(&client_id, |_, handle| handle.id() == connection_id);
        Some(client_id)
    }

    /// クライアントの接続を強制的に外し、そのハンドルを返す
    pub fn evict(&self, client_id: &ClientId) -> Option<ConnectionHandle> {
        let (_, handle) = self.by_client.remove(client_id)?;
        self.by_connection
            .remove_if(handle.id(), |_, bound| bound == client_id);
        Some(handle)
    }

    pub fn identity_of(&self, connection_id: &ConnectionId) -> Result<ClientId, RegistryError> {
        self.by_connection
            .get(connection_id)
            .map(|client_id| client_id.clone())
            .ok_or_else(|| RegistryError::NotFound(connection_id.as_str().to_string()))
    }

    pub fn handle_of(&self, client_id: &ClientId) -> Option<ConnectionHandle> {
        self.by_client.get(client_id).map(|handle| handle.clone())
    }

    pub fn len(&self) -> usize {
        self.by_client.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_client.is_empty()
    }

    /// クライアント ID → 接続 ID のスナップショット（デバッグ用）
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.by_client
            .iter()
            .map(|entry| {
                (
                    entry.key().as_str().to_string(),
                    entry.value().id().as_str().to_string(),
                )
            })
            .collect()
    }
}
