//! WebSocket を使った MessagePusher 実装（Broadcast Engine）
//!
//! ## 責務
//!
//! - トピックのメンバーを Membership Index から取得
//! - Connection Registry でメンバーの接続を引き、メッセージを送信
//! - 接続が見つからない・死んでいるメンバーをトピックから外す（自己修復）
//!
//! ## 設計ノート
//!
//! メンバー一覧はスナップショットとして取り出してから送信する。
//! 送信中にインデックスのロックを握ることはない。

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    domain::{ClientId, MessagePushError, MessagePusher, Topic},
    infrastructure::connection::{ConnectionRegistry, MembershipIndex},
};

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let pusher = WebSocketMessagePusher::new(registry.clone(), membership.clone());
/// let delivered = pusher.broadcast(&Topic::lobby(), "{\"eventType\":\"...\"}").await;
/// ```
pub struct WebSocketMessagePusher {
    registry: Arc<ConnectionRegistry>,
    membership: Arc<MembershipIndex>,
}

impl WebSocketMessagePusher {
    pub fn new(registry: Arc<ConnectionRegistry>, membership: Arc<MembershipIndex>) -> Self {
        Self {
            registry,
            membership,
        }
    }

    fn deliver(&self, member: &ClientId, content: &str) -> Result<(), MessagePushError> {
        let handle = self
            .registry
            .handle_of(member)
            .ok_or_else(|| MessagePushError::ConnectionNotFound(member.as_str().to_string()))?;
        if !handle.is_alive() {
            return Err(MessagePushError::ConnectionClosed(
                handle.id().as_str().to_string(),
            ));
        }
        handle.send(content)
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn broadcast(&self, topic: &Topic, content: &str) -> usize {
        let members = self.membership.members_of(topic);
        if members.is_empty() {
            tracing::debug!("No members in topic '{}', nothing to broadcast", topic);
            return 0;
        }

        let total = members.len();
        let mut delivered = 0;
        for member in members {
            // 1 メンバーの失敗で残りの配信を止めない
            match self.deliver(&member, content) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        "Evicting '{}' from topic '{}' after failed delivery: {}",
                        member,
                        topic,
                        e
                    );
                    self.membership.remove_member(topic, &member);
                }
            }
        }

        tracing::debug!(
            "Broadcast to topic '{}': {}/{} delivered",
            topic,
            delivered,
            total
        );
        delivered
    }
}
