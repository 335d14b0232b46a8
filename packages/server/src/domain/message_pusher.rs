//! MessagePusher trait 定義
//!
//! トピック単位のブロードキャストのインターフェースを定義します。
//! 具体的な実装（WebSocket）は Infrastructure 層が提供します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::Topic;

/// 1 接続ぶんの送信チャンネル（WebSocket の送信タスクへつながる）
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// トピックへの配信を担う trait
///
/// 個々のメンバーへの送信失敗は呼び出し元へ伝播しない。
/// 実装側でログを出し、死んだメンバーをトピックから外す。
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// トピックの全メンバーへ `content` を配信し、配信できた件数を返す
    async fn broadcast(&self, topic: &Topic, content: &str) -> usize;
}
