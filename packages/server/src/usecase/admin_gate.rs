//! Admin Gate
//!
//! プロセス全体で 1 人だけの管理者クライアントを保持する。
//! パスワードが一致するたびに置き換わる（最後に成功したログインが勝つ）。

use tokio::sync::RwLock;

use crate::domain::ClientId;

#[derive(Debug, Default)]
pub struct AdminGate {
    current: RwLock<Option<ClientId>>,
}

impl AdminGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// パスワードが一致すれば `identity` を管理者にして `true` を返す
    ///
    /// 一致しなければ状態は変えずに `false` を返す。
    pub async fn try_elect(&self, identity: &ClientId, supplied: &str, expected: &str) -> bool {
        if supplied != expected {
            tracing::info!("Admin election rejected for '{}'", identity);
            return false;
        }
        let previous = self.current.write().await.replace(identity.clone());
        match previous {
            Some(previous) if &previous != identity => {
                tracing::info!("Admin role moved from '{}' to '{}'", previous, identity);
            }
            _ => tracing::info!("'{}' is now the admin", identity),
        }
        true
    }

    pub async fn is_admin(&self, identity: &ClientId) -> bool {
        self.current.read().await.as_ref() == Some(identity)
    }

    pub async fn current(&self) -> Option<ClientId> {
        self.current.read().await.clone()
    }
}
