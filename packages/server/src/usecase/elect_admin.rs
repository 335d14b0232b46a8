//! UseCase: 管理者ログイン

use std::sync::Arc;

use crate::{domain::ClientId, usecase::admin_gate::AdminGate};

/// 管理者ログインのユースケース
pub struct ElectAdminUseCase {
    admin_gate: Arc<AdminGate>,
    /// 設定された管理者パスワード
    admin_password: String,
}

impl ElectAdminUseCase {
    pub fn new(admin_gate: Arc<AdminGate>, admin_password: String) -> Self {
        Self {
            admin_gate,
            admin_password,
        }
    }

    /// パスワードが一致すれば `client_id` を管理者にする
    ///
    /// # Returns
    ///
    /// 管理者になれたかどうか
    pub async fn execute(&self, client_id: &ClientId, password: &str) -> bool {
        self.admin_gate
            .try_elect(client_id, password, &self.admin_password)
            .await
    }
}
