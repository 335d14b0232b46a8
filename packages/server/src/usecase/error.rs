//! UseCase 層のエラー型
//!
//! 各バリアントはクライアントにそのまま返す短いメッセージを持つ。
//! 内部エラーの詳細はログにだけ出す。

use thiserror::Error;

use crate::domain::RepositoryError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// 未知のゲーム・問題・選択肢・接続・クライアント
    #[error("{0}")]
    NotFound(String),
    /// 管理者以外による管理者専用操作
    #[error("{0}")]
    Unauthorized(String),
    /// 状態の衝突（ニックネーム重複、実行中のゲームなど）
    #[error("{0}")]
    Conflict(String),
    /// 永続ストアの読み書き失敗
    #[error("{0}")]
    StoreFailure(String),
}

impl SessionError {
    pub fn not_found(message: &str) -> Self {
        Self::NotFound(message.to_string())
    }

    pub fn unauthorized(message: &str) -> Self {
        Self::Unauthorized(message.to_string())
    }

    pub fn conflict(message: &str) -> Self {
        Self::Conflict(message.to_string())
    }
}

impl From<RepositoryError> for SessionError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::GameNotFound(_) => Self::not_found("Game not found."),
            RepositoryError::QuestionNotFound(_) => Self::not_found("Question not found"),
            RepositoryError::PlayerNotFound(_) => Self::not_found("Player not found."),
            RepositoryError::PlayerAlreadyExists(_) => Self::conflict("Player already exists."),
            RepositoryError::Unavailable(detail) => {
                tracing::error!("Store unavailable: {}", detail);
                Self::StoreFailure("Storage is unavailable. Please try again.".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_failure_hides_internal_detail() {
        // テスト項目: ストア障害の詳細はクライアント向けメッセージに含まれない
        // given (前提条件):
        let error = RepositoryError::Unavailable("connection refused on 10.0.0.5".to_string());

        // when (操作):
        let converted = SessionError::from(error);

        // then (期待する結果):
        assert!(matches!(converted, SessionError::StoreFailure(_)));
        assert!(!converted.to_string().contains("10.0.0.5"));
    }

    #[test]
    fn test_game_not_found_message() {
        // テスト項目: ゲームが見つからない場合のメッセージ
        // given (前提条件):
        let error = RepositoryError::GameNotFound("g1".to_string());

        // when (操作):
        let converted = SessionError::from(error);

        // then (期待する結果):
        assert_eq!(converted, SessionError::NotFound("Game not found.".to_string()));
    }
}
