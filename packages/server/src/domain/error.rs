//! ドメイン層のエラー型

use thiserror::Error;

/// Value Object の生成失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("{field} must be at most {max} characters (got {actual})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

/// 永続ストアへのアクセス失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Game '{0}' not found")]
    GameNotFound(String),
    #[error("Question '{0}' not found")]
    QuestionNotFound(String),
    #[error("Player '{0}' not found")]
    PlayerNotFound(String),
    #[error("Player '{0}' already exists")]
    PlayerAlreadyExists(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// クライアントへのメッセージ送信失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("No connection bound to client '{0}'")]
    ConnectionNotFound(String),
    #[error("Connection '{0}' is closed")]
    ConnectionClosed(String),
}
