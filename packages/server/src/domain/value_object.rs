//! Value Object 定義
//!
//! 識別子はすべて空文字を許さない不変の文字列として扱う。

use std::fmt;

use serde::Serialize;

use super::ValueObjectError;

/// 識別子の最大長
const MAX_ID_LENGTH: usize = 128;
/// ニックネームの最大長
const MAX_NICKNAME_LENGTH: usize = 32;

/// Topic 名の接頭辞（ゲームごとのトピック）
const GAME_TOPIC_PREFIX: &str = "game:";
/// ロビーのトピック名
const LOBBY_TOPIC: &str = "lobby";

fn validate(field: &'static str, value: &str, max: usize) -> Result<(), ValueObjectError> {
    if value.trim().is_empty() {
        return Err(ValueObjectError::Empty(field));
    }
    let actual = value.chars().count();
    if actual > max {
        return Err(ValueObjectError::TooLong { field, max, actual });
    }
    Ok(())
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: String) -> Result<Self, ValueObjectError> {
                validate($field, &value, MAX_ID_LENGTH)?;
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// 再接続をまたいで安定したクライアントの識別子
    ClientId,
    "client id"
);
string_id!(
    /// 1 本の WebSocket 接続の識別子（接続ごとに新規発行）
    ConnectionId,
    "connection id"
);
string_id!(
    /// ゲームの識別子
    GameId,
    "game id"
);
string_id!(
    /// 問題の識別子
    QuestionId,
    "question id"
);

impl ClientId {
    /// 新しいクライアント ID を発行（接続時に ID が指定されなかった場合）
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl ConnectionId {
    /// 新しい接続 ID を発行
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// ゲーム内で表示されるプレイヤー名
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Nickname(String);

impl Nickname {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let value = value.trim().to_string();
        validate("nickname", &value, MAX_NICKNAME_LENGTH)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Nickname {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// ブロードキャストのグループ名
///
/// - `lobby`: 全体ロビー
/// - `game:<gameId>`: ゲームごとのセッション
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    pub fn lobby() -> Self {
        Self(LOBBY_TOPIC.to_string())
    }

    pub fn game(game_id: &GameId) -> Self {
        Self(format!("{}{}", GAME_TOPIC_PREFIX, game_id.as_str()))
    }

    /// ゲームのトピックであればゲーム ID を返す
    pub fn game_id(&self) -> Option<GameId> {
        self.0
            .strip_prefix(GAME_TOPIC_PREFIX)
            .and_then(|id| GameId::new(id.to_string()).ok())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
