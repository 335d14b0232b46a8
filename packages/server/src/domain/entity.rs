//! エンティティ定義

use super::{ClientId, GameId, Nickname, QuestionId};

/// クイズゲーム
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub id: GameId,
    pub name: String,
}

impl Game {
    pub fn new(id: GameId, name: String) -> Self {
        Self { id, name }
    }
}

/// 問題の選択肢
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionOption {
    pub text: String,
    pub is_correct: bool,
}

impl QuestionOption {
    pub fn new(text: String, is_correct: bool) -> Self {
        Self { text, is_correct }
    }
}

/// 問題
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: QuestionId,
    pub game_id: GameId,
    pub text: String,
    pub options: Vec<QuestionOption>,
    /// 出題済みかどうか
    pub answered: bool,
}

impl Question {
    pub fn new(id: QuestionId, game_id: GameId, text: String, options: Vec<QuestionOption>) -> Self {
        Self {
            id,
            game_id,
            text,
            options,
            answered: false,
        }
    }

    /// 選択肢を表示テキストで探す
    pub fn option_by_text(&self, text: &str) -> Option<&QuestionOption> {
        self.options.iter().find(|option| option.text == text)
    }
}

/// ゲームに参加したプレイヤー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: ClientId,
    pub game_id: GameId,
    pub nickname: Nickname,
    /// 累計スコア（減らない）
    pub score: u32,
    /// 参加時刻（Unix ミリ秒）
    pub joined_at: i64,
}

impl Player {
    pub fn new(id: ClientId, game_id: GameId, nickname: Nickname, joined_at: i64) -> Self {
        Self {
            id,
            game_id,
            nickname,
            score: 0,
            joined_at,
        }
    }
}

/// プレイヤーの回答（追記のみ）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerAnswer {
    pub player_id: ClientId,
    pub question_id: QuestionId,
    pub selected_option: String,
    pub is_correct: bool,
    /// 回答時刻（Unix ミリ秒）
    pub answered_at: i64,
}

/// ゲーム終了時のプレイヤーごとの集計
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerResult {
    pub player_id: ClientId,
    pub nickname: Nickname,
    /// 獲得ポイント合計
    pub score: u32,
    /// 正解数
    pub correct_answers: u32,
}
