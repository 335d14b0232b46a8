//! Repository trait 定義
//!
//! ドメイン層が必要とする永続ストアのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{ClientId, Game, GameId, Player, PlayerAnswer, Question, QuestionId, RepositoryError};

/// ゲーム・問題・プレイヤー・回答の永続ストア
///
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// 全ゲームを取得
    async fn list_games(&self) -> Result<Vec<Game>, RepositoryError>;

    /// ゲームを ID で取得
    async fn get_game(&self, game_id: &GameId) -> Result<Game, RepositoryError>;

    /// ゲームの問題を保存順で取得
    async fn get_questions(&self, game_id: &GameId) -> Result<Vec<Question>, RepositoryError>;

    /// 問題を ID で取得
    async fn get_question(&self, question_id: &QuestionId) -> Result<Question, RepositoryError>;

    /// 問題を出題済みにする
    async fn mark_question_answered(
        &self,
        question_id: &QuestionId,
    ) -> Result<(), RepositoryError>;

    /// プレイヤーを追加
    async fn add_player(&self, player: Player) -> Result<(), RepositoryError>;

    /// プレイヤーをクライアント ID で検索
    async fn find_player(&self, client_id: &ClientId) -> Result<Option<Player>, RepositoryError>;

    /// プレイヤーを削除
    async fn remove_player(&self, client_id: &ClientId) -> Result<(), RepositoryError>;

    /// ゲームに参加中のプレイヤーを参加順で取得
    async fn players_in_game(&self, game_id: &GameId) -> Result<Vec<Player>, RepositoryError>;

    /// ゲームの全プレイヤーを削除し、削除件数を返す
    async fn remove_players_in_game(&self, game_id: &GameId) -> Result<usize, RepositoryError>;

    /// プレイヤーの累計スコアを保存
    async fn update_player_score(
        &self,
        client_id: &ClientId,
        score: u32,
    ) -> Result<(), RepositoryError>;

    /// 回答を追記
    async fn record_answer(&self, answer: PlayerAnswer) -> Result<(), RepositoryError>;
}
