//! InMemory Quiz Repository 実装
//!
//! ドメイン層が定義する QuizRepository trait の具体的な実装。
//! Vec をインメモリ DB として使用し、挿入順（= 保存順）を保つ。

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ClientId, Game, GameId, Player, PlayerAnswer, Question, QuestionId, QuizRepository,
    RepositoryError,
};

#[derive(Debug, Default)]
struct QuizStore {
    games: Vec<Game>,
    /// 全ゲームの問題（ゲーム内の保存順）
    questions: Vec<Question>,
    /// 参加順
    players: Vec<Player>,
    answers: Vec<PlayerAnswer>,
}

/// インメモリ Quiz Repository 実装
pub struct InMemoryQuizRepository {
    store: Mutex<QuizStore>,
}

impl InMemoryQuizRepository {
    /// ゲームと問題一覧から新しい InMemoryQuizRepository を作成
    pub fn new(games: Vec<(Game, Vec<Question>)>) -> Self {
        let mut store = QuizStore::default();
        for (game, questions) in games {
            store.games.push(game);
            store.questions.extend(questions);
        }
        Self {
            store: Mutex::new(store),
        }
    }

    /// 記録済みの回答（追記順）
    pub async fn answers(&self) -> Vec<PlayerAnswer> {
        self.store.lock().await.answers.clone()
    }
}

#[async_trait]
impl QuizRepository for InMemoryQuizRepository {
    async fn list_games(&self) -> Result<Vec<Game>, RepositoryError> {
        Ok(self.store.lock().await.games.clone())
    }

    async fn get_game(&self, game_id: &GameId) -> Result<Game, RepositoryError> {
        let store = self.store.lock().await;
        store
            .games
            .iter()
            .find(|game| &game.id == game_id)
            .cloned()
            .ok_or_else(|| RepositoryError::GameNotFound(game_id.as_str().to_string()))
    }

    async fn get_questions(&self, game_id: &GameId) -> Result<Vec<Question>, RepositoryError> {
        let store = self.store.lock().await;
        if !store.games.iter().any(|game| &game.id == game_id) {
            return Err(RepositoryError::GameNotFound(game_id.as_str().to_string()));
        }
        Ok(store
            .questions
            .iter()
            .filter(|question| &question.game_id == game_id)
            .cloned()
            .collect())
    }

    async fn get_question(&self, question_id: &QuestionId) -> Result<Question, RepositoryError> {
        let store = self.store.lock().await;
        store
            .questions
            .iter()
            .find(|question| &question.id == question_id)
            .cloned()
            .ok_or_else(|| RepositoryError::QuestionNotFound(question_id.as_str().to_string()))
    }

    async fn mark_question_answered(
        &self,
        question_id: &QuestionId,
    ) -> Result<(), RepositoryError> {
        let mut store = self.store.lock().await;
        let question = store
            .questions
            .iter_mut()
            .find(|question| &question.id == question_id)
            .ok_or_else(|| RepositoryError::QuestionNotFound(question_id.as_str().to_string()))?;
        question.answered = true;
        Ok(())
    }

    async fn add_player(&self, player: Player) -> Result<(), RepositoryError> {
        let mut store = self.store.lock().await;
        if store.players.iter().any(|existing| existing.id == player.id) {
            return Err(RepositoryError::PlayerAlreadyExists(
                player.id.as_str().to_string(),
            ));
        }
        // ゲーム内でニックネームは一意
        if store
            .players
            .iter()
            .any(|existing| existing.game_id == player.game_id && existing.nickname == player.nickname)
        {
            return Err(RepositoryError::PlayerAlreadyExists(
                player.nickname.as_str().to_string(),
            ));
        }
        store.players.push(player);
        Ok(())
    }

    async fn find_player(&self, client_id: &ClientId) -> Result<Option<Player>, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store
            .players
            .iter()
            .find(|player| &player.id == client_id)
            .cloned())
    }

    async fn remove_player(&self, client_id: &ClientId) -> Result<(), RepositoryError> {
        let mut store = self.store.lock().await;
        let before = store.players.len();
        store.players.retain(|player| &player.id != client_id);
        if store.players.len() == before {
            return Err(RepositoryError::PlayerNotFound(client_id.as_str().to_string()));
        }
        Ok(())
    }

    async fn players_in_game(&self, game_id: &GameId) -> Result<Vec<Player>, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store
            .players
            .iter()
            .filter(|player| &player.game_id == game_id)
            .cloned()
            .collect())
    }

    async fn remove_players_in_game(&self, game_id: &GameId) -> Result<usize, RepositoryError> {
        let mut store = self.store.lock().await;
        let before = store.players.len();
        store.players.retain(|player| &player.game_id != game_id);
        Ok(before - store.players.len())
    }

    async fn update_player_score(
        &self,
        client_id: &ClientId,
        score: u32,
    ) -> Result<(), RepositoryError> {
        let mut store = self.store.lock().await;
        let player = store
            .players
            .iter_mut()
            .find(|player| &player.id == client_id)
            .ok_or_else(|| RepositoryError::PlayerNotFound(client_id.as_str().to_string()))?;
        player.score = score;
        Ok(())
    }

    async fn record_answer(&self, answer: PlayerAnswer) -> Result<(), RepositoryError> {
        self.store.lock().await.answers.push(answer);
        Ok(())
    }
}
