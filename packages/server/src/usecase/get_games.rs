//! UseCase: ゲーム一覧取得

use std::sync::Arc;

use crate::{
    domain::{Game, QuizRepository},
    usecase::error::SessionError,
};

/// ゲーム一覧取得のユースケース
pub struct GetGamesUseCase {
    repository: Arc<dyn QuizRepository>,
}

impl GetGamesUseCase {
    pub fn new(repository: Arc<dyn QuizRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self) -> Result<Vec<Game>, SessionError> {
        Ok(self.repository.list_games().await?)
    }
}
