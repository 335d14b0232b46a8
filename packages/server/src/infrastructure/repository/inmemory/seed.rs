//! JSON シードの読み込み
//!
//! ```json
//! {
//!   "games": [
//!     {
//!       "id": "g1",
//!       "name": "General Knowledge",
//!       "questions": [
//!         {
//!           "id": "g1-q1",
//!           "text": "2 + 2 = ?",
//!           "options": [
//!             { "text": "3", "isCorrect": false },
//!             { "text": "4", "isCorrect": true }
//!           ]
//!         }
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::{collections::HashSet, path::Path};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{Game, GameId, Question, QuestionId, QuestionOption, ValueObjectError};

/// シード読み込みの失敗
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse seed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid identifier in seed: {0}")]
    InvalidId(#[from] ValueObjectError),
    #[error("Invalid seed: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
struct SeedFile {
    games: Vec<SeedGame>,
}

#[derive(Debug, Deserialize)]
struct SeedGame {
    id: String,
    name: String,
    #[serde(default)]
    questions: Vec<SeedQuestion>,
}

#[derive(Debug, Deserialize)]
struct SeedQuestion {
    id: String,
    text: String,
    options: Vec<SeedOption>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedOption {
    text: String,
    #[serde(default)]
    is_correct: bool,
}

const DEMO_SEED: &str = r#"{
  "games": [
    {
      "id": "general-knowledge",
      "name": "General Knowledge",
      "questions": [
        {
          "id": "general-knowledge-1",
          "text": "What is the capital of Denmark?",
          "options": [
            { "text": "Aarhus", "isCorrect": false },
            { "text": "Copenhagen", "isCorrect": true },
            { "text": "Odense", "isCorrect": false },
            { "text": "Aalborg", "isCorrect": false }
          ]
        },
        {
          "id": "general-knowledge-2",
          "text": "How many continents are there?",
          "options": [
            { "text": "5", "isCorrect": false },
            { "text": "6", "isCorrect": false },
            { "text": "7", "isCorrect": true },
            { "text": "8", "isCorrect": false }
          ]
        },
        {
          "id": "general-knowledge-3",
          "text": "Which planet is known as the Red Planet?",
          "options": [
            { "text": "Venus", "isCorrect": false },
            { "text": "Jupiter", "isCorrect": false },
            { "text": "Mars", "isCorrect": true },
            { "text": "Mercury", "isCorrect": false }
          ]
        }
      ]
    }
  ]
}"#;

/// JSON 文字列からゲームと問題を読み込む
pub fn parse_seed(raw: &str) -> Result<Vec<(Game, Vec<Question>)>, SeedError> {
    let seed: SeedFile = serde_json::from_str(raw)?;

    let mut game_ids = HashSet::new();
    let mut question_ids = HashSet::new();
    let mut games = Vec::with_capacity(seed.games.len());

    for seed_game in seed.games {
        let game_id = GameId::new(seed_game.id)?;
        if !game_ids.insert(game_id.clone()) {
            return Err(SeedError::Invalid(format!("duplicate game id '{game_id}'")));
        }

        let mut questions = Vec::with_capacity(seed_game.questions.len());
        for seed_question in seed_game.questions {
            let question_id = QuestionId::new(seed_question.id)?;
            if !question_ids.insert(question_id.clone()) {
                return Err(SeedError::Invalid(format!(
                    "duplicate question id '{question_id}'"
                )));
            }
            if !seed_question.options.iter().any(|option| option.is_correct) {
                return Err(SeedError::Invalid(format!(
                    "question '{question_id}' has no correct option"
                )));
            }
            let options = seed_question
                .options
                .into_iter()
                .map(|option| QuestionOption::new(option.text, option.is_correct))
                .collect();
            questions.push(Question::new(
                question_id,
                game_id.clone(),
                seed_question.text,
                options,
            ));
        }

        games.push((Game::new(game_id, seed_game.name), questions));
    }

    Ok(games)
}

/// シードファイルを読み込む
pub fn load_seed(path: impl AsRef<Path>) -> Result<Vec<(Game, Vec<Question>)>, SeedError> {
    let raw = std::fs::read_to_string(path)?;
    parse_seed(&raw)
}

/// 組み込みのデモ用ゲーム
pub fn demo_games() -> Result<Vec<(Game, Vec<Question>)>, SeedError> {
    parse_seed(DEMO_SEED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_games_are_valid() {
        // テスト項目: 組み込みのデモ用ゲームが読み込める
        // given (前提条件):

        // when (操作):
        let games = demo_games().unwrap();

        // then (期待する結果):
        assert_eq!(games.len(), 1);
        let (game, questions) = &games[0];
        assert_eq!(game.id.as_str(), "general-knowledge");
        assert_eq!(questions.len(), 3);
        assert!(questions.iter().all(|q| q.game_id == game.id));
    }

    #[test]
    fn test_parse_seed_rejects_duplicate_question_ids() {
        // テスト項目: 問題 ID の重複はエラーになる
        // given (前提条件):
        let raw = r#"{"games":[{"id":"g1","name":"A","questions":[
            {"id":"q","text":"a","options":[{"text":"x","isCorrect":true}]},
            {"id":"q","text":"b","options":[{"text":"y","isCorrect":true}]}
        ]}]}"#;

        // when (操作):
        let result = parse_seed(raw);

        // then (期待する結果):
        assert!(matches!(result, Err(SeedError::Invalid(_))));
    }

    #[test]
    fn test_parse_seed_rejects_question_without_correct_option() {
        // テスト項目: 正解のない問題はエラーになる
        // given (前提条件):
        let raw = r#"{"games":[{"id":"g1","name":"A","questions":[
            {"id":"q","text":"a","options":[{"text":"x"}]}
        ]}]}"#;

        // when (操作):
        let result = parse_seed(raw);

        // then (期待する結果):
        assert!(matches!(result, Err(SeedError::Invalid(_))));
    }

    #[test]
    fn test_parse_seed_rejects_malformed_json() {
        // テスト項目: JSON として不正な入力は Json エラーになる
        // given (前提条件):
        let raw = "{ not json";

        // when (操作):
        let result = parse_seed(raw);

        // then (期待する結果):
        assert!(matches!(result, Err(SeedError::Json(_))));
    }
}
