//! Conversion logic from domain entities to DTOs.

use crate::domain::{Game, Player, PlayerResult, Question};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// Domain Entity → DTO
// ========================================

impl From<Game> for dto::GameSummary {
    fn from(model: Game) -> Self {
        Self {
            id: model.id.into_string(),
            name: model.name,
        }
    }
}

impl From<Game> for http::GameSummaryDto {
    fn from(model: Game) -> Self {
        Self {
            id: model.id.into_string(),
            name: model.name,
        }
    }
}

impl From<Player> for dto::PlayerSummary {
    fn from(model: Player) -> Self {
        Self {
            id: model.id.into_string(),
            nickname: model.nickname.into_string(),
        }
    }
}

impl From<PlayerResult> for dto::FinalScore {
    fn from(model: PlayerResult) -> Self {
        Self {
            id: model.player_id.into_string(),
            nickname: model.nickname.into_string(),
            score: model.score,
            correct_answers: model.correct_answers,
        }
    }
}

impl dto::QuestionMessage {
    /// 問題を配信用 DTO に変換する
    ///
    /// `reveal_answer_key` が `false` の場合、選択肢の正解フラグは含めない。
    pub fn from_question(question: &Question, reveal_answer_key: bool) -> Self {
        Self {
            id: question.id.as_str().to_string(),
            question_text: question.text.clone(),
            options: question
                .options
                .iter()
                .map(|option| dto::OptionPayload {
                    option_text: option.text.clone(),
                    is_correct: reveal_answer_key.then_some(option.is_correct),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClientId, GameId, Nickname, QuestionId, QuestionOption};

    fn question() -> Question {
        Question::new(
            QuestionId::new("q1".to_string()).unwrap(),
            GameId::new("g1".to_string()).unwrap(),
            "2 + 2 = ?".to_string(),
            vec![
                QuestionOption::new("3".to_string(), false),
                QuestionOption::new("4".to_string(), true),
            ],
        )
    }

    #[test]
    fn test_question_without_answer_key() {
        // テスト項目: 解答キー非公開なら isCorrect は付かない
        // given (前提条件):
        let question = question();

        // when (操作):
        let dto = dto::QuestionMessage::from_question(&question, false);

        // then (期待する結果):
        assert_eq!(dto.id, "q1");
        assert_eq!(dto.question_text, "2 + 2 = ?");
        assert_eq!(dto.options.len(), 2);
        assert!(dto.options.iter().all(|option| option.is_correct.is_none()));
    }

    #[test]
    fn test_question_with_answer_key() {
        // テスト項目: 解答キー公開なら各選択肢に正解フラグが付く
        // given (前提条件):
        let question = question();

        // when (操作):
        let dto = dto::QuestionMessage::from_question(&question, true);

        // then (期待する結果):
        assert_eq!(dto.options[0].is_correct, Some(false));
        assert_eq!(dto.options[1].is_correct, Some(true));
    }

    #[test]
    fn test_domain_player_result_to_dto() {
        // テスト項目: 集計結果が GameCompleteDto の要素に変換される
        // given (前提条件):
        let result = PlayerResult {
            player_id: ClientId::new("alice".to_string()).unwrap(),
            nickname: Nickname::new("Alice".to_string()).unwrap(),
            score: 180,
            correct_answers: 1,
        };

        // when (操作):
        let dto: dto::FinalScore = result.into();

        // then (期待する結果):
        assert_eq!(dto.id, "alice");
        assert_eq!(dto.nickname, "Alice");
        assert_eq!(dto.score, 180);
        assert_eq!(dto.correct_answers, 1);
    }
}
