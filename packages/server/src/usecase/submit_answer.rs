//! UseCase: 回答の提出
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SubmitAnswerUseCase::execute() メソッド
//! - 採点結果の返却と、初回の回答だけが保存されること
//!
//! ### どのような状況を想定しているか
//! - 正常系：受付中の問題への正解
//! - エッジケース：同じ問題への連続した回答（2 回目は採点も保存もしない）
//! - 異常系：存在しない問題・選択肢、ゲーム未参加

use std::sync::Arc;

use quizhall_shared::time::Clock;

use crate::{
    domain::{ClientId, PlayerAnswer, QuestionId, QuizRepository},
    usecase::{
        error::SessionError,
        session::{AnswerOutcome, SessionOrchestrator},
    },
};

/// リクエスト元に返す採点結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerVerdict {
    pub is_correct: bool,
    /// 累計スコア
    pub score: u32,
}

/// 回答提出のユースケース
pub struct SubmitAnswerUseCase {
    repository: Arc<dyn QuizRepository>,
    orchestrator: Arc<SessionOrchestrator>,
    clock: Arc<dyn Clock>,
}

impl SubmitAnswerUseCase {
    pub fn new(
        repository: Arc<dyn QuizRepository>,
        orchestrator: Arc<SessionOrchestrator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            orchestrator,
            clock,
        }
    }

    pub async fn execute(
        &self,
        client_id: &ClientId,
        question_id: String,
        selected_option: String,
        time_remaining: Option<f64>,
    ) -> Result<AnswerVerdict, SessionError> {
        let question_id =
            QuestionId::new(question_id).map_err(|_| SessionError::not_found("Question not found"))?;

        // 1. 問題と選択肢
        let question = self.repository.get_question(&question_id).await?;
        let is_correct = question
            .option_by_text(&selected_option)
            .map(|option| option.is_correct)
            .ok_or_else(|| SessionError::not_found("Selected option not found"))?;

        // 2. 回答者がそのゲームのプレイヤーか
        let player = self
            .repository
            .find_player(client_id)
            .await?
            .filter(|player| player.game_id == question.game_id)
            .ok_or_else(|| SessionError::not_found("You have not joined this game."))?;

        // 3. 採点（(player, question) ごとに 1 回だけ）
        let outcome = self
            .orchestrator
            .record_answer(
                &player.game_id,
                client_id,
                &question.id,
                is_correct,
                time_remaining,
            )
            .await;

        match outcome {
            AnswerOutcome::Accepted {
                is_correct, total, ..
            } => {
                // 保存は best-effort
                let answer = PlayerAnswer {
                    player_id: client_id.clone(),
                    question_id: question.id.clone(),
                    selected_option,
                    is_correct,
                    answered_at: self.clock.now_millis(),
                };
                if let Err(e) = self.repository.record_answer(answer).await {
                    tracing::warn!("Failed to record answer of '{}': {}", client_id, e);
                }
                if let Err(e) = self.repository.update_player_score(client_id, total).await {
                    tracing::warn!("Failed to save score of '{}': {}", client_id, e);
                }
                Ok(AnswerVerdict {
                    is_correct,
                    score: total,
                })
            }
            AnswerOutcome::Duplicate { is_correct, total } => {
                tracing::debug!(
                    "Duplicate answer from '{}' for question '{}'",
                    client_id,
                    question.id
                );
                Ok(AnswerVerdict {
                    is_correct,
                    score: total,
                })
            }
            AnswerOutcome::NotOpen => Err(SessionError::conflict(
                "This question is not accepting answers.",
            )),
            AnswerOutcome::NotInSession => Err(SessionError::not_found(
                "You are not playing in this game.",
            )),
        }
    }
}
