//! 1 ゲームぶんのセッション状態
//!
//! 問題一覧は開始時に一度だけ読み込み、以後は変えない。
//! スコアの集計はセッションごとに持ち、セッションの破棄と一緒に消える。

use std::{collections::HashMap, time::Duration};

use tokio::sync::Mutex;

use super::timer::PhaseTimer;
use crate::domain::{ClientId, GameId, Nickname, Player, PlayerResult, Question, QuestionId};

/// 正解時の基本点
const BASE_SCORE: u32 = 100;
/// 残り 1 秒あたりのボーナス
const BONUS_PER_SECOND: u32 = 10;

/// フェーズ（添字は問題の位置）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Lobby,
    Preparing(usize),
    Active(usize),
    Revealed(usize),
    Complete,
}

impl Phase {
    pub fn label(&self) -> String {
        match self {
            Self::Lobby => "lobby".to_string(),
            Self::Preparing(index) => format!("preparing({index})"),
            Self::Active(index) => format!("active({index})"),
            Self::Revealed(index) => format!("revealed({index})"),
            Self::Complete => "complete".to_string(),
        }
    }
}

/// 回答の受付結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// 初回の回答として採点した
    Accepted {
        is_correct: bool,
        awarded: u32,
        total: u32,
    },
    /// 同じ問題に回答済み（採点しない、初回の判定を返す）
    Duplicate { is_correct: bool, total: u32 },
    /// その問題は回答受付中ではない
    NotOpen,
    /// セッションのプレイヤーではない
    NotInSession,
}

/// 正解なら基本点に残り時間のボーナスを足す
///
/// 残り時間は `0..=answer_window_secs` に丸める。
pub fn score_for(is_correct: bool, time_remaining: Option<f64>, answer_window_secs: u64) -> u32 {
    if !is_correct {
        return 0;
    }
    let window = answer_window_secs as f64;
    let remaining = time_remaining
        .filter(|seconds| seconds.is_finite())
        .unwrap_or(0.0)
        .clamp(0.0, window)
        .floor() as u32;
    BASE_SCORE + BONUS_PER_SECOND * remaining
}

#[derive(Debug)]
struct Tally {
    nickname: Nickname,
    score: u32,
    correct_answers: u32,
}

#[derive(Debug)]
struct SessionState {
    phase: Phase,
    /// 参加中のプレイヤー
    players: HashMap<ClientId, Tally>,
    /// (player, question) ごとの初回の判定
    answers: HashMap<(ClientId, QuestionId), bool>,
}

#[derive(Debug)]
pub struct GameSession {
    game_id: GameId,
    questions: Vec<Question>,
    answer_window: Duration,
    started_at: i64,
    timer: PhaseTimer,
    state: Mutex<SessionState>,
}

impl GameSession {
    pub fn new(
        game_id: GameId,
        questions: Vec<Question>,
        players: Vec<Player>,
        answer_window: Duration,
        started_at: i64,
    ) -> Self {
        let players = players
            .into_iter()
            .map(|player| {
                (
                    player.id,
                    Tally {
                        nickname: player.nickname,
                        score: 0,
                        correct_answers: 0,
                    },
                )
            })
            .collect();

        Self {
            game_id,
            questions,
            answer_window,
            started_at,
            timer: PhaseTimer::new(),
            state: Mutex::new(SessionState {
                phase: Phase::Lobby,
                players,
                answers: HashMap::new(),
            }),
        }
    }

    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn started_at(&self) -> i64 {
        self.started_at
    }

    pub fn timer(&self) -> &PhaseTimer {
        &self.timer
    }

    pub async fn phase(&self) -> Phase {
        self.state.lock().await.phase
    }

    pub async fn set_phase(&self, phase: Phase) {
        let mut state = self.state.lock().await;
        tracing::debug!(
            "Game '{}': {} -> {}",
            self.game_id,
            state.phase.label(),
            phase.label()
        );
        state.phase = phase;
    }

    /// プレイヤーを追加する（参加済みなら何もしない）
    pub async fn add_player(&self, player: &Player) -> bool {
        let mut state = self.state.lock().await;
        if state.players.contains_key(&player.id) {
            return false;
        }
        state.players.insert(
            player.id.clone(),
            Tally {
                nickname: player.nickname.clone(),
                score: 0,
                correct_answers: 0,
            },
        );
        true
    }

    /// プレイヤーを外し、残りの人数を返す
    pub async fn remove_player(&self, player_id: &ClientId) -> usize {
        let mut state = self.state.lock().await;
        state.players.remove(player_id);
        state.players.len()
    }

    pub async fn player_count(&self) -> usize {
        self.state.lock().await.players.len()
    }

    /// 回答を採点する
    ///
    /// 回答受付中の問題に対する、(player, question) ごとの最初の回答だけが得点になる。
    pub async fn record_answer(
        &self,
        player_id: &ClientId,
        question_id: &QuestionId,
        is_correct: bool,
        time_remaining: Option<f64>,
    ) -> AnswerOutcome {
        let mut state = self.state.lock().await;

        let Phase::Active(index) = state.phase else {
            return AnswerOutcome::NotOpen;
        };
        if self.questions.get(index).map(|q| &q.id) != Some(question_id) {
            return AnswerOutcome::NotOpen;
        }

        let key = (player_id.clone(), question_id.clone());
        if let Some(&first) = state.answers.get(&key) {
            let total = state.players.get(player_id).map_or(0, |tally| tally.score);
            return AnswerOutcome::Duplicate {
                is_correct: first,
                total,
            };
        }

        let awarded = score_for(is_correct, time_remaining, self.answer_window.as_secs());
        let Some(tally) = state.players.get_mut(player_id) else {
            return AnswerOutcome::NotInSession;
        };
        tally.score = tally.score.saturating_add(awarded);
        if is_correct {
            tally.correct_answers += 1;
        }
        let total = tally.score;
        state.answers.insert(key, is_correct);

        AnswerOutcome::Accepted {
            is_correct,
            awarded,
            total,
        }
    }

    /// 最終結果（スコア降順、同点は正解数降順、ニックネーム順）
    pub async fn results(&self) -> Vec<PlayerResult> {
        let state = self.state.lock().await;
        let mut results: Vec<PlayerResult> = state
            .players
            .iter()
            .map(|(id, tally)| PlayerResult {
                player_id: id.clone(),
                nickname: tally.nickname.clone(),
                score: tally.score,
                correct_answers: tally.correct_answers,
            })
            .collect();
        results.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(b.correct_answers.cmp(&a.correct_answers))
                .then_with(|| a.nickname.as_str().cmp(b.nickname.as_str()))
        });
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::QuestionOption;

    fn client(id: &str) -> ClientId {
        ClientId::new(id.to_string()).unwrap()
    }

    fn question_id(id: &str) -> QuestionId {
        QuestionId::new(id.to_string()).unwrap()
    }

    fn session_with(players: &[(&str, &str)]) -> GameSession {
        let game_id = GameId::new("g1".to_string()).unwrap();
        let questions = ["q1", "q2"]
            .iter()
            .map(|id| {
                Question::new(
                    question_id(id),
                    game_id.clone(),
                    format!("question {id}"),
                    vec![QuestionOption::new("yes".to_string(), true)],
                )
            })
            .collect();
        let players = players
            .iter()
            .map(|(id, nickname)| {
                Player::new(
                    client(id),
                    game_id.clone(),
                    Nickname::new(nickname.to_string()).unwrap(),
                    0,
                )
            })
            .collect();
        GameSession::new(game_id, questions, players, Duration::from_secs(10), 0)
    }

    #[test]
    fn test_score_for() {
        // テスト項目: 正解は 100 + 残り秒数 x 10、不正解は 0、残り時間は受付時間内に丸める
        // given (前提条件):
        let window = 10;

        // when (操作):
        let fast = score_for(true, Some(7.9), window);
        let no_time = score_for(true, None, window);
        let overclaimed = score_for(true, Some(999.0), window);
        let negative = score_for(true, Some(-3.0), window);
        let wrong = score_for(false, Some(9.0), window);

        // then (期待する結果):
        assert_eq!(fast, 170);
        assert_eq!(no_time, 100);
        assert_eq!(overclaimed, 200);
        assert_eq!(negative, 100);
        assert_eq!(wrong, 0);
    }

    #[tokio::test]
    async fn test_duplicate_answer_scores_once() {
        // テスト項目: 同じ問題への 2 回目の回答は採点されず、初回の判定が返る
        // given (前提条件):
        let session = session_with(&[("alice", "Alice")]);
        session.set_phase(Phase::Active(0)).await;
        let alice = client("alice");

        // when (操作):
        let first = session.record_answer(&alice, &question_id("q1"), true, Some(5.0)).await;
        let second = session.record_answer(&alice, &question_id("q1"), false, Some(9.0)).await;

        // then (期待する結果):
        assert_eq!(
            first,
            AnswerOutcome::Accepted {
                is_correct: true,
                awarded: 150,
                total: 150,
            }
        );
        assert_eq!(
            second,
            AnswerOutcome::Duplicate {
                is_correct: true,
                total: 150,
            }
        );
    }

    #[tokio::test]
    async fn test_answer_outside_active_phase_is_rejected() {
        // テスト項目: 受付中でない問題への回答は NotOpen
        // given (前提条件):
        let session = session_with(&[("alice", "Alice")]);
        let alice = client("alice");
        session.set_phase(Phase::Revealed(0)).await;

        // when (操作):
        let after_time_up = session.record_answer(&alice, &question_id("q1"), true, None).await;
        session.set_phase(Phase::Active(1)).await;
        let wrong_question = session.record_answer(&alice, &question_id("q1"), true, None).await;

        // then (期待する結果):
        assert_eq!(after_time_up, AnswerOutcome::NotOpen);
        assert_eq!(wrong_question, AnswerOutcome::NotOpen);
    }

    #[tokio::test]
    async fn test_answer_from_outsider_is_rejected() {
        // テスト項目: セッションに参加していないクライアントの回答は NotInSession
        // given (前提条件):
        let session = session_with(&[("alice", "Alice")]);
        session.set_phase(Phase::Active(0)).await;

        // when (操作):
        let outcome = session
            .record_answer(&client("mallory"), &question_id("q1"), true, None)
            .await;

        // then (期待する結果):
        assert_eq!(outcome, AnswerOutcome::NotInSession);
    }

    #[tokio::test]
    async fn test_results_are_ranked_by_score() {
        // テスト項目: 結果はスコア降順で並び、正解数も集計される
        // given (前提条件):
        let session = session_with(&[("alice", "Alice"), ("bob", "Bob"), ("carol", "Carol")]);
        session.set_phase(Phase::Active(0)).await;
        session.record_answer(&client("bob"), &question_id("q1"), true, Some(9.0)).await;
        session.record_answer(&client("alice"), &question_id("q1"), true, Some(1.0)).await;
        session.record_answer(&client("carol"), &question_id("q1"), false, Some(9.0)).await;

        // when (操作):
        let results = session.results().await;

        // then (期待する結果):
        let ranked: Vec<(&str, u32, u32)> = results
            .iter()
            .map(|r| (r.player_id.as_str(), r.score, r.correct_answers))
            .collect();
        assert_eq!(
            ranked,
            vec![("bob", 190, 1), ("alice", 110, 1), ("carol", 0, 0)]
        );
    }

    #[tokio::test]
    async fn test_remove_player_reports_remaining() {
        // テスト項目: プレイヤーを外すと残り人数が返る
        // given (前提条件):
        let session = session_with(&[("alice", "Alice"), ("bob", "Bob")]);

        // when (操作):
        let after_alice = session.remove_player(&client("alice")).await;
        let after_bob = session.remove_player(&client("bob")).await;

        // then (期待する結果):
        assert_eq!(after_alice, 1);
        assert_eq!(after_bob, 0);
        assert_eq!(session.player_count().await, 0);
    }
}
