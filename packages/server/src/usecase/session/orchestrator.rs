//! Session Orchestrator 本体

use std::{collections::HashSet, sync::Arc};

use dashmap::{DashMap, mapref::entry::Entry};
use quizhall_shared::time::Clock;
use tokio::task::JoinHandle;

use super::{
    game_session::{AnswerOutcome, GameSession, Phase},
    timer::{PhaseTiming, WaitOutcome},
};
use crate::{
    domain::{ClientId, GameId, MessagePusher, Player, QuestionId, QuizRepository, Topic},
    infrastructure::{
        connection::{ConnectionRegistry, MembershipIndex},
        dto::websocket::{
            GameComplete, GameEnded, MemberHasLeft, PrepareForQuestion, QuestionMessage,
            QuestionTimeUp, ServerEvent,
        },
    },
    usecase::{error::SessionError, notify::broadcast_event},
};

const NO_PLAYERS: &str =
    "No players have joined this game yet. Players must join before the game can start.";

/// 実行中の全ゲームセッションを管理する
pub struct SessionOrchestrator {
    repository: Arc<dyn QuizRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    membership: Arc<MembershipIndex>,
    registry: Arc<ConnectionRegistry>,
    clock: Arc<dyn Clock>,
    timing: PhaseTiming,
    /// 問題の配信に正解フラグを含めるか
    reveal_answer_key: bool,
    /// Key: game id, Value: 実行中のセッション
    sessions: DashMap<GameId, Arc<GameSession>>,
}

impl SessionOrchestrator {
    pub fn new(
        repository: Arc<dyn QuizRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        membership: Arc<MembershipIndex>,
        registry: Arc<ConnectionRegistry>,
        clock: Arc<dyn Clock>,
        timing: PhaseTiming,
        reveal_answer_key: bool,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            membership,
            registry,
            clock,
            timing,
            reveal_answer_key,
            sessions: DashMap::new(),
        }
    }

    pub fn timing(&self) -> PhaseTiming {
        self.timing
    }

    pub fn is_running(&self, game_id: &GameId) -> bool {
        self.sessions.contains_key(game_id)
    }

    /// 実行中セッションのスナップショット
    pub fn sessions(&self) -> Vec<Arc<GameSession>> {
        self.sessions
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    fn session(&self, game_id: &GameId) -> Option<Arc<GameSession>> {
        self.sessions.get(game_id).map(|entry| entry.value().clone())
    }

    /// セッションを作って登録する（フェーズはまだ進めない）
    ///
    /// 開始の応答をリクエスト元へ返してから `launch` すること。
    pub async fn prepare_session(&self, game_id: &GameId) -> Result<Arc<GameSession>, SessionError> {
        if self.is_running(game_id) {
            return Err(SessionError::conflict("Game is already running."));
        }

        let game = self.repository.get_game(game_id).await?;
        let questions = self.repository.get_questions(&game.id).await?;
        if questions.is_empty() {
            return Err(SessionError::not_found("Game has no questions."));
        }

        let session = Arc::new(GameSession::new(
            game.id.clone(),
            questions,
            Vec::new(),
            self.timing.question,
            self.clock.now_millis(),
        ));
        match self.sessions.entry(game.id.clone()) {
            Entry::Occupied(_) => return Err(SessionError::conflict("Game is already running.")),
            Entry::Vacant(entry) => {
                entry.insert(session.clone());
            }
        }

        // 登録後に読み込むので、並行して参加したプレイヤーも取りこぼさない
        let players = match self.repository.players_in_game(&game.id).await {
            Ok(players) => players,
            Err(e) => {
                self.claim(&session);
                return Err(e.into());
            }
        };
        for player in &players {
            session.add_player(player).await;
        }
        if session.player_count().await == 0 {
            self.claim(&session);
            return Err(SessionError::conflict(NO_PLAYERS));
        }

        tracing::info!(
            "Prepared game '{}' ({} questions, {} players)",
            game.id,
            session.questions().len(),
            players.len()
        );
        Ok(session)
    }

    /// フェーズの進行を別タスクで開始する
    pub fn launch(self: &Arc<Self>, session: Arc<GameSession>) -> JoinHandle<()> {
        let orchestrator = self.clone();
        tokio::spawn(async move { orchestrator.run(session).await })
    }

    async fn run(&self, session: Arc<GameSession>) {
        let game_id = session.game_id().clone();
        let topic = Topic::game(&game_id);

        let outcome = self.play_questions(&session, &topic).await;
        session.set_phase(Phase::Complete).await;

        // end_game が先に取り出していれば、後片付けはそちらが済ませている
        if !self.claim(&session) {
            tracing::debug!("Game '{}' was ended externally", game_id);
            return;
        }

        match outcome {
            WaitOutcome::Elapsed => {
                let results = session.results().await;
                tracing::info!("Game '{}' complete ({} players)", game_id, results.len());
                let event = ServerEvent::GameCompleteDto(GameComplete {
                    game_id: game_id.as_str().to_string(),
                    players: results.into_iter().map(Into::into).collect(),
                });
                broadcast_event(self.message_pusher.as_ref(), &topic, &event).await;
            }
            WaitOutcome::Cancelled => {
                tracing::info!("Game '{}' abandoned: no players left", game_id);
                let event = ServerEvent::GameEndedDto(GameEnded {
                    game_id: game_id.as_str().to_string(),
                });
                broadcast_event(self.message_pusher.as_ref(), &topic, &event).await;
            }
        }

        self.teardown(&game_id).await;
    }

    async fn play_questions(&self, session: &GameSession, topic: &Topic) -> WaitOutcome {
        let timer = session.timer();

        for (index, question) in session.questions().iter().enumerate() {
            if timer.is_cancelled() {
                return WaitOutcome::Cancelled;
            }

            session.set_phase(Phase::Preparing(index)).await;
            let event = ServerEvent::PrepareForQuestionDto(PrepareForQuestion {
                seconds_until_question: self.timing.prepare.as_secs(),
            });
            broadcast_event(self.message_pusher.as_ref(), topic, &event).await;
            if timer.wait(self.timing.prepare).await == WaitOutcome::Cancelled {
                return WaitOutcome::Cancelled;
            }

            session.set_phase(Phase::Active(index)).await;
            let event = ServerEvent::QuestionDto(QuestionMessage::from_question(
                question,
                self.reveal_answer_key,
            ));
            broadcast_event(self.message_pusher.as_ref(), topic, &event).await;
            if timer.wait(self.timing.question).await == WaitOutcome::Cancelled {
                return WaitOutcome::Cancelled;
            }

            session.set_phase(Phase::Revealed(index)).await;
            let event = ServerEvent::QuestionTimeUpDto(QuestionTimeUp {
                question_id: question.id.as_str().to_string(),
            });
            broadcast_event(self.message_pusher.as_ref(), topic, &event).await;
            if let Err(e) = self.repository.mark_question_answered(&question.id).await {
                tracing::warn!("Failed to mark question '{}' answered: {}", question.id, e);
            }
            if timer.wait(self.timing.results).await == WaitOutcome::Cancelled {
                return WaitOutcome::Cancelled;
            }
        }

        WaitOutcome::Elapsed
    }

    /// セッションをマップから取り出す。取り出せた 1 者だけが後片付けを行う
    fn claim(&self, session: &Arc<GameSession>) -> bool {
        self.sessions
            .remove_if(session.game_id(), |_, current| Arc::ptr_eq(current, session))
            .is_some()
    }

    /// プレイヤーを削除し、ゲームのトピックを消して、そのメンバーを返す
    async fn teardown(&self, game_id: &GameId) -> HashSet<ClientId> {
        match self.repository.remove_players_in_game(game_id).await {
            Ok(removed) => tracing::debug!("Removed {} players of game '{}'", removed, game_id),
            Err(e) => tracing::warn!("Failed to remove players of game '{}': {}", game_id, e),
        }
        self.membership.remove_topic(&Topic::game(game_id))
    }

    /// 実行中のセッションにプレイヤーを加える（ゲームが動いていなければ何もしない）
    pub async fn add_player(&self, player: &Player) {
        if let Some(session) = self.session(&player.game_id) {
            if session.add_player(player).await {
                tracing::info!("'{}' joined running game '{}'", player.id, player.game_id);
            }
        }
    }

    /// 実行中のセッションからプレイヤーを外す。最後の 1 人ならセッションを中断する
    pub async fn remove_player(&self, game_id: &GameId, player_id: &ClientId) {
        let Some(session) = self.session(game_id) else {
            return;
        };
        if session.remove_player(player_id).await == 0 {
            tracing::info!("Last player left game '{}', cancelling", game_id);
            session.timer().cancel();
        }
    }

    pub async fn record_answer(
        &self,
        game_id: &GameId,
        player_id: &ClientId,
        question_id: &QuestionId,
        is_correct: bool,
        time_remaining: Option<f64>,
    ) -> AnswerOutcome {
        match self.session(game_id) {
            Some(session) => {
                session
                    .record_answer(player_id, question_id, is_correct, time_remaining)
                    .await
            }
            None => AnswerOutcome::NotOpen,
        }
    }

    /// どの状態からでもゲームを即座に終わらせる
    ///
    /// 終了通知をメンバー全員に送り、プレイヤーを削除し、トピックを消して、
    /// メンバーの接続を閉じる。
    pub async fn end_game(&self, game_id: &GameId) -> Result<(), SessionError> {
        match self.sessions.remove(game_id) {
            Some((_, session)) => {
                session.timer().cancel();
                session.set_phase(Phase::Complete).await;
                tracing::info!("Ending running game '{}'", game_id);
            }
            None => {
                self.repository.get_game(game_id).await?;
                tracing::info!("Ending game '{}' (not running)", game_id);
            }
        }

        let event = ServerEvent::GameEndedDto(GameEnded {
            game_id: game_id.as_str().to_string(),
        });
        broadcast_event(self.message_pusher.as_ref(), &Topic::game(game_id), &event).await;

        for member in self.teardown(game_id).await {
            self.disconnect_member(&member).await;
        }
        Ok(())
    }

    async fn disconnect_member(&self, member: &ClientId) {
        let left = self.membership.remove_member_everywhere(member);
        if let Some(handle) = self.registry.evict(member) {
            tracing::info!("Closing connection of '{}'", member);
            handle.close();
        }
        let event = ServerEvent::MemberHasLeftDto(MemberHasLeft {
            member_id: member.as_str().to_string(),
        });
        for topic in left {
            broadcast_event(self.message_pusher.as_ref(), &topic, &event).await;
        }
    }
}
