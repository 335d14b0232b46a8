//! ブロードキャスト用の共通処理

use crate::{
    domain::{GameId, MessagePusher, QuizRepository, Topic},
    infrastructure::dto::websocket::{GamePlayersUpdate, ServerEvent},
};

/// イベントを JSON にしてトピックへ配信し、配信できた件数を返す
pub async fn broadcast_event(
    message_pusher: &dyn MessagePusher,
    topic: &Topic,
    event: &ServerEvent,
) -> usize {
    match event.to_json() {
        Ok(json) => message_pusher.broadcast(topic, &json).await,
        Err(e) => {
            tracing::error!("Failed to serialize event for topic '{}': {}", topic, e);
            0
        }
    }
}

/// ゲームの現在のプレイヤー一覧をゲームのトピックへ配信する
pub async fn broadcast_players_update(
    repository: &dyn QuizRepository,
    message_pusher: &dyn MessagePusher,
    game_id: &GameId,
) -> usize {
    let players = match repository.players_in_game(game_id).await {
        Ok(players) => players,
        Err(e) => {
            tracing::warn!("Failed to load players of game '{}': {}", game_id, e);
            return 0;
        }
    };

    let event = ServerEvent::GamePlayersUpdateDto(GamePlayersUpdate {
        game_id: game_id.as_str().to_string(),
        players: players.into_iter().map(Into::into).collect(),
    });
    broadcast_event(message_pusher, &Topic::game(game_id), &event).await
}
