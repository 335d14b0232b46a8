//! Client event dispatch.
//!
//! 受信したイベントを UseCase に振り分け、応答はリクエスト元の接続にだけ返す。
//! 配信を伴う操作は、応答を返してから配信する。

use crate::{
    domain::ClientId,
    infrastructure::{
        connection::ConnectionHandle,
        dto::websocket::{
            AdminResponse, AnswerResponse, ClientEvent, GetGamesResponse, ResultResponse,
            ServerConfirms, ServerEvent,
        },
    },
    ui::state::AppState,
};

const ADMIN_GRANTED: &str = "You are now the admin.";
const ADMIN_DENIED: &str = "Invalid password.";
const JOINED: &str = "Successfully joined the game.";
const STARTED: &str = "Game started.";
const UNRECOGNIZED: &str = "Unrecognized message.";

/// 接続に 1 件のイベントを送る
pub fn reply(handle: &ConnectionHandle, event: &ServerEvent) {
    match event.to_json() {
        Ok(json) => {
            if let Err(e) = handle.send(&json) {
                tracing::debug!("Reply dropped: {}", e);
            }
        }
        Err(e) => tracing::error!("Failed to serialize reply: {}", e),
    }
}

/// 受信した 1 件のテキストメッセージを処理する
pub async fn dispatch(state: &AppState, handle: &ConnectionHandle, raw: &str) {
    // 置き換え済み・切断済みの接続からのメッセージは処理しない
    let client_id = match state.registry.identity_of(handle.id()) {
        Ok(client_id) => client_id,
        Err(e) => {
            tracing::debug!("Dropping message: {}", e);
            return;
        }
    };

    let event = match serde_json::from_str::<ClientEvent>(raw) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Failed to parse message from '{}': {}", client_id, e);
            reply(handle, &ServerEvent::error_for(None, UNRECOGNIZED));
            return;
        }
    };
    tracing::debug!(
        "'{}' sent {} (request {:?})",
        client_id,
        event.event_type(),
        event.request_id()
    );

    handle_event(state, handle, &client_id, event).await;
}

async fn handle_event(
    state: &AppState,
    handle: &ConnectionHandle,
    client_id: &ClientId,
    event: ClientEvent,
) {
    match event {
        ClientEvent::AdminRequestDto(req) => {
            let is_admin = state
                .elect_admin_usecase
                .execute(client_id, &req.password)
                .await;
            let message = if is_admin { ADMIN_GRANTED } else { ADMIN_DENIED };
            reply(
                handle,
                &ServerEvent::AdminResponseDto(AdminResponse {
                    request_id: req.request_id,
                    is_admin,
                    message: message.to_string(),
                }),
            );
        }
        ClientEvent::GetGamesRequestDto(req) => match state.get_games_usecase.execute().await {
            Ok(games) => reply(
                handle,
                &ServerEvent::GetGamesResponseDto(GetGamesResponse {
                    request_id: req.request_id,
                    games: games.into_iter().map(Into::into).collect(),
                }),
            ),
            Err(e) => reply(handle, &ServerEvent::error_for(req.request_id, e.to_string())),
        },
        ClientEvent::JoinGameRequestDto(req) => {
            match state
                .join_game_usecase
                .execute(client_id, req.game_id, req.nickname)
                .await
            {
                Ok(game_id) => {
                    reply(
                        handle,
                        &ServerEvent::JoinGameResponseDto(ResultResponse {
                            request_id: req.request_id,
                            success: true,
                            message: JOINED.to_string(),
                        }),
                    );
                    state.join_game_usecase.broadcast_players(&game_id).await;
                }
                Err(e) => reply(
                    handle,
                    &ServerEvent::JoinGameResponseDto(ResultResponse {
                        request_id: req.request_id,
                        success: false,
                        message: e.to_string(),
                    }),
                ),
            }
        }
        ClientEvent::StartGameRequestDto(req) => {
            match state
                .start_game_usecase
                .execute(client_id, req.game_id)
                .await
            {
                Ok(session) => {
                    reply(
                        handle,
                        &ServerEvent::StartGameResponseDto(ResultResponse {
                            request_id: req.request_id,
                            success: true,
                            message: STARTED.to_string(),
                        }),
                    );
                    state.start_game_usecase.launch(session);
                }
                Err(e) => reply(
                    handle,
                    &ServerEvent::StartGameResponseDto(ResultResponse {
                        request_id: req.request_id,
                        success: false,
                        message: e.to_string(),
                    }),
                ),
            }
        }
        ClientEvent::AnswerSubmissionDto(req) => {
            match state
                .submit_answer_usecase
                .execute(
                    client_id,
                    req.question_id,
                    req.selected_option,
                    req.time_remaining,
                )
                .await
            {
                Ok(verdict) => reply(
                    handle,
                    &ServerEvent::AnswerResponseDto(AnswerResponse {
                        request_id: req.request_id,
                        is_correct: verdict.is_correct,
                        score: verdict.score,
                    }),
                ),
                Err(e) => reply(handle, &ServerEvent::error_for(req.request_id, e.to_string())),
            }
        }
        ClientEvent::GameEndedDto(req) => {
            if let Err(e) = state
                .end_game_usecase
                .execute(client_id, req.game_id)
                .await
            {
                reply(handle, &ServerEvent::error_for(req.request_id, e.to_string()));
            }
        }
        ClientEvent::PlayerDisconnectDto(_) => {
            state.disconnect_client_usecase.execute(handle.id()).await;
            handle.close();
        }
        ClientEvent::ClientEntersLobbyDto(req) => {
            state.enter_lobby_usecase.execute(client_id);
            reply(
                handle,
                &ServerEvent::ServerConfirmsDto(ServerConfirms {
                    request_id: req.request_id,
                }),
            );
            state.enter_lobby_usecase.broadcast_lobby().await;
        }
    }
}
