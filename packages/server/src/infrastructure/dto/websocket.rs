//! WebSocket event DTOs.
//!
//! すべてのイベントは `{ "eventType": "...", "requestId": "...", ...fields }` 形式。
//! `requestId` はクライアントが付与し、対応するレスポンスでそのまま返す。

use serde::{Deserialize, Serialize};

// ========================================
// Client → Server
// ========================================

/// クライアントから受信するイベント
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "eventType")]
pub enum ClientEvent {
    AdminRequestDto(AdminRequest),
    GetGamesRequestDto(BareRequest),
    JoinGameRequestDto(JoinGameRequest),
    StartGameRequestDto(StartGameRequest),
    AnswerSubmissionDto(AnswerSubmission),
    /// 管理者によるゲームの強制終了
    GameEndedDto(EndGameRequest),
    PlayerDisconnectDto(BareRequest),
    ClientEntersLobbyDto(BareRequest),
}

impl ClientEvent {
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::AdminRequestDto(e) => e.request_id.as_deref(),
            Self::GetGamesRequestDto(e)
            | Self::PlayerDisconnectDto(e)
            | Self::ClientEntersLobbyDto(e) => e.request_id.as_deref(),
            Self::JoinGameRequestDto(e) => e.request_id.as_deref(),
            Self::StartGameRequestDto(e) => e.request_id.as_deref(),
            Self::AnswerSubmissionDto(e) => e.request_id.as_deref(),
            Self::GameEndedDto(e) => e.request_id.as_deref(),
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Self::AdminRequestDto(_) => "AdminRequestDto",
            Self::GetGamesRequestDto(_) => "GetGamesRequestDto",
            Self::JoinGameRequestDto(_) => "JoinGameRequestDto",
            Self::StartGameRequestDto(_) => "StartGameRequestDto",
            Self::AnswerSubmissionDto(_) => "AnswerSubmissionDto",
            Self::GameEndedDto(_) => "GameEndedDto",
            Self::PlayerDisconnectDto(_) => "PlayerDisconnectDto",
            Self::ClientEntersLobbyDto(_) => "ClientEntersLobbyDto",
        }
    }
}

/// フィールドを持たないリクエスト
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BareRequest {
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRequest {
    pub request_id: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGameRequest {
    pub request_id: Option<String>,
    pub game_id: String,
    pub nickname: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartGameRequest {
    pub request_id: Option<String>,
    pub game_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSubmission {
    pub request_id: Option<String>,
    pub question_id: String,
    pub selected_option: String,
    /// 残り秒数（クライアント申告）
    pub time_remaining: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndGameRequest {
    pub request_id: Option<String>,
    pub game_id: String,
}

// ========================================
// Server → Client
// ========================================

/// サーバーから送信するイベント
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "eventType")]
pub enum ServerEvent {
    ClientConnectedDto(ClientConnected),
    AdminResponseDto(AdminResponse),
    GetGamesResponseDto(GetGamesResponse),
    JoinGameResponseDto(ResultResponse),
    GamePlayersUpdateDto(GamePlayersUpdate),
    StartGameResponseDto(ResultResponse),
    PrepareForQuestionDto(PrepareForQuestion),
    QuestionDto(QuestionMessage),
    AnswerResponseDto(AnswerResponse),
    QuestionTimeUpDto(QuestionTimeUp),
    GameCompleteDto(GameComplete),
    GameEndedDto(GameEnded),
    MemberHasLeftDto(MemberHasLeft),
    ServerConfirmsDto(ServerConfirms),
    ServerPutsClientInLobbyAndBroadcastsToEveryoneDto(LobbyUpdate),
    ServerSendsErrorMessageDto(ErrorMessage),
}

impl ServerEvent {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// 成功／失敗を返すレスポンスの失敗版
    pub fn error_for(request_id: Option<String>, message: impl Into<String>) -> Self {
        Self::ServerSendsErrorMessageDto(ErrorMessage {
            request_id,
            error: message.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConnected {
    pub client_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub is_admin: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetGamesResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub games: Vec<GameSummary>,
}

/// `{ success, message }` 形式のレスポンス（参加・開始）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub id: String,
    pub nickname: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GamePlayersUpdate {
    pub game_id: String,
    pub players: Vec<PlayerSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareForQuestion {
    pub seconds_until_question: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionPayload {
    pub option_text: String,
    /// 正解フラグ（解答キー公開時のみ）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionMessage {
    pub id: String,
    pub question_text: String,
    pub options: Vec<OptionPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub is_correct: bool,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionTimeUp {
    pub question_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalScore {
    pub id: String,
    pub nickname: String,
    pub score: u32,
    pub correct_answers: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameComplete {
    pub game_id: String,
    /// スコア降順
    pub players: Vec<FinalScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEnded {
    pub game_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberHasLeft {
    pub member_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfirms {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyUpdate {
    pub all_client_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub error: String,
}
