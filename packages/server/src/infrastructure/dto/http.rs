//! HTTP API response DTOs.

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSummaryDto {
    pub id: String,
    pub name: String,
}

/// 実行中セッションの概要
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummaryDto {
    pub game_id: String,
    pub phase: String,
    pub players: usize,
    pub started_at: String,
}

/// `/debug/state` のレスポンス
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugStateDto {
    /// client id → connection id
    pub connections: BTreeMap<String, String>,
    /// topic → members
    pub topics: BTreeMap<String, Vec<String>>,
    pub admin: Option<String>,
    pub sessions: Vec<SessionSummaryDto>,
}
