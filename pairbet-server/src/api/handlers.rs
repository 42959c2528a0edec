use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use bitcoin::{Amount, Denomination};
use pairbet_core::{FundingRef, FundingSummary, ProtocolError, RoomId, RoomStatus, Slot};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::AppState;
use crate::error::ApiError;

pub(super) const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

const TXID_HEX_LEN: usize = 64;

/// Decode a request body. Only JSON objects are accepted.
fn decode<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ApiError::malformed(e.to_string()))?;
    if !value.is_object() {
        return Err(ApiError::malformed("request body must be a JSON object"));
    }
    serde_json::from_value(value).map_err(|e| ApiError::malformed(e.to_string()))
}

fn validate_txid(txid: &str) -> Result<(), ApiError> {
    if txid.len() != TXID_HEX_LEN || hex::decode(txid).is_err() {
        return Err(ApiError::malformed(format!(
            "txid must be {} hex characters",
            TXID_HEX_LEN
        )));
    }
    Ok(())
}

fn validate_hex(hex_tx: &str) -> Result<(), ApiError> {
    if hex_tx.is_empty() || hex::decode(hex_tx).is_err() {
        return Err(ApiError::malformed("hex must be a non-empty hex string"));
    }
    Ok(())
}

fn parse_amount(amount: &str) -> Result<Amount, ApiError> {
    Amount::from_str_in(amount.trim(), Denomination::Bitcoin)
        .map_err(|e| ApiError::malformed(format!("invalid amount '{}': {}", amount, e)))
}

#[derive(Deserialize)]
pub(super) struct JoinRequest {
    secret: String,
    address: String,
}

#[derive(Deserialize)]
pub(super) struct RoomRequest {
    roomid: u64,
}

#[derive(Deserialize)]
pub(super) struct FundingRequest {
    roomid: u64,
    uid: i64,
    txid: String,
    vout: u32,
    amount: String,
}

#[derive(Deserialize)]
pub(super) struct SignRequest {
    roomid: u64,
    hex: String,
}

#[derive(Deserialize)]
pub(super) struct AnnounceRequest {
    roomid: u64,
    uid: i64,
    num: i64,
}

#[derive(Deserialize)]
pub(super) struct BroadcastRequest {
    roomid: Option<u64>,
    hex: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct MessageRequest {
    content: String,
}

#[derive(Serialize)]
pub(super) struct JoinResponse {
    roomid: RoomId,
    uid: Slot,
}

#[derive(Serialize)]
pub(super) struct OkResponse {
    status: &'static str,
}

const OK: OkResponse = OkResponse { status: "ok" };

#[derive(Serialize)]
pub(super) struct SecretEntry {
    uid: Slot,
    secret: String,
    address: String,
}

#[derive(Serialize)]
pub(super) struct SecretsResponse {
    secrets: Vec<SecretEntry>,
}

#[derive(Serialize)]
pub(super) struct FundingInputEntry {
    uid: Slot,
    txid: String,
    vout: u32,
    amount: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FundingSummaryResponse {
    inputs: Vec<FundingInputEntry>,
    change_address: String,
    change: String,
    script_amount: String,
    hex_tx: String,
}

impl From<FundingSummary> for FundingSummaryResponse {
    fn from(summary: FundingSummary) -> Self {
        Self {
            inputs: summary
                .inputs
                .into_iter()
                .map(|input| FundingInputEntry {
                    uid: input.slot,
                    txid: input.txid,
                    vout: input.output_index,
                    amount: input.amount,
                })
                .collect(),
            change_address: summary.change_address,
            change: summary.change,
            script_amount: summary.wager_amount,
            hex_tx: summary.joint_transaction_hex,
        }
    }
}

#[derive(Serialize)]
pub(super) struct NumberEntry {
    uid: Slot,
    num: i64,
}

#[derive(Serialize)]
pub(super) struct NumbersResponse {
    numbers: Vec<NumberEntry>,
}

#[derive(Serialize)]
pub(super) struct ReleaseResponse {
    status: &'static str,
    released: bool,
}

#[derive(Serialize)]
pub(super) struct BroadcastResponse {
    txid: String,
}

#[derive(Serialize)]
pub(super) struct MessageResponse {
    hash: String,
}

#[derive(Serialize)]
pub(super) struct HealthResponse {
    ok: bool,
    rooms: usize,
}

pub(super) async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        rooms: state.rooms.room_count(),
    })
}

pub(super) async fn join(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<JoinResponse>, ApiError> {
    let request: JoinRequest = decode(&body)?;
    let seat = state.rooms.join(request.secret, request.address);
    match seat.slot {
        Slot::Creator => tracing::info!(room = %seat.room, "room created"),
        Slot::Joiner => tracing::info!(room = %seat.room, "room paired"),
    }
    Ok(Json(JoinResponse {
        roomid: seat.room,
        uid: seat.slot,
    }))
}

pub(super) async fn secrets(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SecretsResponse>, ApiError> {
    let request: RoomRequest = decode(&body)?;
    let secrets = state.rooms.secrets(RoomId(request.roomid))?;
    Ok(Json(SecretsResponse {
        secrets: secrets
            .into_iter()
            .map(|s| SecretEntry {
                uid: s.slot,
                secret: s.secret,
                address: s.address,
            })
            .collect(),
    }))
}

pub(super) async fn submit_funding(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<OkResponse>, ApiError> {
    let request: FundingRequest = decode(&body)?;
    validate_txid(&request.txid)?;
    let amount = parse_amount(&request.amount)?;

    let room = RoomId(request.roomid);
    state.rooms.submit_funding(
        room,
        request.uid,
        FundingRef {
            txid: request.txid,
            output_index: request.vout,
            amount,
        },
    )?;
    tracing::info!(%room, uid = request.uid, sats = amount.to_sat(), "funding recorded");
    Ok(Json(OK))
}

pub(super) async fn funding_summary(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<FundingSummaryResponse>, ApiError> {
    let request: RoomRequest = decode(&body)?;
    let summary = state.rooms.funding_summary(RoomId(request.roomid))?;
    Ok(Json(summary.into()))
}

pub(super) async fn sign_transaction(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<OkResponse>, ApiError> {
    let request: SignRequest = decode(&body)?;
    validate_hex(&request.hex)?;

    let room = RoomId(request.roomid);
    state.rooms.record_signed_transaction(room, request.hex)?;
    tracing::info!(%room, "joint transaction recorded");
    Ok(Json(OK))
}

pub(super) async fn announce_number(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<OkResponse>, ApiError> {
    let request: AnnounceRequest = decode(&body)?;
    let room = RoomId(request.roomid);
    state.rooms.announce_number(room, request.uid, request.num)?;
    tracing::info!(%room, uid = request.uid, "number announced");
    Ok(Json(OK))
}

pub(super) async fn reveal_numbers(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<NumbersResponse>, ApiError> {
    let request: RoomRequest = decode(&body)?;
    let room = RoomId(request.roomid);
    let numbers = state.rooms.revealed_numbers(room)?;
    tracing::debug!(%room, "numbers revealed");
    Ok(Json(NumbersResponse {
        numbers: numbers
            .into_iter()
            .map(|n| NumberEntry {
                uid: n.slot,
                num: n.number,
            })
            .collect(),
    }))
}

pub(super) async fn room_status(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RoomStatus>, ApiError> {
    let request: RoomRequest = decode(&body)?;
    Ok(Json(state.rooms.status(RoomId(request.roomid))?))
}

pub(super) async fn release_room(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ReleaseResponse>, ApiError> {
    if let Some(expected) = state.admin_token.as_deref() {
        let presented = headers
            .get(ADMIN_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok());
        if presented != Some(expected) {
            return Err(ApiError::Unauthorized);
        }
    }

    let request: RoomRequest = decode(&body)?;
    let room = RoomId(request.roomid);
    let released = state.rooms.release(room);
    tracing::info!(%room, released, "room release requested");
    Ok(Json(ReleaseResponse {
        status: "ok",
        released,
    }))
}

pub(super) async fn broadcast(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<BroadcastResponse>, ApiError> {
    let request: BroadcastRequest = decode(&body)?;
    let hex_tx = match (request.hex, request.roomid) {
        (Some(hex_tx), _) => hex_tx,
        (None, Some(roomid)) => {
            let room = RoomId(roomid);
            state
                .rooms
                .joint_transaction_hex(room)?
                .ok_or_else(|| ProtocolError::not_ready(room, "broadcast"))?
        }
        (None, None) => return Err(ApiError::malformed("either hex or roomid is required")),
    };
    validate_hex(&hex_tx)?;

    let txid = state.broadcaster.broadcast(&hex_tx).await?;
    Ok(Json(BroadcastResponse { txid }))
}

pub(super) async fn store_message(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let request: MessageRequest = decode(&body)?;
    let hash = state.messages.store(&request.content).await?;
    Ok(Json(MessageResponse { hash }))
}
