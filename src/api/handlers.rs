//! HTTP endpoint handlers
//!
//! The gateway composes validation, mining, the chain store, and the
//! attachment store into submit/query operations. The submit path holds an
//! async mutex across {read tail, mine, append} so exactly one submission
//! mines against a given tail; `ChainStore::append`'s staleness check
//! remains as the backstop.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::extract::{ConnectInfo, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use crate::api::error::ApiError;
use crate::api::rate_limit::{RateLimiter, Tier};
use crate::attachments::{AttachmentRef, AttachmentStore};
use crate::config::{epoch_seconds, LedgerConfig};
use crate::crypto::Hash;
use crate::ledger::{Block, Fact};
use crate::mining::MinerPool;
use crate::storage::ChainStore;
use crate::validation::FactValidator;

/// Shared gateway state
pub struct AppState {
    pub config: Arc<LedgerConfig>,
    pub chain: Arc<ChainStore>,
    pub attachments: Arc<AttachmentStore>,
    pub validator: FactValidator,
    pub miner_pool: MinerPool,
    pub limiter: RateLimiter,
    /// Guards the {read tail, mine, append} critical section
    pub submit_lock: Mutex<()>,
}

/// Successful submission response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub block_index: u64,
    pub block_hash: Hash,
    pub nonce: u64,
}

/// A block with its attachments joined in at read time
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockView {
    #[serde(flatten)]
    pub block: Block,
    pub attachments: Vec<AttachmentRef>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainSlice {
    pub blocks: Vec<BlockView>,
    pub count: usize,
    pub total: u64,
}

#[derive(Debug, Deserialize)]
pub struct ChainQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub valid: bool,
    pub block_count: u64,
    pub latest_hash: Option<Hash>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub persistence: &'static str,
    pub blocks: u64,
}

fn client_ip(connect_info: Option<&ConnectInfo<SocketAddr>>) -> IpAddr {
    connect_info
        .map(|ci| ci.0.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

fn view(state: &AppState, block: Block) -> BlockView {
    let attachments = state.attachments.attachments_for(block.index);
    BlockView { block, attachments }
}

/// POST /facts/submit
pub async fn submit_fact(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Json(fact): Json<Fact>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let ip = client_ip(connect_info.as_ref());
    if !state
        .limiter
        .check(ip, Tier::Submit, state.config.submit_per_minute)
    {
        return Err(ApiError::too_many_requests());
    }

    // Validation and mining run under the submit lock so the tail read
    // below stays current until the append lands.
    let _guard = state.submit_lock.lock().await;

    state.validator.validate(&fact, &state.chain)?;

    let previous_hash = state
        .chain
        .latest()
        .map(|b| b.hash)
        .unwrap_or_else(Hash::zero);
    let miner = fact.creator.clone();
    let candidate = Block::candidate(
        state.chain.len(),
        epoch_seconds(),
        fact,
        previous_hash,
        miner,
    );

    let block = state
        .miner_pool
        .mine(candidate, state.config.difficulty)
        .await?;

    let response = SubmitResponse {
        block_index: block.index,
        block_hash: block.hash,
        nonce: block.nonce,
    };
    state.chain.append(block)?;

    info!(index = response.block_index, hash = %response.block_hash, "fact sealed");
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /facts/{index}
pub async fn get_block(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Path(index): Path<u64>,
) -> Result<Json<BlockView>, ApiError> {
    let ip = client_ip(connect_info.as_ref());
    if !state
        .limiter
        .check(ip, Tier::Read, state.config.read_per_minute)
    {
        return Err(ApiError::too_many_requests());
    }

    let block = state
        .chain
        .get(index)
        .ok_or_else(|| ApiError::not_found("no block at that index"))?;
    Ok(Json(view(&state, block)))
}

/// GET /chain?limit=N
pub async fn get_chain(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Query(query): Query<ChainQuery>,
) -> Result<Json<ChainSlice>, ApiError> {
    let ip = client_ip(connect_info.as_ref());
    if !state
        .limiter
        .check(ip, Tier::Read, state.config.read_per_minute)
    {
        return Err(ApiError::too_many_requests());
    }

    let limit = query.limit.unwrap_or(100);
    let blocks: Vec<BlockView> = state
        .chain
        .tail(limit)
        .into_iter()
        .map(|b| view(&state, b))
        .collect();
    let count = blocks.len();
    Ok(Json(ChainSlice {
        blocks,
        count,
        total: state.chain.len(),
    }))
}

/// POST /facts/{index}/multimedia
pub async fn upload_multimedia(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Path(index): Path<u64>,
    mut multipart: Multipart,
) -> Result<Json<AttachmentRef>, ApiError> {
    let ip = client_ip(connect_info.as_ref());
    if !state
        .limiter
        .check(ip, Tier::Upload, state.config.upload_per_minute)
    {
        return Err(ApiError::too_many_requests());
    }

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::bad_request("InvalidUpload", "malformed multipart body"))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let extension = field
            .file_name()
            .and_then(|name| name.rfind('.').map(|dot| name[dot..].to_string()))
            .ok_or_else(|| {
                ApiError::bad_request("InvalidUpload", "file name carries no extension")
            })?;
        let bytes = field
            .bytes()
            .await
            .map_err(|_| ApiError::bad_request("InvalidUpload", "failed to read file bytes"))?;

        let attachment = state
            .attachments
            .attach(&state.chain, index, &bytes, &extension)?;
        return Ok(Json(attachment));
    }

    Err(ApiError::bad_request(
        "InvalidUpload",
        "multipart body carries no 'file' field",
    ))
}

/// GET /validate
pub async fn validate_chain(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
) -> Result<Json<ValidateResponse>, ApiError> {
    let ip = client_ip(connect_info.as_ref());
    if !state
        .limiter
        .check(ip, Tier::Read, state.config.read_per_minute)
    {
        return Err(ApiError::too_many_requests());
    }

    Ok(Json(ValidateResponse {
        valid: state.chain.is_valid(),
        block_count: state.chain.len(),
        latest_hash: state.chain.latest().map(|b| b.hash),
    }))
}

/// GET /health — unlimited
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        persistence: if state.chain.is_persistent() {
            "connected"
        } else {
            "degraded"
        },
        blocks: state.chain.len(),
    })
}
