//! Rate-limited HTTP gateway over the fact ledger

mod error;
mod handlers;
mod rate_limit;
mod server;

pub use error::ApiError;
pub use handlers::{
    AppState, BlockView, ChainSlice, HealthResponse, SubmitResponse, ValidateResponse,
};
pub use rate_limit::{RateLimiter, Tier};
pub use server::{build_router, serve};
