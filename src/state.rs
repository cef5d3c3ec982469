use std::path::PathBuf;
use std::sync::Arc;
use crate::rate_limit::RateLimiter;
// app's shared state

pub struct AppState {
    pub static_dir: PathBuf,                    // launcher page + assets
    pub rate_limiter: Option<Arc<RateLimiter>>, // None when limiting is off
}
