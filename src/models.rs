use serde::{Deserialize, Serialize};

// Body of GET /api/status. Field order is the wire order.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: String,
    pub mode: String,
    pub version: String,
}

impl StatusResponse {
    // "peer-to-peer" is a label only; the server speaks plain HTTP
    pub fn online() -> Self {
        Self {
            status: "online".to_string(),
            mode: "peer-to-peer".to_string(),
            version: "0.1.0".to_string(),
        }
    }
}
