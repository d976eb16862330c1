use serde::{Deserialize, Serialize};

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Send email response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailSentResponse {
    #[serde(rename = "messageSuccess")]
    pub message_success: bool,
    #[serde(rename = "messageId")]
    pub message_id: String,
}
