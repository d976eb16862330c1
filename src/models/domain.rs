use serde::{Deserialize, Serialize};

/// Low/high bounds of the estimated monthly rent
///
/// `low <= high` is expected but not checked; the email shows what it is given.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RentRange {
    pub low: f64,
    pub high: f64,
}

/// Everything the signup confirmation email displays
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupNotification {
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub range: RentRange,
    pub rent: f64,
    #[serde(rename = "clientIP", default)]
    pub client_ip: Option<String>,
}
