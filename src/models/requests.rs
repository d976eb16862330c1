use crate::models::domain::{RentRange, SignupNotification};
use serde::{Deserialize, Serialize};

/// Address fragment to complete
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressQuery {
    pub input: String,
}

/// Query string of `GET /api/rent-zestimate`
///
/// Both parameters are optional; missing ones go to the provider empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValuationQuery {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, rename = "cityStateZip")]
    pub city_state_zip: Option<String>,
}

/// Body of `POST /api/send-email`
///
/// Text fields default to empty so a sparse form still reaches the mailer,
/// which rejects an unusable recipient address on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    #[serde(rename = "firstName", default)]
    pub first_name: String,
    #[serde(rename = "lastName", default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    pub range: RentRange,
    pub rent: f64,
}

impl SignupRequest {
    /// Attach the caller's IP to produce the notification to render
    pub fn into_notification(self, client_ip: Option<String>) -> SignupNotification {
        SignupNotification {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            range: self.range,
            rent: self.rent,
            client_ip,
        }
    }
}
