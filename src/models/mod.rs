// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{RentRange, SignupNotification};
pub use requests::{AddressQuery, SignupRequest, ValuationQuery};
pub use responses::{EmailSentResponse, ErrorResponse};
