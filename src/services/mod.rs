// Service exports
pub mod mailer;
pub mod places;
pub mod valuation;

pub use mailer::{MailRelay, Mailer, NotificationError, SmtpCredentials, SmtpRelay};
pub use places::{PlacesClient, PlacesError};
pub use valuation::{ValuationClient, ValuationError};
