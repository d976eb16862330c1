// Rendering helpers for the signup email
pub mod currency;
pub mod template;
pub mod xml;

pub use currency::{format_amount, format_currency};
pub use template::{escape_html, render_signup_email, SIGNUP_SUBJECT};
pub use xml::{xml_to_json, XmlError};
