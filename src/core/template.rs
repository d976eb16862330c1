use crate::core::currency::format_currency;
use crate::models::SignupNotification;
use std::fmt::Write;

/// Subject line of the signup confirmation
pub const SIGNUP_SUBJECT: &str = "Thank you for signing up!";

/// Render the HTML body of the signup confirmation email
///
/// Pure function of the notification: no I/O, no clock. User supplied text is
/// HTML escaped; amounts go through [`format_currency`].
pub fn render_signup_email(notification: &SignupNotification) -> String {
    let first_name = escape_html(&notification.first_name);
    let client_ip = notification.client_ip.as_deref().unwrap_or("");

    let mut html = String::with_capacity(2048);

    // Writing into a String cannot fail
    let _ = write!(
        html,
        "<div>\n\
         <p>Congratulations {first_name}!</p>\n\
         <p>You have successfully signed up.  Below are the details you have provided</p>\n\
         <br />\n\
         <table style='background-color: #FAEBD7; box-shadow: 10px 10px 5px grey;'>\n"
    );

    section_header(&mut html, "Personal Data");
    row(&mut html, "First Name:", &first_name);
    row(&mut html, "Last Name:", &escape_html(&notification.last_name));
    row(&mut html, "Email:", &escape_html(&notification.email));
    row(&mut html, "Phone:", &escape_html(&notification.phone));

    section_header(&mut html, "Rent Valuation Range");
    row(&mut html, "Address:", &escape_html(&notification.address));
    let _ = write!(
        html,
        "<tr>\n\
         <td>Low:</td>\n\
         <td style='padding: 0'>{low}</td>\n\
         <td>High:</td>\n\
         <td style='padding: 0'>{high}</td>\n\
         </tr>\n",
        low = format_currency(notification.range.low),
        high = format_currency(notification.range.high),
    );
    row(&mut html, "Expected Rent:", &format_currency(notification.rent));
    row(&mut html, "IP Address:", &escape_html(client_ip));

    html.push_str("</table>\n</div>");
    html
}

fn section_header(html: &mut String, title: &str) {
    let _ = write!(
        html,
        "<tr>\n<th colspan='2' style='text-decoration: underline;'>{title}</th>\n</tr>\n"
    );
}

fn row(html: &mut String, label: &str, value: &str) {
    let _ = write!(html, "<tr>\n<td>{label}</td>\n<td>{value}</td>\n</tr>\n");
}

/// Escape the five characters that matter inside HTML text and attributes
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
