/// Format an amount the way the front-end's default (en-US) locale does:
/// comma thousands separators and exactly two decimals.
///
/// ```
/// use rent_gateway::core::currency::format_amount;
/// assert_eq!(format_amount(1500.0), "1,500.00");
/// assert_eq!(format_amount(1234.5), "1,234.50");
/// ```
pub fn format_amount(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-∞" } else { "∞" }.to_string();
    }

    let (whole, fraction) = round_to_cents(&format!("{}", value.abs()));

    // Only keep the sign if something non-zero survives rounding
    let negative = value < 0.0 && whole.bytes().chain(fraction.bytes()).any(|b| b != b'0');

    let mut out = String::with_capacity(whole.len() + whole.len() / 3 + 4);
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(&whole));
    out.push('.');
    out.push_str(&fraction);
    out
}

/// Round a plain decimal string to two places, ties away from zero.
///
/// Works on the shortest decimal form of the float, so `0.125` is seen as a
/// tie rather than as the binary value just below it.
fn round_to_cents(decimal: &str) -> (String, String) {
    let (whole, fraction) = decimal.split_once('.').unwrap_or((decimal, ""));

    let mut digits: Vec<u8> = whole.bytes().chain(fraction.bytes().chain(std::iter::repeat(b'0')).take(2)).collect();
    let round_up = fraction.as_bytes().get(2).is_some_and(|d| *d >= b'5');

    if round_up {
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, b'1');
                break;
            }
            i -= 1;
            if digits[i] == b'9' {
                digits[i] = b'0';
            } else {
                digits[i] += 1;
                break;
            }
        }
    }

    let split = digits.len() - 2;
    let whole = String::from_utf8_lossy(&digits[..split]).into_owned();
    let fraction = String::from_utf8_lossy(&digits[split..]).into_owned();

    (if whole.is_empty() { "0".to_string() } else { whole }, fraction)
}

/// Dollar amount as shown in the signup email, e.g. `$1,500.00`
#[inline]
pub fn format_currency(value: f64) -> String {
    format!("${}", format_amount(value))
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}
