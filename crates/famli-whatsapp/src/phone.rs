//! Phone number helpers

const WHATSAPP_PREFIX: &str = "whatsapp:";

/// Canonical session key for a number: E.164 with a leading `+`, no
/// `whatsapp:` prefix, no separators.
///
/// `"whatsapp:+55 (11) 99999-0000"` and `"5511999990000"` both become
/// `"+5511999990000"`. Input without digits normalises to `""`.
pub fn normalize(raw: &str) -> String {
    let raw = raw.trim();
    let raw = raw.strip_prefix(WHATSAPP_PREFIX).unwrap_or(raw);

    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return digits;
    }
    format!("+{}", digits)
}

/// Twilio channel address (`whatsapp:+...`) for a number
pub fn whatsapp_address(phone: &str) -> String {
    if phone.starts_with(WHATSAPP_PREFIX) {
        phone.to_string()
    } else {
        format!("{}{}", WHATSAPP_PREFIX, normalize(phone))
    }
}

/// Mask a number for display, keeping the first 3 and last 4 characters.
pub fn mask(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() <= 7 {
        return "*".repeat(chars.len());
    }

    chars
        .iter()
        .enumerate()
        .map(|(i, c)| if i < 3 || i >= chars.len() - 4 { *c } else { '*' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("whatsapp:+5511999990000"), "+5511999990000");
        assert_eq!(normalize(" +55 (11) 99999-0000 "), "+5511999990000");
        assert_eq!(normalize("5511999990000"), "+5511999990000");
        assert_eq!(normalize("55 11 99999-0000"), "+5511999990000");
        assert_eq!(normalize("whatsapp:"), "");
        assert_eq!(normalize("+"), "");
    }

    #[test]
    fn test_whatsapp_address() {
        assert_eq!(whatsapp_address("+5511999990000"), "whatsapp:+5511999990000");
        assert_eq!(whatsapp_address("whatsapp:+1415"), "whatsapp:+1415");
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask("+14155238886"), "+14*****8886");
        assert_eq!(mask("+5511999990000"), "+55*******0000");
        assert_eq!(mask("1234567"), "*******");
        assert_eq!(mask(""), "");
    }
}
