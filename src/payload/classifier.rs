use crate::models::IntentType;

/// Classify a decoded payload into its semantic category.
///
/// Total over all inputs: anything that matches no rule is `Text`. First
/// match wins. Prefix checks are case-sensitive except for `wifi:`, which is
/// compared case-insensitively so that the uppercase `WIFI:` wire format
/// produced by the encoder classifies correctly.
pub fn classify(data: &str) -> IntentType {
    if data.starts_with("http://") || data.starts_with("https://") {
        IntentType::Url
    } else if data.starts_with("mailto:") {
        IntentType::Email
    } else if data.starts_with("tel:") {
        IntentType::Phone
    } else if data.starts_with("sms:") {
        IntentType::Sms
    } else if has_wifi_prefix(data) {
        IntentType::Wifi
    } else if data.starts_with("geo:") {
        IntentType::Location
    } else if data.contains("BEGIN:VCARD") {
        IntentType::Contact
    } else {
        IntentType::Text
    }
}

fn has_wifi_prefix(data: &str) -> bool {
    data.as_bytes()
        .get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(b"wifi:"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_url_schemes() {
        assert_eq!(classify("http://example.com"), IntentType::Url);
        assert_eq!(classify("https://example.com/path?q=1"), IntentType::Url);
    }

    #[test]
    fn url_prefix_is_case_sensitive() {
        assert_eq!(classify("HTTP://example.com"), IntentType::Text);
    }

    #[test]
    fn recognizes_messaging_schemes() {
        assert_eq!(classify("mailto:a@b.com"), IntentType::Email);
        assert_eq!(classify("tel:+15551234567"), IntentType::Phone);
        assert_eq!(classify("sms:+15551234567?body=hi"), IntentType::Sms);
    }

    #[test]
    fn wifi_prefix_ignores_case() {
        assert_eq!(classify("WIFI:T:WPA;S:Home;P:pw;H:false;;"), IntentType::Wifi);
        assert_eq!(classify("wifi:T:WEP;S:x;P:y;H:true;;"), IntentType::Wifi);
        assert_eq!(classify("WiFi:T:nopass;S:x;P:;H:false;;"), IntentType::Wifi);
    }

    #[test]
    fn recognizes_geo_payloads() {
        assert_eq!(classify("geo:40.7128,-74.0060"), IntentType::Location);
    }

    #[test]
    fn vcard_matches_anywhere_in_the_payload() {
        assert_eq!(classify("BEGIN:VCARD\nFN:Jane\nEND:VCARD"), IntentType::Contact);
        assert_eq!(classify("junk before\nBEGIN:VCARD\nEND:VCARD"), IntentType::Contact);
    }

    #[test]
    fn unrecognized_input_degrades_to_text() {
        assert_eq!(classify(""), IntentType::Text);
        assert_eq!(classify("hello world"), IntentType::Text);
        assert_eq!(classify("ftp://example.com"), IntentType::Text);
    }

    #[test]
    fn classification_is_idempotent() {
        for payload in ["https://a.b", "tel:1", "geo:0,0", "anything"] {
            assert_eq!(classify(payload), classify(payload));
        }
    }
}
