use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::models::IntentType;

/// Everything except ASCII alphanumerics and `- _ . ! ~ * ' ( )`, i.e. the
/// set escaped by JavaScript's `encodeURIComponent`. Generated payloads have
/// to match what standard code readers expect byte for byte.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WifiSecurity {
    #[serde(rename = "WPA")]
    Wpa,
    #[serde(rename = "WEP")]
    Wep,
    #[serde(rename = "nopass")]
    Nopass,
}

impl WifiSecurity {
    pub fn as_str(&self) -> &'static str {
        match self {
            WifiSecurity::Wpa => "WPA",
            WifiSecurity::Wep => "WEP",
            WifiSecurity::Nopass => "nopass",
        }
    }
}

/// Structured input to the generation path, one variant per generatable
/// category. Location payloads are classifier-only and have no variant here.
///
/// Field contents are not validated; the contract is "format according to
/// the scheme", so malformed input yields a well-formed payload carrying
/// whatever the caller supplied. Wi-Fi and vCard fields are concatenated
/// without escaping `;`, `,` or `\`, matching the wire output this tool has
/// always produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PayloadFields {
    Text {
        text: String,
    },
    Url {
        url: String,
    },
    Email {
        email: String,
        subject: String,
        body: String,
    },
    Phone {
        number: String,
    },
    Sms {
        number: String,
        message: String,
    },
    Wifi {
        ssid: String,
        password: String,
        security: WifiSecurity,
        hidden: bool,
    },
    Contact {
        first_name: String,
        last_name: String,
        phone: String,
        email: String,
        organization: String,
    },
}

impl PayloadFields {
    /// The category a scan of this payload's encoding resolves to.
    pub fn intent(&self) -> IntentType {
        match self {
            PayloadFields::Text { .. } => IntentType::Text,
            PayloadFields::Url { .. } => IntentType::Url,
            PayloadFields::Email { .. } => IntentType::Email,
            PayloadFields::Phone { .. } => IntentType::Phone,
            PayloadFields::Sms { .. } => IntentType::Sms,
            PayloadFields::Wifi { .. } => IntentType::Wifi,
            PayloadFields::Contact { .. } => IntentType::Contact,
        }
    }

    /// Produce the exact wire string handed to the rendering collaborator.
    pub fn encode(&self) -> String {
        match self {
            PayloadFields::Text { text } => text.clone(),
            PayloadFields::Url { url } => {
                if url.starts_with("http") {
                    url.clone()
                } else {
                    format!("https://{url}")
                }
            }
            PayloadFields::Email {
                email,
                subject,
                body,
            } => format!(
                "mailto:{email}?subject={}&body={}",
                encode_component(subject),
                encode_component(body)
            ),
            PayloadFields::Phone { number } => format!("tel:{number}"),
            PayloadFields::Sms { number, message } => {
                format!("sms:{number}?body={}", encode_component(message))
            }
            PayloadFields::Wifi {
                ssid,
                password,
                security,
                hidden,
            } => format!(
                "WIFI:T:{};S:{ssid};P:{password};H:{hidden};;",
                security.as_str()
            ),
            PayloadFields::Contact {
                first_name,
                last_name,
                phone,
                email,
                organization,
            } => format!(
                "BEGIN:VCARD\nVERSION:3.0\nFN:{first_name} {last_name}\nORG:{organization}\nTEL:{phone}\nEMAIL:{email}\nEND:VCARD"
            ),
        }
    }
}
