use serde::{Deserialize, Serialize};

/// Semantic category of a scanned or generated payload.
///
/// The set is closed: every switch over it must be exhaustive so that adding
/// a category is a compile error at each place that has to handle it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum IntentType {
    Text,
    #[serde(rename = "URL")]
    Url,
    Email,
    Phone,
    #[serde(rename = "SMS")]
    Sms,
    #[serde(rename = "WiFi")]
    Wifi,
    Contact,
    Location,
}

impl IntentType {
    pub const ALL: [IntentType; 8] = [
        IntentType::Text,
        IntentType::Url,
        IntentType::Email,
        IntentType::Phone,
        IntentType::Sms,
        IntentType::Wifi,
        IntentType::Contact,
        IntentType::Location,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntentType::Text => "Text",
            IntentType::Url => "URL",
            IntentType::Email => "Email",
            IntentType::Phone => "Phone",
            IntentType::Sms => "SMS",
            IntentType::Wifi => "WiFi",
            IntentType::Contact => "Contact",
            IntentType::Location => "Location",
        }
    }
}

/// One persisted record of a successfully classified scan.
///
/// Immutable once created; `intent` is assigned at classification time and
/// read back everywhere else, never re-derived from `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanEvent {
    pub id: String,
    pub data: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub intent: IntentType,
    pub format: String,
}
