//! Widget look and behavior settings.

use serde::{Deserialize, Serialize};

use crate::i18n::Language;

/// Which corner of the page the widget sits in.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    /// Bottom right corner.
    #[default]
    BottomRight,
    /// Bottom left corner.
    BottomLeft,
}

/// Settings a business owner can change for their widget.
///
/// Missing fields take their default values when deserializing, so settings
/// saved by older versions keep loading.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WidgetConfig {
    /// Accent color, as a CSS color.
    pub brand_color: String,
    /// Business name shown in the header.
    pub brand_name: String,
    /// URL of the logo shown in the header.
    pub brand_logo: String,
    /// Custom first message. Empty means the localized default.
    pub welcome_message: String,
    /// Where the widget is placed.
    pub position: Position,
    /// Custom suggested replies. Empty means the localized defaults.
    pub quick_replies: Vec<String>,
    /// Whether customers can book a table.
    pub enable_booking: bool,
    /// Whether customers can ask for a human.
    pub enable_escalation: bool,
    /// Whether customers can rate replies.
    pub enable_feedback: bool,
    /// Opening time, e.g. `9:00 AM`.
    pub business_hours_open: String,
    /// Closing time, e.g. `6:00 PM`.
    pub business_hours_close: String,
    /// Phone number for the "call us" action.
    pub phone_number: String,
    /// Language used until the customer picks another one.
    pub default_language: Language,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            brand_color: "#8B5CF6".to_owned(),
            brand_name: "Your Business".to_owned(),
            brand_logo: "/abstract-business-logo.png".to_owned(),
            welcome_message: String::new(),
            position: Position::default(),
            quick_replies: vec![],
            enable_booking: true,
            enable_escalation: true,
            enable_feedback: true,
            business_hours_open: "9:00 AM".to_owned(),
            business_hours_close: "6:00 PM".to_owned(),
            phone_number: "+1 (555) 123-4567".to_owned(),
            default_language: Language::En,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_partial_settings() {
        let config: WidgetConfig = serde_json::from_value(json!({
            "brandName": "Trattoria Roma",
            "position": "bottom-left",
            "enableBooking": false,
            "defaultLanguage": "fr",
        }))
        .unwrap();

        assert_eq!(config.brand_name, "Trattoria Roma");
        assert_eq!(config.position, Position::BottomLeft);
        assert!(!config.enable_booking);
        assert!(config.enable_feedback);
        assert_eq!(config.default_language, Language::Fr);
        assert_eq!(config.business_hours_open, "9:00 AM");
    }

    #[test]
    fn test_field_names() {
        let value = serde_json::to_value(WidgetConfig::default()).unwrap();
        assert_eq!(value["brandColor"], json!("#8B5CF6"));
        assert_eq!(value["position"], json!("bottom-right"));
        assert_eq!(value["businessHoursClose"], json!("6:00 PM"));
        assert_eq!(value["defaultLanguage"], json!("en"));
    }
}
