use chatdesk_core::config::WidgetConfig;
use chatdesk_core::i18n::Language;
use chatdesk_core::settings::{SettingsError, SettingsStore};
use chatdesk_core::{
    ConversationStore, StoreChange, Widget, WidgetBuilder, WidgetError,
};
use chatdesk_http_transport::{HttpConfigBuilder, HttpTransport};

type Observer = Box<dyn Fn(&ConversationStore, StoreChange) + Send + Sync>;

/// A session builder.
///
/// Assembles a [`Widget`] talking to a chat endpoint over HTTP, with
/// settings loaded from a [`SettingsStore`].
pub struct SessionBuilder {
    http_config: HttpConfigBuilder,
    config: WidgetConfig,
    language: Option<Language>,
    on_change: Option<Observer>,
}

impl SessionBuilder {
    /// Creates a session builder targeting a chat endpoint.
    pub fn with_endpoint<S: Into<String>>(endpoint: S) -> Self {
        Self {
            http_config: HttpConfigBuilder::with_endpoint(endpoint),
            config: WidgetConfig::default(),
            language: None,
            on_change: None,
        }
    }

    /// Sets the bearer token sent to the endpoint.
    #[inline]
    pub fn with_api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.http_config = self.http_config.with_api_key(api_key);
        self
    }

    /// Sets the widget settings.
    #[inline]
    pub fn with_config(mut self, config: WidgetConfig) -> Self {
        self.config = config;
        self
    }

    /// Loads the widget settings from `settings`, keeping the defaults if
    /// nothing was saved yet.
    pub fn with_settings(
        mut self,
        settings: &impl SettingsStore,
    ) -> Result<Self, SettingsError> {
        self.config = settings.load_or_default()?;
        Ok(self)
    }

    /// Overrides the language from the settings.
    #[inline]
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    /// Attaches a callback to be invoked after every conversation change.
    #[inline]
    pub fn on_change(
        mut self,
        on_change: impl Fn(&ConversationStore, StoreChange)
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.on_change = Some(Box::new(on_change));
        self
    }

    /// Builds the widget.
    pub fn build(self) -> Result<Widget, WidgetError> {
        let http_config = self.http_config.build();
        debug!("connecting to {}", http_config.endpoint());

        let transport = HttpTransport::new(http_config);
        let mut builder =
            WidgetBuilder::with_transport(transport).with_config(self.config);
        if let Some(language) = self.language {
            builder = builder.with_language(language);
        }
        if let Some(on_change) = self.on_change {
            builder = builder.on_change(on_change);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use chatdesk_core::settings::JsonFileSettings;

    use super::*;

    #[test]
    fn test_build_from_settings() {
        let dir = tempfile::tempdir().unwrap();
        let settings = JsonFileSettings::new(dir.path().join("settings.json"));
        settings
            .save(&WidgetConfig {
                brand_name: "Café Lumière".to_owned(),
                default_language: Language::Fr,
                ..Default::default()
            })
            .unwrap();

        let widget = SessionBuilder::with_endpoint("http://localhost:9/chat")
            .with_api_key("secret")
            .with_settings(&settings)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(widget.config().brand_name, "Café Lumière");
        assert_eq!(widget.language(), Language::Fr);
    }

    #[test]
    fn test_invalid_hours() {
        let config = WidgetConfig {
            business_hours_open: "soon".to_owned(),
            ..Default::default()
        };
        let result = SessionBuilder::with_endpoint("http://localhost:9/chat")
            .with_config(config)
            .build();
        assert!(matches!(result, Err(WidgetError::InvalidHours(_))));
    }
}
