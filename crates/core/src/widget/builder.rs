use chatdesk_transport::ChatTransport;

use super::Widget;
use crate::config::WidgetConfig;
use crate::error::WidgetError;
use crate::i18n::Language;
use crate::reply_client::ReplyClient;
use crate::store::{ConversationStore, StoreChange};

type Observer = Box<dyn Fn(&ConversationStore, StoreChange) + Send + Sync>;

/// [`Widget`] builder.
pub struct WidgetBuilder {
    pub(crate) client: ReplyClient,
    pub(crate) config: WidgetConfig,
    pub(crate) language: Option<Language>,
    pub(crate) observer: Option<Observer>,
}

impl WidgetBuilder {
    /// Creates a new builder with the specified transport.
    #[inline]
    pub fn with_transport<T: ChatTransport + 'static>(transport: T) -> Self {
        Self::with_client(ReplyClient::new(transport))
    }

    /// Creates a new builder sharing an existing client.
    #[inline]
    pub fn with_client(client: ReplyClient) -> Self {
        Self {
            client,
            config: WidgetConfig::default(),
            language: None,
            observer: None,
        }
    }

    /// Sets the widget settings.
    #[inline]
    pub fn with_config(mut self, config: WidgetConfig) -> Self {
        self.config = config;
        self
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
        self.observer = Some(Box::new(on_change));
        self
    }

    /// Builds the widget.
    #[inline]
    pub fn build(self) -> Result<Widget, WidgetError> {
        Widget::from_builder(self)
    }
}
