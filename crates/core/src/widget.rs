mod builder;

use chatdesk_transport::ChatRequest;
use chrono::{Local, NaiveTime};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::aggregator::{ReplyAggregator, ReplyOutcome};
use crate::config::WidgetConfig;
use crate::error::{Feature, WidgetError};
use crate::hours::BusinessHours;
use crate::i18n::{Language, Strings, render};
use crate::message::{Attachment, Feedback, MessageId, Role};
use crate::store::ConversationStore;
pub use builder::WidgetBuilder;

/// Contact details the customer left in the info form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    /// Customer name. Required.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: String,
}

/// A table booking submitted from the booking form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    /// Requested day, as entered.
    pub date: String,
    /// Requested time, as entered.
    pub time: String,
    /// Party size.
    pub guests: u32,
    /// Free-form notes.
    pub notes: String,
}

/// What happened to a message the customer sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// The backend was asked for a reply.
    Reply(ReplyOutcome),
    /// A human is handling the conversation; only the waiting notice was
    /// posted.
    AgentNotified(MessageId),
}

/// What a quick reply did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuickReplyAction {
    /// The booking form should be shown.
    OpenBookingForm,
    /// The business hours were posted.
    BusinessHours(MessageId),
    /// The reply was sent like a typed message.
    Sent(Option<SendOutcome>),
}

/// The banner shown while the business is closed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OfflineNotice {
    /// Banner title.
    pub title: &'static str,
    /// When the business will answer, with the opening time filled in.
    pub message: String,
}

/// A customer-facing chat widget bound to one conversation.
pub struct Widget {
    config: WidgetConfig,
    hours: BusinessHours,
    language: Language,
    store: ConversationStore,
    aggregator: ReplyAggregator,
    customer: CustomerInfo,
    human_agent: bool,
    welcome_id: MessageId,
}

impl Widget {
    fn from_builder(builder: WidgetBuilder) -> Result<Self, WidgetError> {
        let WidgetBuilder {
            client,
            config,
            language,
            observer,
        } = builder;

        let hours = BusinessHours::parse(
            &config.business_hours_open,
            &config.business_hours_close,
        )?;
        let language = language.unwrap_or(config.default_language);
        let strings = language.strings();

        let mut store = match observer {
            Some(observer) => ConversationStore::with_observer(observer),
            None => ConversationStore::new(),
        };
        let welcome_id = store.push_assistant(welcome_text(&config, strings));
        let aggregator = ReplyAggregator::new(client)
            .with_failure_text(strings.connection_failure);

        debug!("widget ready for {:?} in {language}", config.brand_name);
        Ok(Self {
            config,
            hours,
            language,
            store,
            aggregator,
            customer: CustomerInfo::default(),
            human_agent: false,
            welcome_id,
        })
    }

    /// Sends a typed message and waits for the reply to settle.
    ///
    /// Surrounding whitespace is trimmed and empty input is ignored. The
    /// reply streams into the store; cancelling `cancel` or dropping the
    /// future stops it and removes the partial reply.
    pub async fn send_message(
        &mut self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<SendOutcome>, WidgetError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        self.ensure_idle()?;
        self.store.push_user(text, None);

        if self.human_agent {
            let notice = self.strings().agent_will_respond;
            let id = self.store.push_assistant(notice);
            return Ok(Some(SendOutcome::AgentNotified(id)));
        }

        let mut request = ChatRequest::new(text);
        if !self.customer.name.is_empty() {
            let context = format!("Customer name: {}", self.customer.name);
            request = request.with_context(context);
        }
        let outcome = self
            .aggregator
            .stream_reply(&mut self.store, request, cancel)
            .await?;
        Ok(Some(SendOutcome::Reply(outcome)))
    }

    /// Handles a tap on one of [`quick_replies`](Self::quick_replies).
    pub async fn quick_reply(
        &mut self,
        reply: &str,
        cancel: &CancellationToken,
    ) -> Result<QuickReplyAction, WidgetError> {
        let index = self.quick_replies().iter().position(|r| *r == reply);
        match index {
            Some(0) if self.config.enable_booking => {
                Ok(QuickReplyAction::OpenBookingForm)
            }
            Some(1) => {
                self.ensure_idle()?;
                let text = self.business_hours_text(self.hours.is_open());
                let id = self.store.push_assistant(text);
                Ok(QuickReplyAction::BusinessHours(id))
            }
            _ => Ok(QuickReplyAction::Sent(
                self.send_message(reply, cancel).await?,
            )),
        }
    }

    /// Saves the customer's contact details and confirms them.
    pub fn submit_customer_info(
        &mut self,
        info: CustomerInfo,
    ) -> Result<MessageId, WidgetError> {
        let name = info.name.trim();
        if name.is_empty() {
            return Err(WidgetError::InvalidForm("name is required"));
        }
        self.ensure_idle()?;

        let text =
            render(self.strings().info_saved_template, &[("name", name)]);
        self.customer = CustomerInfo {
            name: name.to_owned(),
            email: info.email.trim().to_owned(),
            phone: info.phone.trim().to_owned(),
        };
        info!("customer identified as {:?}", self.customer.name);
        Ok(self.store.push_assistant(text))
    }

    /// Records a booking request and confirms it.
    pub fn submit_booking(
        &mut self,
        booking: &BookingRequest,
    ) -> Result<MessageId, WidgetError> {
        if !self.config.enable_booking {
            return Err(WidgetError::Disabled(Feature::Booking));
        }
        let date = booking.date.trim();
        let time = booking.time.trim();
        if date.is_empty() || time.is_empty() {
            return Err(WidgetError::InvalidForm("date and time are required"));
        }
        if booking.guests == 0 {
            return Err(WidgetError::InvalidForm(
                "at least one guest is required",
            ));
        }
        self.ensure_idle()?;

        let guests = booking.guests.to_string();
        let text = render(
            self.strings().booking_received_template,
            &[("guests", guests.as_str()), ("date", date), ("time", time)],
        );
        info!("booking for {guests} on {date} at {time}");
        Ok(self.store.push_assistant(text))
    }

    /// Hands the conversation to a human.
    ///
    /// Returns the notice posted on the first call and `None` afterwards.
    pub fn escalate_to_human(
        &mut self,
    ) -> Result<Option<MessageId>, WidgetError> {
        if !self.config.enable_escalation {
            return Err(WidgetError::Disabled(Feature::Escalation));
        }
        if self.human_agent {
            return Ok(None);
        }
        self.ensure_idle()?;

        self.human_agent = true;
        info!("conversation escalated to a human");
        let notice = self.strings().connecting_agent;
        Ok(Some(self.store.push_assistant(notice)))
    }

    /// Sends a file and posts the acknowledgement.
    ///
    /// Returns the ids of the customer's message and of the acknowledgement.
    pub fn attach_file(
        &mut self,
        attachment: Attachment,
    ) -> Result<(MessageId, MessageId), WidgetError> {
        self.ensure_idle()?;
        let strings = self.strings();
        let text = render(
            strings.file_sent_template,
            &[("name", attachment.name.as_str())],
        );
        let sent = self.store.push_user(text, Some(attachment));
        let ack = self.store.push_assistant(strings.file_received);
        Ok((sent, ack))
    }

    /// Sends a recorded voice message and posts the acknowledgement.
    pub fn attach_voice(
        &mut self,
        url: impl Into<String>,
    ) -> Result<(MessageId, MessageId), WidgetError> {
        self.ensure_idle()?;
        let strings = self.strings();
        let attachment =
            Attachment::new("voice-message.webm", "audio/webm", url);
        let sent = self.store.push_user(strings.voice_sent, Some(attachment));
        let ack = self.store.push_assistant(strings.voice_received);
        Ok((sent, ack))
    }

    /// Rates a reply, see [`is_rateable`](Self::is_rateable).
    ///
    /// Returns `false` if the message already had the same rating.
    pub fn set_feedback(
        &mut self,
        id: MessageId,
        feedback: Feedback,
    ) -> Result<bool, WidgetError> {
        if !self.config.enable_feedback {
            return Err(WidgetError::Disabled(Feature::Feedback));
        }
        if self.store.get(id).is_some() && !self.is_rateable(id) {
            return Err(WidgetError::NotRateable(id));
        }
        Ok(self.store.set_feedback(id, feedback)?)
    }

    /// Returns whether `id` is a finished reply the customer may rate.
    ///
    /// The welcome message and the customer's own messages are not rated.
    pub fn is_rateable(&self, id: MessageId) -> bool {
        id != self.welcome_id
            && self.store.get(id).is_some_and(|m| {
                m.role() == Role::Assistant && m.is_finalized()
            })
    }

    /// Switches the language of the widget.
    ///
    /// The welcome message follows unless a custom one is configured.
    /// Messages already exchanged keep their text.
    pub fn set_language(
        &mut self,
        language: Language,
    ) -> Result<(), WidgetError> {
        if language == self.language {
            return Ok(());
        }
        self.language = language;
        let strings = language.strings();
        self.aggregator.set_failure_text(strings.connection_failure);
        if self.config.welcome_message.is_empty() {
            self.store
                .replace_text(self.welcome_id, strings.welcome_message)?;
        }
        debug!("language switched to {language}");
        Ok(())
    }

    /// Returns the `tel:` link for the business phone number.
    pub fn call_link(&self) -> String {
        let number: String = self
            .config
            .phone_number
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        format!("tel:{number}")
    }

    /// Returns the conversation.
    #[inline]
    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Returns the widget settings.
    #[inline]
    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Returns the current language.
    #[inline]
    pub fn language(&self) -> Language {
        self.language
    }

    /// Returns the strings for the current language.
    #[inline]
    pub fn strings(&self) -> &'static Strings {
        self.language.strings()
    }

    /// Returns the suggested replies, custom ones first.
    pub fn quick_replies(&self) -> Vec<&str> {
        if self.config.quick_replies.is_empty() {
            self.strings().quick_replies.to_vec()
        } else {
            self.config.quick_replies.iter().map(String::as_str).collect()
        }
    }

    /// Returns whether a human is handling the conversation.
    #[inline]
    pub fn is_human_agent(&self) -> bool {
        self.human_agent
    }

    /// Returns the contact details left by the customer.
    #[inline]
    pub fn customer(&self) -> &CustomerInfo {
        &self.customer
    }

    /// Returns whether the business is open right now.
    #[inline]
    pub fn is_business_open(&self) -> bool {
        self.hours.is_open()
    }

    /// Returns whether the business is open at `time`.
    #[inline]
    pub fn is_business_open_at(&self, time: NaiveTime) -> bool {
        self.hours.is_open_at(time)
    }

    /// Returns the offline banner, or `None` while the business is open.
    #[inline]
    pub fn offline_notice(&self) -> Option<OfflineNotice> {
        self.offline_notice_at(Local::now().time())
    }

    /// Returns the offline banner as it would be shown at `time`.
    pub fn offline_notice_at(&self, time: NaiveTime) -> Option<OfflineNotice> {
        if self.hours.is_open_at(time) {
            return None;
        }
        let strings = self.strings();
        Some(OfflineNotice {
            title: strings.offline_title,
            message: render(
                strings.offline_message_template,
                &[("open", self.config.business_hours_open.as_str())],
            ),
        })
    }

    fn business_hours_text(&self, open_now: bool) -> String {
        let strings = self.strings();
        let hours = render(
            strings.business_hours_template,
            &[
                ("open", self.config.business_hours_open.as_str()),
                ("close", self.config.business_hours_close.as_str()),
            ],
        );
        let status = if open_now {
            strings.currently_open
        } else {
            strings.currently_closed
        };
        format!("{hours} {status}")
    }

    fn ensure_idle(&self) -> Result<(), WidgetError> {
        match self.store.in_flight() {
            Some(_) => Err(WidgetError::Busy),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for Widget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Widget")
            .field("brand_name", &self.config.brand_name)
            .field("language", &self.language)
            .field("human_agent", &self.human_agent)
            .field("messages", &self.store.len())
            .finish_non_exhaustive()
    }
}

fn welcome_text(config: &WidgetConfig, strings: &Strings) -> String {
    if config.welcome_message.is_empty() {
        strings.welcome_message.to_owned()
    } else {
        config.welcome_message.clone()
    }
}
