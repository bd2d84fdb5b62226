//! Localized UI strings.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A language the widget can speak.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English.
    #[default]
    En,
    /// Spanish.
    Es,
    /// French.
    Fr,
    /// German.
    De,
}

impl Language {
    /// All supported languages.
    pub const ALL: [Language; 4] =
        [Language::En, Language::Es, Language::Fr, Language::De];

    /// Returns the two-letter language code.
    #[inline]
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::De => "de",
        }
    }

    /// Returns the UI strings for this language.
    #[inline]
    pub fn strings(self) -> &'static Strings {
        match self {
            Language::En => &EN,
            Language::Es => &ES,
            Language::Fr => &FR,
            Language::De => &DE,
        }
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when parsing an unsupported language code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownLanguage(pub String);

impl Display for UnknownLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported language: {:?}", self.0)
    }
}

impl std::error::Error for UnknownLanguage {}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownLanguage(s.to_owned()))
    }
}

/// The strings shown by the widget in one language.
///
/// Fields ending in `_template` contain `{placeholder}`s, see [`render`].
#[derive(Debug)]
pub struct Strings {
    /// Header title.
    pub support: &'static str,
    /// Status while the business is open.
    pub online: &'static str,
    /// Status while the business is closed.
    pub offline: &'static str,
    /// Header title after escalation.
    pub human_agent: &'static str,
    /// First message of every conversation.
    pub welcome_message: &'static str,
    /// Suggested replies. The first opens the booking form, the second
    /// answers with the business hours.
    pub quick_replies: &'static [&'static str],
    /// Banner title while closed.
    pub offline_title: &'static str,
    /// Banner text while closed, `{open}`.
    pub offline_message_template: &'static str,
    /// Posted when the conversation is handed to a human.
    pub connecting_agent: &'static str,
    /// Posted for every message sent while waiting for a human.
    pub agent_will_respond: &'static str,
    /// Replaces a reply that could not be delivered.
    pub connection_failure: &'static str,
    /// `{open}`, `{close}`.
    pub business_hours_template: &'static str,
    /// Appended to the business hours while open.
    pub currently_open: &'static str,
    /// Appended to the business hours while closed.
    pub currently_closed: &'static str,
    /// `{name}`.
    pub info_saved_template: &'static str,
    /// `{guests}`, `{date}`, `{time}`.
    pub booking_received_template: &'static str,
    /// `{name}`.
    pub file_sent_template: &'static str,
    /// Acknowledges a file.
    pub file_received: &'static str,
    /// Text of a voice message.
    pub voice_sent: &'static str,
    /// Acknowledges a voice message.
    pub voice_received: &'static str,
}

/// Fills `{key}` placeholders in `template`.
///
/// Unknown placeholders are kept as they are. Substituted values are never
/// scanned again.
pub fn render(template: &str, args: &[(&str, &str)]) -> String {
    let mut text = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        text.push_str(&rest[..start]);
        let tail = &rest[start..];
        let value = tail[1..].find('}').and_then(|end| {
            let key = &tail[1..1 + end];
            args.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, value)| (*value, end + 2))
        });
        match value {
            Some((value, len)) => {
                text.push_str(value);
                rest = &tail[len..];
            }
            None => {
                text.push('{');
                rest = &tail[1..];
            }
        }
    }
    text.push_str(rest);
    text
}

static EN: Strings = Strings {
    support: "Support",
    online: "Online now",
    offline: "Offline",
    human_agent: "Human Agent",
    welcome_message: "Hi! How can I help you today?",
    quick_replies: &["Book a Table", "Opening Hours", "Services", "Contact Us"],
    offline_title: "We're currently offline",
    offline_message_template: "We'll get back to you tomorrow at {open}.",
    connecting_agent: "I'm connecting you with a human agent. They'll be with you shortly!",
    agent_will_respond: "A human agent will respond to you shortly. Please hold on.",
    connection_failure: "Sorry, I'm having trouble connecting right now. Please try again.",
    business_hours_template: "Our business hours are {open} to {close}.",
    currently_open: "We're currently open!",
    currently_closed: "We're currently closed.",
    info_saved_template: "Great! I've saved your information. How can I assist you, {name}?",
    booking_received_template: "Perfect! I've received your booking request for {guests} guests on {date} at {time}. We'll send you a confirmation shortly!",
    file_sent_template: "Sent a file: {name}",
    file_received: "Thank you for sharing the file! I've received it and will review it shortly.",
    voice_sent: "Sent a voice message",
    voice_received: "Thank you for your voice message! I've received it and will respond shortly.",
};

static ES: Strings = Strings {
    support: "Soporte",
    online: "En línea ahora",
    offline: "Desconectado",
    human_agent: "Agente Humano",
    welcome_message: "¡Hola! ¿Cómo puedo ayudarte hoy?",
    quick_replies: &["Reservar Mesa", "Horario", "Servicios", "Contacto"],
    offline_title: "Actualmente estamos desconectados",
    offline_message_template: "Te responderemos mañana a las {open}.",
    connecting_agent: "Te estoy conectando con un agente humano. ¡Estarán contigo en breve!",
    agent_will_respond: "Un agente humano te responderá en breve. Por favor espera.",
    connection_failure: "Lo siento, tengo problemas de conexión en este momento. Inténtalo de nuevo.",
    business_hours_template: "Nuestro horario es de {open} a {close}.",
    currently_open: "¡Ahora estamos abiertos!",
    currently_closed: "Ahora estamos cerrados.",
    info_saved_template: "¡Genial! He guardado tu información. ¿Cómo puedo ayudarte, {name}?",
    booking_received_template: "¡Perfecto! He recibido tu solicitud de reserva para {guests} personas el {date} a las {time}. ¡Te enviaremos una confirmación en breve!",
    file_sent_template: "Archivo enviado: {name}",
    file_received: "¡Gracias por compartir el archivo! Lo he recibido y lo revisaré en breve.",
    voice_sent: "Mensaje de voz enviado",
    voice_received: "¡Gracias por tu mensaje de voz! Lo he recibido y responderé en breve.",
};

static FR: Strings = Strings {
    support: "Support",
    online: "En ligne maintenant",
    offline: "Hors ligne",
    human_agent: "Agent Humain",
    welcome_message: "Salut! Comment puis-je vous aider aujourd'hui?",
    quick_replies: &["Réserver Table", "Horaires", "Services", "Contact"],
    offline_title: "Nous sommes actuellement hors ligne",
    offline_message_template: "Nous vous répondrons demain à {open}.",
    connecting_agent: "Je vous connecte avec un agent humain. Ils seront avec vous sous peu!",
    agent_will_respond: "Un agent humain vous répondra sous peu. Veuillez patienter.",
    connection_failure: "Désolé, j'ai du mal à me connecter pour le moment. Veuillez réessayer.",
    business_hours_template: "Nos horaires sont de {open} à {close}.",
    currently_open: "Nous sommes actuellement ouverts!",
    currently_closed: "Nous sommes actuellement fermés.",
    info_saved_template: "Parfait! J'ai enregistré vos informations. Comment puis-je vous aider, {name}?",
    booking_received_template: "Parfait! J'ai bien reçu votre demande de réservation pour {guests} personnes le {date} à {time}. Nous vous enverrons une confirmation sous peu!",
    file_sent_template: "Fichier envoyé : {name}",
    file_received: "Merci pour le fichier! Je l'ai bien reçu et je vais l'examiner sous peu.",
    voice_sent: "Message vocal envoyé",
    voice_received: "Merci pour votre message vocal! Je l'ai bien reçu et vous répondrai sous peu.",
};

static DE: Strings = Strings {
    support: "Support",
    online: "Jetzt online",
    offline: "Offline",
    human_agent: "Menschlicher Agent",
    welcome_message: "Hallo! Wie kann ich Ihnen heute helfen?",
    quick_replies: &["Tisch reservieren", "Öffnungszeiten", "Dienstleistungen", "Kontakt"],
    offline_title: "Wir sind derzeit offline",
    offline_message_template: "Wir melden uns morgen um {open} bei Ihnen.",
    connecting_agent: "Ich verbinde Sie mit einem menschlichen Agenten. Sie werden in Kürze bei Ihnen sein!",
    agent_will_respond: "Ein menschlicher Agent wird Ihnen in Kürze antworten. Bitte warten Sie.",
    connection_failure: "Entschuldigung, ich habe gerade Verbindungsprobleme. Bitte versuchen Sie es erneut.",
    business_hours_template: "Unsere Öffnungszeiten sind von {open} bis {close}.",
    currently_open: "Wir haben gerade geöffnet!",
    currently_closed: "Wir haben gerade geschlossen.",
    info_saved_template: "Super! Ich habe Ihre Daten gespeichert. Wie kann ich Ihnen helfen, {name}?",
    booking_received_template: "Perfekt! Ich habe Ihre Reservierungsanfrage für {guests} Gäste am {date} um {time} erhalten. Sie erhalten in Kürze eine Bestätigung!",
    file_sent_template: "Datei gesendet: {name}",
    file_received: "Danke für die Datei! Ich habe sie erhalten und werde sie in Kürze prüfen.",
    voice_sent: "Sprachnachricht gesendet",
    voice_received: "Danke für Ihre Sprachnachricht! Ich habe sie erhalten und antworte in Kürze.",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language() {
        assert_eq!("es".parse::<Language>(), Ok(Language::Es));
        assert_eq!(" DE ".parse::<Language>(), Ok(Language::De));
        assert_eq!(
            "it".parse::<Language>(),
            Err(UnknownLanguage("it".to_owned()))
        );
        for lang in Language::ALL {
            assert_eq!(lang.to_string().parse::<Language>(), Ok(lang));
        }
    }

    #[test]
    fn test_render() {
        let text = render(
            Language::En.strings().booking_received_template,
            &[("guests", "4"), ("date", "2026-10-20"), ("time", "19:30")],
        );
        assert_eq!(
            text,
            "Perfect! I've received your booking request for 4 guests on \
             2026-10-20 at 19:30. We'll send you a confirmation shortly!"
        );
        assert_eq!(render("{missing}", &[("name", "Ada")]), "{missing}");
        assert_eq!(render("{ {name}}", &[("name", "Ada")]), "{ Ada}");
    }

    #[test]
    fn test_render_values_are_literal() {
        let text = render(
            "{guests} guests on {date} at {time}",
            &[("guests", "2"), ("date", "{time}"), ("time", "19:30")],
        );
        assert_eq!(text, "2 guests on {time} at 19:30");
    }

    #[test]
    fn test_tables_are_complete() {
        for lang in Language::ALL {
            let strings = lang.strings();
            assert_eq!(strings.quick_replies.len(), 4, "{lang}");
            assert!(strings.info_saved_template.contains("{name}"), "{lang}");
            assert!(strings.file_sent_template.contains("{name}"), "{lang}");
            for key in ["{guests}", "{date}", "{time}"] {
                assert!(
                    strings.booking_received_template.contains(key),
                    "{lang}: {key}"
                );
            }
            assert!(
                strings.offline_message_template.contains("{open}"),
                "{lang}"
            );
            for key in ["{open}", "{close}"] {
                assert!(
                    strings.business_hours_template.contains(key),
                    "{lang}: {key}"
                );
            }
        }
    }
}
