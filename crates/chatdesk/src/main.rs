//! A terminal front end for the chat widget.

#[macro_use]
extern crate tracing;

use std::env;
use std::io::Write as _;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chatdesk::SessionBuilder;
use chatdesk::core::i18n::Language;
use chatdesk::core::settings::{
    DEFAULT_SETTINGS_FILE, JsonFileSettings, SettingsStore,
};
use chatdesk::core::{
    Attachment, BookingRequest, ConversationStore, CustomerInfo, Feedback,
    QuickReplyAction, Role, StoreChange, Widget, WidgetError,
};
use chatdesk_http_transport::DEFAULT_ENDPOINT;
use indicatif::{ProgressBar, ProgressStyle};
use mime::Mime;
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt};
use tokio::select;
use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const BAR_CHAR: &str = "▎";

const HELP: &str = "\
/quick <n>                 use a suggested reply
/book <date> <time> <n>    book a table for n guests
/info <name> [email] [phone]
/file <path>               send a file
/voice <url>               send a voice message
/good, /bad                rate the last reply
/human                     talk to a human
/lang <en|es|fr|de>        switch language
/call                      show the phone link
/save                      save the settings
/quit";

/// Prints conversation changes as they happen.
struct Printer {
    spinner: Mutex<Option<ProgressBar>>,
    // Bytes of the in-flight message already on screen.
    streamed: Mutex<usize>,
}

impl Printer {
    fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
            streamed: Mutex::new(0),
        }
    }

    fn on_change(&self, store: &ConversationStore, change: StoreChange) {
        match change {
            StoreChange::TypingChanged(true) => self.start_spinner(),
            StoreChange::TypingChanged(false) => self.stop_spinner(),
            StoreChange::Appended(id) => {
                let Some(msg) = store.get(id) else { return };
                match msg.role() {
                    Role::User => {
                        if let Some(attachment) = msg.attachment() {
                            println!(
                                "{}📎 {} ({})",
                                BAR_CHAR.bright_green(),
                                attachment.name,
                                attachment.mime_type
                            );
                        }
                    }
                    Role::Assistant => {
                        self.stop_spinner();
                        print!("{}🤖 ", BAR_CHAR.bright_cyan());
                        if msg.is_finalized() {
                            println!("{}", msg.text().bright_white());
                        } else {
                            self.set_streamed(0);
                            flush();
                        }
                    }
                }
            }
            StoreChange::TextAppended { id, start } => {
                let Some(msg) = store.get(id) else { return };
                print!("{}", (&msg.text()[start..]).bright_white());
                self.set_streamed(msg.text().len());
                flush();
            }
            StoreChange::TextReplaced(id) => {
                let Some(msg) = store.get(id) else { return };
                if msg.is_finalized() {
                    println!("{}🤖 {}", BAR_CHAR.bright_cyan(), msg.text());
                } else {
                    if self.streamed() > 0 {
                        print!("\n{}🤖 ", BAR_CHAR.bright_cyan());
                    }
                    print!("{}", msg.text().bright_red());
                }
            }
            StoreChange::Finalized(_) => {
                self.set_streamed(0);
                println!();
            }
            StoreChange::Discarded(_) => {
                self.set_streamed(0);
                println!("{}", " (cancelled)".dimmed());
            }
            StoreChange::FeedbackChanged(id) => {
                let feedback = store.get(id).and_then(|m| m.feedback());
                if let Some(feedback) = feedback {
                    let text = format!("Feedback saved: {feedback:?}");
                    println!("{}", text.dimmed());
                }
            }
        }
    }

    fn start_spinner(&self) {
        let Ok(mut spinner) = self.spinner.lock() else {
            return;
        };
        let progress_bar = spinner.get_or_insert_with(|| {
            let progress_bar = ProgressBar::new_spinner();
            let style = ProgressStyle::with_template("{spinner} {wide_msg}");
            if let Ok(style) = style {
                progress_bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
            }
            progress_bar.set_message("💬 Typing...");
            progress_bar
        });
        progress_bar.enable_steady_tick(Duration::from_millis(100));
    }

    fn stop_spinner(&self) {
        // Finish the spinner before printing anything else.
        if let Some(progress_bar) =
            self.spinner.lock().ok().and_then(|mut s| s.take())
        {
            progress_bar.finish_and_clear();
        }
    }

    fn streamed(&self) -> usize {
        self.streamed.lock().map(|n| *n).unwrap_or_default()
    }

    fn set_streamed(&self, len: usize) {
        if let Ok(mut streamed) = self.streamed.lock() {
            *streamed = len;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let endpoint = env::var("CHATDESK_ENDPOINT")
        .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_owned());
    let settings = JsonFileSettings::new(
        env::var("CHATDESK_SETTINGS")
            .unwrap_or_else(|_| DEFAULT_SETTINGS_FILE.to_owned()),
    );

    let config = match settings.load_or_default() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("cannot load {}: {err}", settings.path().display());
            return;
        }
    };
    println!(
        "{} {}",
        config.brand_name.bold(),
        config.default_language.strings().support.dimmed()
    );

    let printer = Arc::new(Printer::new());
    let mut builder = SessionBuilder::with_endpoint(endpoint)
        .with_config(config)
        .on_change({
            let printer = Arc::clone(&printer);
            move |store, change| printer.on_change(store, change)
        });
    if let Ok(api_key) = env::var("CHATDESK_API_KEY") {
        builder = builder.with_api_key(api_key);
    }
    let mut widget = match builder.build() {
        Ok(widget) => widget,
        Err(err) => {
            eprintln!("cannot start the widget: {err}");
            return;
        }
    };
    print_quick_replies(&widget);

    loop {
        print!("> ");
        flush();

        let line = select! {
            line = read_line() => line,
            _ = signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };
        let line = line.trim();

        let result = match line.strip_prefix('/') {
            Some(command) => {
                match run_command(&mut widget, &settings, command).await {
                    Ok(true) => continue,
                    Ok(false) => break,
                    Err(err) => Err(err),
                }
            }
            None => {
                let interrupt = Interrupt::on_ctrl_c();
                widget.send_message(line, interrupt.token()).await.map(|_| ())
            }
        };
        if let Err(err) = result {
            println!("{}{}", BAR_CHAR.bright_yellow(), err.bright_yellow());
        }
    }
}

/// Runs a slash command. Returns `Ok(false)` when the user wants to quit.
async fn run_command(
    widget: &mut Widget,
    settings: &JsonFileSettings,
    command: &str,
) -> Result<bool, WidgetError> {
    let mut args = command.split_whitespace();
    let Some(name) = args.next() else {
        println!("{HELP}");
        return Ok(true);
    };

    match name {
        "quit" | "q" => return Ok(false),
        "help" => println!("{HELP}"),
        "quick" => {
            let index = args
                .next()
                .and_then(|n| n.parse::<usize>().ok())
                .and_then(|n| n.checked_sub(1));
            let reply = index.and_then(|i| {
                widget.quick_replies().get(i).map(|r| r.to_string())
            });
            let Some(reply) = reply else {
                print_quick_replies(widget);
                return Ok(true);
            };
            let interrupt = Interrupt::on_ctrl_c();
            let action = widget.quick_reply(&reply, interrupt.token()).await?;
            if action == QuickReplyAction::OpenBookingForm {
                println!("Use /book <date> <time> <guests> [notes]");
            }
        }
        "book" => {
            let (Some(date), Some(time), Some(guests)) =
                (args.next(), args.next(), args.next())
            else {
                println!("Usage: /book <date> <time> <guests> [notes]");
                return Ok(true);
            };
            let booking = BookingRequest {
                date: date.to_owned(),
                time: time.to_owned(),
                guests: guests.parse().unwrap_or(0),
                notes: args.collect::<Vec<_>>().join(" "),
            };
            widget.submit_booking(&booking)?;
        }
        "info" => {
            let info = CustomerInfo {
                name: args.next().unwrap_or_default().to_owned(),
                email: args.next().unwrap_or_default().to_owned(),
                phone: args.next().unwrap_or_default().to_owned(),
            };
            widget.submit_customer_info(info)?;
        }
        "file" => {
            let Some(path) = args.next().map(Path::new) else {
                println!("Usage: /file <path>");
                return Ok(true);
            };
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let attachment = Attachment::new(
                name,
                mime_for(path).essence_str(),
                format!("file://{}", path.display()),
            );
            widget.attach_file(attachment)?;
        }
        "voice" => {
            let Some(url) = args.next() else {
                println!("Usage: /voice <url>");
                return Ok(true);
            };
            widget.attach_voice(url)?;
        }
        "good" | "bad" => {
            let feedback = if name == "good" {
                Feedback::Positive
            } else {
                Feedback::Negative
            };
            let last_reply = widget
                .store()
                .messages()
                .iter()
                .rev()
                .map(|m| m.id())
                .find(|id| widget.is_rateable(*id));
            if let Some(id) = last_reply {
                widget.set_feedback(id, feedback)?;
            }
        }
        "human" => {
            widget.escalate_to_human()?;
        }
        "lang" => {
            match args.next().map(str::parse::<Language>) {
                Some(Ok(language)) => {
                    widget.set_language(language)?;
                    print_quick_replies(widget);
                }
                Some(Err(err)) => println!("{err}"),
                None => println!("Language: {}", widget.language()),
            }
        }
        "call" => println!("{}", widget.call_link().underline()),
        "save" => match settings.save(widget.config()) {
            Ok(()) => println!("Saved to {}", settings.path().display()),
            Err(err) => error!("error saving settings: {err}"),
        },
        _ => println!("Unknown command, try /help"),
    }
    Ok(true)
}

/// Cancels its token when Ctrl-C is pressed, until dropped.
struct Interrupt {
    cancel: CancellationToken,
    watcher: JoinHandle<()>,
}

impl Interrupt {
    fn on_ctrl_c() -> Self {
        let cancel = CancellationToken::new();
        let watcher = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                if signal::ctrl_c().await.is_ok() {
                    debug!("interrupted");
                    cancel.cancel();
                }
            }
        });
        Self { cancel, watcher }
    }

    #[inline]
    fn token(&self) -> &CancellationToken {
        &self.cancel
    }
}

impl Drop for Interrupt {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}

fn print_quick_replies(widget: &Widget) {
    let strings = widget.strings();
    let status = if widget.is_business_open() {
        strings.online.bright_green().to_string()
    } else {
        strings.offline.bright_red().to_string()
    };
    println!("{status}");
    if let Some(notice) = widget.offline_notice() {
        println!(
            "{}{} {}",
            BAR_CHAR.bright_red(),
            notice.title.bold(),
            notice.message
        );
    }
    for (i, reply) in widget.quick_replies().iter().enumerate() {
        println!("  {} {reply}", format!("/quick {}", i + 1).dimmed());
    }
}

fn mime_for(path: &Path) -> Mime {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => mime::IMAGE_PNG,
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "gif" => mime::IMAGE_GIF,
        "pdf" => mime::APPLICATION_PDF,
        "txt" => mime::TEXT_PLAIN,
        "json" => mime::APPLICATION_JSON,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

fn flush() {
    if let Err(err) = std::io::stdout().flush() {
        error!("error flushing stdout: {err}");
    }
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
