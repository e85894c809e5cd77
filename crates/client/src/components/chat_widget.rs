//! Floating support chat.
//!
//! The widget keeps its own local log (welcome line plus everything the user
//! typed) and merges it with the session's remote log on every render.

use chrono::{DateTime, Local};
use dioxus::prelude::*;

use crate::auth_session::AuthContext;
use crate::components::ui::{Button, ButtonVariant};
use crate::components::SignInPrompt;
use crate::model::{Message, MessageAction, MessageOrigin};
use crate::routes::navigate_to_path;
use crate::transcript::{TranscriptEntry, TYPING_INDICATOR_KEY};
use crate::widget::{ChatWidgetState, ComposerMode, SubmitOutcome};
use crate::ws::{use_chat_runtime, use_chat_session};

const MESSAGES_CONTAINER_ID: &str = "chat-messages";

#[component]
pub fn ChatWidget() -> Element {
    let auth = use_context::<AuthContext>();
    let runtime = use_chat_runtime();
    let chat = use_chat_session(auth.user_id());

    let welcome = runtime.config().welcome_message.clone();
    let opened_at = runtime.now_ms();
    let mut widget = use_signal(move || ChatWidgetState::new(&welcome, opened_at));
    let mut draft = use_signal(String::new);
    let mut open = use_signal(|| false);

    let snapshot = chat.snapshot();
    let transcript = widget.read().transcript(
        &snapshot,
        runtime.now_ms(),
        runtime.config().typing_epsilon_ms,
    );
    let composer = ComposerMode::for_auth(auth.status());

    // Keep the newest row in view
    let revision = chat.revision();
    use_effect(move || {
        let _ = revision.read();
        let _ = widget.read();
        if open() {
            scroll_to_bottom();
        }
    });

    let clock = runtime.clock().clone();
    let sender = chat.clone();
    let onsubmit = move |e: FormEvent| {
        e.prevent_default();

        let text = draft.read().clone();
        let outcome = widget
            .write()
            .submit(auth.status(), &text, clock.now_ms(), sender.session());
        if outcome == SubmitOutcome::Sent {
            draft.set(String::new());
        }
    };

    let rows = transcript.into_iter().map(|entry| match entry {
        TranscriptEntry::Message(message) => {
            let key = message.id().to_string();
            rsx! {
                MessageBubble { key: "{key}", message }
            }
        }
        TranscriptEntry::TypingIndicator { .. } => rsx! {
            TypingBubble { key: "{TYPING_INDICATOR_KEY}" }
        },
    });

    let composer_view = match composer {
        ComposerMode::Loading => rsx! {
            div { class: "p-4 border-t border-slate-700 text-sm text-slate-400 text-center",
                "Checking your session..."
            }
        },
        ComposerMode::SignInPrompt => rsx! {
            SignInPrompt {}
        },
        ComposerMode::Input => rsx! {
            form { onsubmit, class: "flex items-center gap-2 p-3 border-t border-slate-700",
                input {
                    class: "flex-1 bg-slate-800 text-slate-100 placeholder-slate-500 rounded-lg px-3 py-2 outline-none",
                    r#type: "text",
                    placeholder: "Ask about a shipment...",
                    value: "{draft}",
                    oninput: move |e: FormEvent| draft.set(e.value()),
                }
                Button {
                    r#type: "submit".to_string(),
                    disabled: draft.read().trim().is_empty(),
                    "Send"
                }
            }
        },
    };

    rsx! {
        div { class: "fixed bottom-4 right-4 z-50 flex flex-col items-end gap-3",
            if open() {
                div { class: "w-80 h-[28rem] flex flex-col bg-slate-900 text-slate-100 rounded-xl shadow-2xl overflow-hidden",
                    div { class: "flex items-center justify-between px-4 py-3 bg-slate-800",
                        div { class: "flex items-center gap-2",
                            span { class: "font-semibold", "Courier assistant" }
                            ConnectionIndicator { connected: snapshot.connected }
                        }
                        Button {
                            variant: ButtonVariant::Subtle,
                            class: "px-2 py-1".to_string(),
                            onclick: move |_| open.set(false),
                            "Close"
                        }
                    }
                    div {
                        id: MESSAGES_CONTAINER_ID,
                        class: "flex-1 overflow-y-auto p-3 space-y-2",
                        {rows}
                    }
                    {composer_view}
                }
            }
            button {
                r#type: "button",
                class: "rounded-full bg-amber-500 text-slate-900 font-semibold px-5 py-3 shadow-lg hover:bg-amber-400",
                onclick: move |_| {
                    let next = !open();
                    open.set(next);
                },
                if open() { "Hide chat" } else { "Chat with us" }
            }
        }
    }
}

#[component]
fn ConnectionIndicator(connected: bool) -> Element {
    let (dot, label) = if connected {
        ("bg-green-500", "Online")
    } else {
        ("bg-slate-500", "Connecting")
    };

    rsx! {
        span { class: "flex items-center gap-1 text-xs text-slate-400",
            span { class: "w-2 h-2 rounded-full {dot}" }
            "{label}"
        }
    }
}

#[component]
fn MessageBubble(message: Message) -> Element {
    let (row, bubble) = match message.origin() {
        MessageOrigin::User => ("justify-end", "bg-amber-500 text-slate-900"),
        MessageOrigin::Remote => ("justify-start", "bg-slate-700 text-slate-100"),
        MessageOrigin::System => ("justify-start", "bg-slate-800 text-slate-300 italic"),
    };
    let text = message.text().to_string();
    let time = format_timestamp(message.timestamp(), Local::now());
    let actions = message.actions().to_vec();

    rsx! {
        div { class: "flex {row}",
            div { class: "max-w-[80%] rounded-lg px-3 py-2 {bubble}",
                p { class: "text-sm whitespace-pre-wrap break-words", "{text}" }
                if !actions.is_empty() {
                    div { class: "flex flex-wrap gap-2 mt-2",
                        for action in actions {
                            ActionButton { action }
                        }
                    }
                }
                span { class: "block text-[10px] opacity-60 mt-1", "{time}" }
            }
        }
    }
}

#[component]
fn ActionButton(action: MessageAction) -> Element {
    let nav = use_navigator();
    let path = action.path.clone();

    rsx! {
        Button {
            variant: ButtonVariant::Action,
            onclick: move |_| {
                navigate_to_path(nav, &path);
            },
            "{action.label}"
        }
    }
}

#[component]
fn TypingBubble() -> Element {
    rsx! {
        div { class: "flex justify-start",
            div { class: "flex gap-1 rounded-lg px-3 py-3 bg-slate-700",
                span { class: "w-2 h-2 rounded-full bg-slate-300 animate-bounce" }
                span { class: "w-2 h-2 rounded-full bg-slate-300 animate-bounce [animation-delay:150ms]" }
                span { class: "w-2 h-2 rounded-full bg-slate-300 animate-bounce [animation-delay:300ms]" }
            }
        }
    }
}

fn scroll_to_bottom() {
    let script = format!(
        "const el = document.getElementById('{MESSAGES_CONTAINER_ID}'); if (el) {{ el.scrollTop = el.scrollHeight; }}"
    );
    let _ = document::eval(&script);
}

/// Human time for a bubble, relative to `now`.
fn format_timestamp(timestamp_ms: i64, now: DateTime<Local>) -> String {
    let Some(dt) = DateTime::from_timestamp_millis(timestamp_ms) else {
        return String::new();
    };
    let local = dt.with_timezone(&Local);
    let today = now.date_naive();
    let msg_date = local.date_naive();
    let yesterday = today.pred_opt().unwrap_or(today);

    let time_str = local.format("%l:%M %p").to_string().trim().to_string();

    if msg_date == today {
        format!("Today at {time_str}")
    } else if msg_date == yesterday {
        format!("Yesterday at {time_str}")
    } else if (today - msg_date).num_days() < 7 {
        format!("{} at {time_str}", local.format("%A"))
    } else {
        local.format("%m/%d/%Y %l:%M %p").to_string().trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn same_day_reads_today() {
        let now = Local::now();
        assert!(format_timestamp(now.timestamp_millis(), now).starts_with("Today at "));
    }

    #[test]
    fn old_messages_show_a_date() {
        let now = Local::now();
        let old = now - Duration::days(30);
        let formatted = format_timestamp(old.timestamp_millis(), now);
        assert!(formatted.contains('/'), "got {formatted}");
    }

    #[test]
    fn out_of_range_timestamp_renders_blank() {
        assert_eq!(format_timestamp(i64::MAX, Local::now()), "");
    }
}
