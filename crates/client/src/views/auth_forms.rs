//! Minimal sign-in and sign-up forms.
//!
//! Accounts are owned by another service; these forms only record who the
//! visitor says they are so the chat can tag messages with a user id.

use dioxus::prelude::*;

use crate::auth_session::AuthContext;
use crate::components::ui::Button;
use crate::Route;

#[derive(Clone, Copy, PartialEq, Eq)]
enum FormMode {
    SignIn,
    SignUp,
}

#[component]
pub fn SignIn() -> Element {
    rsx! {
        CredentialsForm { mode: FormMode::SignIn }
    }
}

#[component]
pub fn SignUp() -> Element {
    rsx! {
        CredentialsForm { mode: FormMode::SignUp }
    }
}

/// Validated `(user_id, display_name)` for the entered fields.
fn identity_from_fields(email: &str, name: &str) -> Result<(String, String), &'static str> {
    let email = email.trim().to_lowercase();
    let Some((local, domain)) = email.split_once('@') else {
        return Err("Enter a valid email address");
    };
    if local.is_empty() || domain.is_empty() {
        return Err("Enter a valid email address");
    }

    let name = name.trim();
    let display_name = if name.is_empty() {
        local.to_string()
    } else {
        name.to_string()
    };
    Ok((email, display_name))
}

#[component]
fn CredentialsForm(mode: FormMode) -> Element {
    let mut auth = use_context::<AuthContext>();
    let nav = use_navigator();
    let mut email = use_signal(String::new);
    let mut name = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);

    let (title, submit_label) = match mode {
        FormMode::SignIn => ("Sign in", "Sign in"),
        FormMode::SignUp => ("Create an account", "Sign up"),
    };

    let handle_submit = move |e: FormEvent| {
        e.prevent_default();
        match identity_from_fields(&email.read(), &name.read()) {
            Ok((user_id, display_name)) => {
                auth.sign_in(user_id, display_name);
                nav.push(Route::Home {});
            }
            Err(msg) => error.set(Some(msg.to_string())),
        }
    };

    rsx! {
        section { class: "max-w-sm mx-auto px-6 py-16",
            h1 { class: "text-2xl font-bold mb-6", "{title}" }
            form { onsubmit: handle_submit, class: "flex flex-col gap-4",
                if mode == FormMode::SignUp {
                    input {
                        class: "bg-slate-800 rounded-lg px-3 py-2 outline-none",
                        r#type: "text",
                        placeholder: "Your name",
                        value: "{name}",
                        oninput: move |e: FormEvent| name.set(e.value()),
                    }
                }
                input {
                    class: "bg-slate-800 rounded-lg px-3 py-2 outline-none",
                    r#type: "email",
                    placeholder: "you@example.com",
                    value: "{email}",
                    oninput: move |e: FormEvent| {
                        email.set(e.value());
                        error.set(None);
                    },
                }
                if let Some(msg) = error() {
                    p { class: "text-sm text-red-400", "{msg}" }
                }
                Button { r#type: "submit".to_string(), "{submit_label}" }
            }
            match mode {
                FormMode::SignIn => rsx! {
                    p { class: "mt-4 text-sm text-slate-400",
                        "New here? "
                        Link { class: "text-amber-300 hover:underline", to: Route::SignUp {}, "Create an account" }
                    }
                },
                FormMode::SignUp => rsx! {
                    p { class: "mt-4 text-sm text-slate-400",
                        "Already registered? "
                        Link { class: "text-amber-300 hover:underline", to: Route::SignIn {}, "Sign in" }
                    }
                },
            }
        }
    }
}
