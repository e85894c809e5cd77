use dioxus::prelude::*;

use crate::Route;

/// Shown in place of the composer while signed out.
#[component]
pub fn SignInPrompt() -> Element {
    rsx! {
        div { class: "p-4 border-t border-slate-700 text-sm text-slate-300 text-center",
            p { class: "mb-2", "Sign in to chat with our team." }
            div { class: "flex justify-center gap-3",
                Link {
                    class: "text-amber-300 hover:underline",
                    to: Route::SignIn {},
                    "Sign in"
                }
                span { class: "text-slate-500", "or" }
                Link {
                    class: "text-amber-300 hover:underline",
                    to: Route::SignUp {},
                    "Create an account"
                }
            }
        }
    }
}
