use dioxus::prelude::*;

use crate::auth_session::AuthContext;
use crate::components::ui::{Button, ButtonVariant};
use crate::components::ChatWidget;
use crate::Route;

/// Navbar, the routed page, and the chat widget floating over both.
#[component]
pub fn AppShell() -> Element {
    let mut auth = use_context::<AuthContext>();
    let display_name = auth.display_name();

    rsx! {
        div { class: "min-h-screen flex flex-col bg-slate-950 text-slate-100",
            nav { class: "flex items-center justify-between px-6 py-4 bg-slate-900 border-b border-slate-800",
                Link { class: "text-lg font-bold text-amber-400", to: Route::Home {}, "Courier" }
                div { class: "flex items-center gap-4 text-sm",
                    Link { class: "hover:text-amber-300", to: Route::TrackShipment {}, "Track" }
                    Link { class: "hover:text-amber-300", to: Route::Quote {}, "Quote" }
                    Link { class: "hover:text-amber-300", to: Route::SchedulePickup {}, "Pickup" }
                    Link { class: "hover:text-amber-300", to: Route::ContactSupport {}, "Contact" }
                    match display_name {
                        Some(name) => rsx! {
                            span { class: "text-slate-400", "{name}" }
                            Button {
                                variant: ButtonVariant::Subtle,
                                onclick: move |_| auth.sign_out(),
                                "Sign out"
                            }
                        },
                        None => rsx! {
                            Link { class: "text-amber-300 hover:underline", to: Route::SignIn {}, "Sign in" }
                        },
                    }
                }
            }
            main { class: "flex-1",
                Outlet::<Route> {}
            }
            ChatWidget {}
        }
    }
}
