//! Destination pages for chat actions. Their real forms live in other
//! services; these only anchor the navigation.

use dioxus::prelude::*;

use crate::Route;

#[component]
fn Placeholder(title: String, blurb: String) -> Element {
    rsx! {
        section { class: "max-w-3xl mx-auto px-6 py-16",
            h1 { class: "text-3xl font-bold mb-4", "{title}" }
            p { class: "text-slate-400", "{blurb}" }
        }
    }
}

#[component]
pub fn TrackShipment() -> Element {
    rsx! {
        Placeholder {
            title: "Track shipment",
            blurb: "Enter your tracking number to see where your parcel is.",
        }
    }
}

#[component]
pub fn Quote() -> Element {
    rsx! {
        Placeholder {
            title: "Get a quote",
            blurb: "Tell us the size, weight and destination of your parcel.",
        }
    }
}

#[component]
pub fn SchedulePickup() -> Element {
    rsx! {
        Placeholder {
            title: "Schedule a pickup",
            blurb: "Pick a day and a time window and a driver will come by.",
        }
    }
}

#[component]
pub fn ContactSupport() -> Element {
    rsx! {
        Placeholder {
            title: "Contact support",
            blurb: "Reach a person by phone or email during business hours.",
        }
    }
}

#[component]
pub fn PageNotFound(segments: Vec<String>) -> Element {
    let path = segments.join("/");
    rsx! {
        section { class: "max-w-3xl mx-auto px-6 py-16",
            h1 { class: "text-3xl font-bold mb-4", "Page not found" }
            p { class: "text-slate-400 mb-6", "Nothing lives at /{path}." }
            Link { class: "text-amber-300 hover:underline", to: Route::Home {}, "Back home" }
        }
    }
}
