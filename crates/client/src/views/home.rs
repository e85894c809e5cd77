use dioxus::prelude::*;

use crate::Route;

#[component]
pub fn Home() -> Element {
    rsx! {
        section { class: "max-w-3xl mx-auto px-6 py-16",
            h1 { class: "text-4xl font-bold mb-4", "Parcels, delivered." }
            p { class: "text-slate-400 mb-8",
                "Track a shipment, get a quote or book a pickup. Questions? Our assistant is in the corner."
            }
            div { class: "flex gap-4",
                Link {
                    class: "rounded-lg bg-amber-500 text-slate-900 font-semibold px-4 py-2",
                    to: Route::TrackShipment {},
                    "Track a shipment"
                }
                Link {
                    class: "rounded-lg border border-slate-700 px-4 py-2",
                    to: Route::Quote {},
                    "Get a quote"
                }
            }
        }
    }
}
