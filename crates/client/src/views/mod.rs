//! Pages and the layout around them.

pub mod auth_forms;
pub mod home;
pub mod pages;
pub mod shell;

pub use auth_forms::{SignIn, SignUp};
pub use home::Home;
pub use pages::{ContactSupport, PageNotFound, Quote, SchedulePickup, TrackShipment};
pub use shell::AppShell;
