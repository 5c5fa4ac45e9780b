//! Project editing sessions for the pool quoting core.
//!
//! A [`QuoteSession`] wires the shared catalog, the user's selections,
//! synchronous pricing, and one guarded mutation controller per
//! resource kind. The UI layer talks to it through four inbound
//! operations (`on_selection_changed`, `on_margin_pct_changed`,
//! `request_save`, `confirm_guarded_save`) and observes it through
//! [`SessionEvent`] notifications.

mod observer;
mod session;

pub use observer::{SessionEvent, SubscriberId, Subscribers};
pub use session::QuoteSession;
