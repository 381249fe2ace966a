//! Dashboard-side state for the inventory service.
//!
//! [`FilterStateManager`] owns the active [`FilterState`], debounces edits
//! and drives listing queries through a [`ProductBackend`] (normally the
//! HTTP [`ProductsClient`]). Transient banners live in [`Notifier`].

pub mod api;
pub mod filter_state;
pub mod manager;
pub mod notification;

pub use api::{ClientError, ProductBackend, ProductsClient};
pub use filter_state::{Facet, FilterState};
pub use manager::{FilterStateManager, Listing};
pub use notification::{Notification, NotificationKind, Notifier};
