//! # Flowdeck Shell
//!
//! Host shell state for the tabbed workbench: explicit cache ownership,
//! tab lifecycle and a notification stream bridging the synchronous
//! editor callbacks into async consumers.

pub mod notifications;
pub mod workbench;

pub use notifications::{ChannelHost, Notification, NotificationPayload};
pub use workbench::{ShellError, TabDescriptor, TabEditor, Workbench};
