//! Notification permission nagging.

pub mod nag;

pub use nag::{NagHandle, NagPoller, PermissionProbe};
