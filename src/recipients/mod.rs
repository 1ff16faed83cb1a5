//! Destination chats.
//!
//! The saved list is a `;`-delimited string under `{namespace}_config`. Every
//! dispatch merges in chats that messaged the bot (`getUpdates`) and saves the
//! result when it grew.

mod list;
mod registry;

pub use list::{Recipient, RecipientList, DELIMITER, UNASSIGNED_TOKEN};
pub use registry::RecipientRegistry;
