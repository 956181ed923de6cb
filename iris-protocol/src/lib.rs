//! Filter wheel serial command protocol
//!
//! This crate defines the ASCII protocol spoken between the host-side
//! device driver and the wheel controller over a serial link.
//!
//! # Protocol Overview
//!
//! Every message is a run of ASCII bytes terminated by a single `#`:
//! ```text
//! host  → wheel   GETFILTER#        query the last known slot
//! host  → wheel   SETFILTER<n>#     move to slot n
//! wheel → host    <position>#       reply to either command
//! ```
//!
//! Commands are case-sensitive and carry no escaping or checksum. Anything
//! that does not match one of the two commands is dropped without a reply.
//! On boot the wheel sends one unsolicited `<position>#` before it starts
//! reading commands.

#![no_std]
#![deny(unsafe_code)]

// proptest needs std on the host
#[cfg(test)]
#[macro_use]
extern crate std;

pub mod command;
pub mod line;
pub mod reply;

pub use command::{Command, CommandError};
pub use line::{Line, LineError, LineParser, DELIMITER, MAX_LINE_LEN};
pub use reply::{Reply, MAX_REPLY_LEN};
