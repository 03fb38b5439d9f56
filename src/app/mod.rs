//! Listener contract between the port managers and the rest of the
//! firmware.  Managers only ever talk outward through the traits in
//! [`ports`]; [`events`] provides a queueing listener for the main loop.

pub mod events;
pub mod ports;
