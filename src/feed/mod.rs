//! Flight Position Feed
//!
//! Turns matched topics into [`FlightPositionEvent`]s and keeps a
//! [`FeedSession`] of the latest position per aircraft.

mod error;
mod event;
mod session;

pub use error::{FeedError, FeedResult};
pub use event::{event_handler, FlightPositionEvent};
pub use session::{FeedSession, SessionSummary, TrackedAircraft};
