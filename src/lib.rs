//! # Geofilter
//!
//! Geographic subscriptions for a flight position feed. Rectangles drawn on
//! a map become wildcard topic filters on the broker, so only positions
//! inside (or near) the drawn regions are delivered.
//!
//! ## Modules
//!
//! - [`geometry`]: fixed-point coordinates, rectangles and drawn regions
//! - [`filter`]: precision selection and covering filter generation
//! - [`matcher`]: wildcard filter matching for inbound topics
//! - [`messaging`]: broker client trait, topic router and loopback client
//! - [`sync`]: debounced subscription synchronizer
//! - [`feed`]: flight position events and the per-aircraft session
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use geofilter::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = Arc::new(FeedSession::new());
//!     let sync = Arc::new(SubscriptionSynchronizer::new(
//!         SynchronizerOptions::default(),
//!         GridGenerator::default(),
//!         session.handler(),
//!     ));
//!     sync.clone().start_background_debounce();
//!
//!     let client = Arc::new(LoopbackClient::new());
//!     client.connect().await?;
//!     sync.attach(client.clone()).await;
//!
//!     // Drag a rectangle over Oklahoma
//!     sync.on_regions_changed(vec![DrawnShape::rectangle(35.0, 36.0, -100.0, -99.0)]);
//!     sync.flush().await;
//!
//!     client
//!         .publish("FDPS/position/ID/ACTIVE/UAL1/35.5/-99.5/420/31000/10/20", b"")
//!         .await?;
//!     assert_eq!(session.aircraft_count(), 1);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod feed;
pub mod filter;
pub mod geometry;
pub mod logging;
pub mod matcher;
pub mod messaging;
pub mod sync;

/// Re-exports of commonly used types
pub mod prelude {
    pub use crate::feed::{event_handler, FeedSession, FlightPositionEvent};
    pub use crate::filter::{
        AxisPrecision, CoveringFilters, DecadeLadder, GridGenerator, PrecisionPolicy,
        TopicFilter, TopicLayout,
    };
    pub use crate::geometry::{DrawnShape, Rectangle, Region};
    pub use crate::matcher::{topic_matches, WildcardTranslator};
    pub use crate::messaging::{LoopbackClient, MessageHandler, MessagingClient, TopicRouter};
    pub use crate::sync::{
        RetryPolicy, SubscriptionSynchronizer, SyncPhase, SyncReport, SynchronizerOptions,
    };
}
