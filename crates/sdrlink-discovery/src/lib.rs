//! sdrlink-discovery: Radio discovery for sdrlink.
//!
//! The [`DiscoveryRegistry`] aggregates advertisements from the
//! independently-enabled discovery sources (LAN broadcast, cloud relay)
//! into one queryable set of targets. [`LanFeed`] is the built-in LAN
//! listener; a cloud relay feed applies the same [`Advertisement`] events
//! from the outside.

pub mod feed;
pub mod registry;

pub use feed::{LanFeed, ADVERTISEMENT_PORT, DEFAULT_STALE_AFTER};
pub use registry::{Advertisement, DiscoveryRegistry};
