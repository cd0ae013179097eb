//! Adapters implementing application ports

mod webcal_feed_adapter;

pub use webcal_feed_adapter::WebcalFeedAdapter;
