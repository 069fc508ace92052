pub mod builder;
pub mod listener;
pub mod slow;

pub use listener::{
    EventKind, SegmentEvent, SpanListener, SpanListenerFactory, TopologyAnalysisListener,
    TopologyAnalysisListenerFactory,
};
