//! Prometheus counters for HTTP traffic and domain events.

use std::fmt;

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct HttpLabels {
    pub method: String,
    pub status: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Signup,
    PostCreated,
    PostUpdated,
    PostDeleted,
    CommentCreated,
    FollowCreated,
    FollowRemoved,
}

impl Event {
    pub fn as_str(self) -> &'static str {
        match self {
            Event::Signup => "signup",
            Event::PostCreated => "post_created",
            Event::PostUpdated => "post_updated",
            Event::PostDeleted => "post_deleted",
            Event::CommentCreated => "comment_created",
            Event::FollowCreated => "follow_created",
            Event::FollowRemoved => "follow_removed",
        }
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct EventLabels {
    pub event: String,
}

pub struct Metrics {
    registry: Registry,
    requests: Family<HttpLabels, Counter>,
    events: Family<EventLabels, Counter>,
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();
        let requests = Family::<HttpLabels, Counter>::default();
        let events = Family::<EventLabels, Counter>::default();
        registry.register("http_requests", "HTTP requests by method and status", requests.clone());
        registry.register("yatube_events", "Domain events by kind", events.clone());
        Self { registry, requests, events }
    }

    pub fn record_request(&self, method: &str, status: u16) {
        self.requests
            .get_or_create(&HttpLabels { method: method.to_string(), status: status.to_string() })
            .inc();
    }

    pub fn record(&self, event: Event) {
        self.events
            .get_or_create(&EventLabels { event: event.as_str().to_string() })
            .inc();
    }

    /// OpenMetrics text exposition of every registered family.
    pub fn encode(&self) -> Result<String, fmt::Error> {
        let mut body = String::new();
        encode(&mut body, &self.registry)?;
        Ok(body)
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
