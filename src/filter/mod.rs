//! Ignore predicates.
//!
//! # Responsibilities
//! - Decide whether a request (path, route tags) is ignored
//! - Decide whether a generic event (channel, tags) is ignored
//!
//! # Design Decisions
//! - Built once at registration, pure afterwards
//! - Empty ignore lists collapse to a `Never` variant with no sets
//! - `ignore_tags` feeds both predicates

use std::collections::HashSet;

fn to_set(values: &[String]) -> HashSet<String> {
    values.iter().cloned().collect()
}

fn intersects<'a, I>(set: &HashSet<String>, values: I) -> bool
where
    I: IntoIterator<Item = &'a String>,
{
    !set.is_empty() && values.into_iter().any(|value| set.contains(value))
}

/// Request predicate: ignored path, or a route tag in the ignored tags.
#[derive(Debug, Clone)]
pub enum RequestFilter {
    Never,
    Match {
        paths: HashSet<String>,
        tags: HashSet<String>,
    },
}

impl RequestFilter {
    pub fn new(paths: &[String], tags: &[String]) -> Self {
        if paths.is_empty() && tags.is_empty() {
            return RequestFilter::Never;
        }

        RequestFilter::Match {
            paths: to_set(paths),
            tags: to_set(tags),
        }
    }

    pub fn ignores(&self, path: &str, route_tags: &[String]) -> bool {
        match self {
            RequestFilter::Never => false,
            RequestFilter::Match { paths, tags } => {
                paths.contains(path) || intersects(tags, route_tags)
            }
        }
    }
}

/// Event predicate: ignored channel, or an event tag in the ignored tags.
#[derive(Debug, Clone)]
pub enum EventFilter {
    Never,
    Match {
        channels: HashSet<String>,
        tags: HashSet<String>,
    },
}

impl EventFilter {
    pub fn new(channels: &[String], tags: &[String]) -> Self {
        if channels.is_empty() && tags.is_empty() {
            return EventFilter::Never;
        }

        EventFilter::Match {
            channels: to_set(channels),
            tags: to_set(tags),
        }
    }

    pub fn ignores(&self, channel: &str, event_tags: &[String]) -> bool {
        match self {
            EventFilter::Never => false,
            EventFilter::Match { channels, tags } => {
                channels.contains(channel) || intersects(tags, event_tags)
            }
        }
    }
}
