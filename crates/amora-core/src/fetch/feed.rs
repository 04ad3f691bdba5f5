//! Named content feeds.
//!
//! Each listing screen is a preset over the resilient fetcher: which
//! collection, which field orders it, how many documents, and any
//! visibility filter.

use std::fmt;
use std::str::FromStr;

use amora_types::content::{CONTENT_COLLECTION, STORIES_COLLECTION};

use crate::repository::document::{Filter, OrderBy, Query};

/// A content listing screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    /// Landing page carousel: newest content.
    Hero,
    /// Explore grid: most viewed content opted into explore.
    Explore,
    /// Stories carousel: newest stories.
    Stories,
}

impl FeedKind {
    pub const ALL: [FeedKind; 3] = [FeedKind::Hero, FeedKind::Explore, FeedKind::Stories];

    pub fn collection(&self) -> &'static str {
        match self {
            FeedKind::Hero | FeedKind::Explore => CONTENT_COLLECTION,
            FeedKind::Stories => STORIES_COLLECTION,
        }
    }

    pub fn order_field(&self) -> &'static str {
        match self {
            FeedKind::Hero | FeedKind::Stories => "createdAt",
            FeedKind::Explore => "views",
        }
    }

    pub fn default_limit(&self) -> u32 {
        match self {
            FeedKind::Hero => 5,
            FeedKind::Explore => 30,
            FeedKind::Stories => 20,
        }
    }

    /// Build the base query and ordering for this feed. `max_results`
    /// replaces the default limit when given.
    pub fn query(&self, max_results: Option<u32>) -> (Query, OrderBy) {
        let mut base =
            Query::collection(self.collection()).limit(max_results.unwrap_or(self.default_limit()));
        if let FeedKind::Explore = self {
            base = base.filter(Filter::eq("inExplore", true));
        }
        (base, OrderBy::desc(self.order_field()))
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedKind::Hero => write!(f, "hero"),
            FeedKind::Explore => write!(f, "explore"),
            FeedKind::Stories => write!(f, "stories"),
        }
    }
}

impl FromStr for FeedKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hero" => Ok(FeedKind::Hero),
            "explore" => Ok(FeedKind::Explore),
            "stories" => Ok(FeedKind::Stories),
            other => Err(format!("invalid feed: '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explore_feed_filters_and_orders_by_views() {
        let (base, order_by) = FeedKind::Explore.query(None);
        assert_eq!(base.collection, "content");
        assert_eq!(base.limit, Some(30));
        assert_eq!(base.filters, vec![Filter::eq("inExplore", true)]);
        assert!(base.order_by.is_none());
        assert_eq!(order_by, OrderBy::desc("views"));
    }

    #[test]
    fn override_replaces_default_limit() {
        let (base, _) = FeedKind::Stories.query(Some(3));
        assert_eq!(base.collection, "stories");
        assert_eq!(base.limit, Some(3));
    }

    #[test]
    fn feed_names_roundtrip() {
        for feed in FeedKind::ALL {
            assert_eq!(feed.to_string().parse::<FeedKind>().unwrap(), feed);
        }
    }
}
