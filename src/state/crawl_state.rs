/// Crawl state definitions for search result pagination
///
/// The link discovery crawl walks result pages one at a time. Whether the
/// next page is fetched depends on what the current page yielded, so the
/// walk is an explicit state machine rather than a fixed page range.
use std::fmt;

/// Why a crawl stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// The page yielded at most one ad link; its links were discarded
    Exhausted { page: u32 },

    /// Every page up to the depth limit was fetched
    DepthReached { max_depth: u32 },
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted { page } => write!(f, "no more ads on page {}", page),
            Self::DepthReached { max_depth } => write!(f, "reached max depth {}", max_depth),
        }
    }
}

/// Represents the current state of a link discovery crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    /// The given page is about to be fetched and parsed
    Fetching { page: u32 },

    /// The given page produced links that are being appended
    Accumulating { page: u32 },

    /// The crawl is over
    Done(StopReason),
}

impl CrawlState {
    /// Initial state: fetching the first results page
    pub fn start() -> Self {
        Self::Fetching { page: 1 }
    }

    /// Returns true once the crawl has stopped
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    /// Returns the stop reason of a terminal state
    pub fn stop_reason(&self) -> Option<StopReason> {
        match self {
            Self::Done(reason) => Some(*reason),
            _ => None,
        }
    }

    /// Transition after a page has been fetched and its ad links counted
    ///
    /// A page with at most one link holds nothing but a sponsored placement,
    /// which marks the end of the results. Other states are returned unchanged.
    pub fn on_page_fetched(self, link_count: usize) -> Self {
        match self {
            Self::Fetching { page } if link_count <= 1 => {
                Self::Done(StopReason::Exhausted { page })
            }
            Self::Fetching { page } => Self::Accumulating { page },
            other => other,
        }
    }

    /// Transition after a page's links have been appended
    ///
    /// Moves to the next page unless it would exceed `max_depth`.
    /// Other states are returned unchanged.
    pub fn on_links_stored(self, max_depth: u32) -> Self {
        match self {
            Self::Accumulating { page } if page >= max_depth => {
                Self::Done(StopReason::DepthReached { max_depth })
            }
            Self::Accumulating { page } => Self::Fetching { page: page + 1 },
            other => other,
        }
    }

    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fetching { .. } => "fetching",
            Self::Accumulating { .. } => "accumulating",
            Self::Done(_) => "done",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetching { page } | Self::Accumulating { page } => {
                write!(f, "{} (page {})", self.label(), page)
            }
            Self::Done(reason) => write!(f, "done: {}", reason),
        }
    }
}
