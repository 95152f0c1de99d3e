//! Extraction state definitions for the paginated listing loop
use std::fmt;

/// The state of one site's paginated extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionState {
    /// Nothing fetched yet; offset 0, total and page size unknown
    Start,

    /// Requesting the listing page at the current offset
    FetchingPage,

    /// Handing the page body to the parser
    ParsingPage,

    /// Page consumed, more pages expected
    Continue,

    // ===== Terminal States =====
    /// Pagination terminated normally
    Done(StopReason),

    /// A page fetch was exhausted; results for the site are discarded
    Aborted,
}

/// Why pagination ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// A page yielded zero records
    EmptyPage,

    /// Accumulated records reached the site's reported total
    ReachedTotal,
}

impl ExtractionState {
    /// Returns true if no further pages will be requested
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_) | Self::Aborted)
    }

    /// Returns true if the loop may move from `self` to `next`
    pub fn can_transition_to(&self, next: ExtractionState) -> bool {
        use ExtractionState::*;
        matches!(
            (self, next),
            (Start, FetchingPage)
                | (FetchingPage, ParsingPage)
                | (FetchingPage, Aborted)
                | (ParsingPage, Continue)
                | (ParsingPage, Done(_))
                | (Continue, FetchingPage)
        )
    }
}

impl fmt::Display for ExtractionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::FetchingPage => write!(f, "fetching_page"),
            Self::ParsingPage => write!(f, "parsing_page"),
            Self::Continue => write!(f, "continue"),
            Self::Done(StopReason::EmptyPage) => write!(f, "done(empty_page)"),
            Self::Done(StopReason::ReachedTotal) => write!(f, "done(reached_total)"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}
