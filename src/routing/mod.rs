//! Message routing: resolves which agent kind handles a free-text request.

pub mod keyword;

pub use keyword::{KeywordRouter, MatchedBy, RouteDecision};
