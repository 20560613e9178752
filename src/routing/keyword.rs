//! Keyword intent router.
//!
//! Ordered substring rules over the lowercased message; the first rule with
//! a matching keyword wins, otherwise the default kind applies.

use crate::agents::AgentKind;

const GENERATION_KEYWORDS: &[&str] =
    &["生成", "创建", "制作", "写", "generate", "create", "write", "draft"];
const COMPLIANCE_KEYWORDS: &[&str] =
    &["合规", "检查", "审核", "法规", "compliance", "check", "audit", "regulation"];
const READABILITY_KEYWORDS: &[&str] =
    &["可读性", "易读", "理解", "优化", "readability", "easy to read", "comprehension"];

/// How a routing decision was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedBy {
    Keyword(&'static str),
    Default,
}

/// A routing decision: the chosen kind and what drove the choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDecision {
    pub kind: AgentKind,
    pub matched_by: MatchedBy,
}

/// First-match-wins keyword classifier over free text.
pub struct KeywordRouter {
    default_kind: AgentKind,
    rules: Vec<(AgentKind, &'static [&'static str])>,
}

impl KeywordRouter {
    /// Router with the built-in rule set and `default_kind` as the fallback.
    pub fn new(default_kind: AgentKind) -> Self {
        Self {
            default_kind,
            rules: vec![
                (AgentKind::PrivacyPolicyGenerator, GENERATION_KEYWORDS),
                (AgentKind::ComplianceChecker, COMPLIANCE_KEYWORDS),
                (AgentKind::ReadabilityChecker, READABILITY_KEYWORDS),
            ],
        }
    }

    /// Classify a message, reporting which keyword (if any) matched.
    pub fn route(&self, message: &str) -> RouteDecision {
        let haystack = message.to_lowercase();
        for (kind, keywords) in &self.rules {
            for &keyword in *keywords {
                if haystack.contains(keyword) {
                    return RouteDecision { kind: *kind, matched_by: MatchedBy::Keyword(keyword) };
                }
            }
        }
        RouteDecision { kind: self.default_kind, matched_by: MatchedBy::Default }
    }

    /// Classify a message, returning only the chosen kind.
    pub fn classify(&self, message: &str) -> AgentKind {
        self.route(message).kind
    }
}

impl Default for KeywordRouter {
    fn default() -> Self {
        Self::new(AgentKind::PrivacyPolicyGenerator)
    }
}
