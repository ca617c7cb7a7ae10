use aho_corasick::AhoCorasick;
use banwatch_domain::DomainError;
use std::sync::Arc;
use tracing::warn;

/// Substring test of a rendered checker response against a marker list.
///
/// Matching is case-sensitive. Empty markers are ignored since they would
/// classify every response.
#[derive(Clone)]
pub struct PatternMatcher {
    automaton: Option<Arc<AhoCorasick>>,
    markers: Arc<[String]>,
}

impl PatternMatcher {
    pub fn new(markers: &[String]) -> Result<Self, DomainError> {
        let markers: Arc<[String]> = markers
            .iter()
            .filter(|m| {
                if m.is_empty() {
                    warn!("Ignoring empty classification marker");
                }
                !m.is_empty()
            })
            .cloned()
            .collect();

        let automaton = if markers.is_empty() {
            None
        } else {
            let ac = AhoCorasick::new(markers.iter()).map_err(|e| {
                DomainError::ConfigError(format!("Failed to compile markers: {}", e))
            })?;
            Some(Arc::new(ac))
        };

        Ok(Self { automaton, markers })
    }

    pub fn matches(&self, rendered: &str) -> bool {
        if rendered.is_empty() {
            return false;
        }
        self.automaton
            .as_ref()
            .is_some_and(|ac| ac.is_match(rendered))
    }

    /// Leftmost marker found in `rendered`, if any.
    pub fn first_match(&self, rendered: &str) -> Option<&str> {
        let ac = self.automaton.as_ref()?;
        let found = ac.find(rendered)?;
        self.markers
            .get(found.pattern().as_usize())
            .map(String::as_str)
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }
}
