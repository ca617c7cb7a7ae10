use crate::ports::CheckerExchange;
use crate::services::{render_response, CategoryBuffers, PatternMatcher};
use banwatch_domain::{normalize_domain, Category};
use hickory_proto::op::Message;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationOutcome {
    Classified {
        category: Category,
        domain: String,
        checker: SocketAddr,
    },
    Unclassified,
}

/// Re-resolves a query against the checker resolvers and files the domain
/// under the first category whose markers appear in a response.
///
/// Checkers are tried strictly in configured order; the first classifying
/// checker ends the task and later checkers are never queried. Ban markers
/// are always tested before sanction markers.
pub struct ClassifyQueryUseCase {
    checkers: Arc<[SocketAddr]>,
    exchange: Arc<dyn CheckerExchange>,
    ban_markers: PatternMatcher,
    sanction_markers: PatternMatcher,
    buffers: CategoryBuffers,
}

impl ClassifyQueryUseCase {
    pub fn new(
        checkers: Vec<SocketAddr>,
        exchange: Arc<dyn CheckerExchange>,
        ban_markers: PatternMatcher,
        sanction_markers: PatternMatcher,
        buffers: CategoryBuffers,
    ) -> Self {
        Self {
            checkers: checkers.into(),
            exchange,
            ban_markers,
            sanction_markers,
            buffers,
        }
    }

    fn markers(&self, category: Category) -> &PatternMatcher {
        match category {
            Category::Ban => &self.ban_markers,
            Category::Sanction => &self.sanction_markers,
        }
    }

    pub async fn execute(&self, query: &Message) -> ClassificationOutcome {
        for checker in self.checkers.iter().copied() {
            let response = match self.exchange.exchange(query, checker).await {
                Ok(response) => response,
                Err(e) if e.is_transient() => {
                    warn!(checker = %checker, error = %e, "Checker exchange failed");
                    continue;
                }
                Err(e) => {
                    error!(checker = %checker, error = %e, "Checker exchange failed unexpectedly");
                    continue;
                }
            };

            let rendered = render_response(&response);

            for category in Category::ALL {
                let markers = self.markers(category);
                if !markers.matches(&rendered) {
                    continue;
                }

                let Some(domain) = question_domain(&response).or_else(|| question_domain(query))
                else {
                    debug!(checker = %checker, "Matching response carries no question");
                    return ClassificationOutcome::Unclassified;
                };

                info!(
                    category = %category,
                    domain = %domain,
                    checker = %checker,
                    marker = markers.first_match(&rendered).unwrap_or_default(),
                    "Domain classified"
                );

                match self
                    .buffers
                    .get(category)
                    .classify_and_buffer(&domain)
                    .await
                {
                    Ok(outcome) => {
                        debug!(category = %category, domain = %domain, ?outcome, "Buffered")
                    }
                    Err(e) => {
                        warn!(category = %category, domain = %domain, error = %e, "Failed to persist classification")
                    }
                }

                return ClassificationOutcome::Classified {
                    category,
                    domain,
                    checker,
                };
            }

            debug!(checker = %checker, "Checker response matched no category");
        }

        ClassificationOutcome::Unclassified
    }
}

fn question_domain(message: &Message) -> Option<String> {
    message
        .queries()
        .first()
        .map(|q| normalize_domain(&q.name().to_ascii()))
        .filter(|d| !d.is_empty())
}
