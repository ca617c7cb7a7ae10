mod classify_query;

pub use classify_query::{ClassificationOutcome, ClassifyQueryUseCase};
