pub mod category_buffer;
pub mod pattern_matcher;
pub mod response_renderer;

pub use category_buffer::{BufferOutcome, CategoryBuffer, CategoryBuffers, MergePlan};
pub use pattern_matcher::PatternMatcher;
pub use response_renderer::render_response;
