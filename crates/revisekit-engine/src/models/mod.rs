pub mod score;
pub mod span;

pub use score::Scores;
pub use span::Span;
