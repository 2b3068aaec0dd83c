/// Content scores reported by the analysis and optimization services.
///
/// Never derived from local issue counts; only an explicit service result
/// changes these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scores {
    /// Score of the text as last analysed.
    pub before: i32,
    /// Score after the last accepted optimization.
    pub after: i32,
}

impl Scores {
    /// Improvement gained by the last optimization
    pub fn improvement(&self) -> i32 {
        self.after - self.before
    }
}
