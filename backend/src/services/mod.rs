pub mod matcher;
pub mod tags;

pub use matcher::RankedCandidate;
pub use tags::TagExtractor;
