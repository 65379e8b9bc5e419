pub mod connections;
pub mod geo;
pub mod history;
pub mod interests;
pub mod profiles;

pub use connections::ConnectionManager;
pub use geo::{GeoIndex, PositionHit, PositionReport};
pub use history::CrossedPaths;
pub use interests::InterestGraph;
pub use profiles::ProfileStore;
