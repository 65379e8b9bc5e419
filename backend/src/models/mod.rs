pub mod connections;
pub mod users;

pub use connections::{
    Connection, ConnectionStatus, CrossedPath, InterestEdge, MeetingContext, PairKey,
    ResolveOutcome,
};
pub use users::{Profile, ProximityLevel, UserPosition};
