pub mod connections;
pub mod discover;
pub mod positions;
pub mod profiles;

pub use connections::{
    clear_crossed_paths, list_connections, list_crossed_paths, resolve_interest, send_interest,
};
pub use discover::discover;
pub use positions::{remove_position, report_position};
pub use profiles::upsert_profile;
