// =============================================================================
// Proximity Backend Constants
// =============================================================================
// This file contains all constants used throughout the backend to enable
// easy tuning and configuration from a single location.

// =============================================================================
// GEOGRAPHY
// =============================================================================

/// Mean Earth radius in meters, used by the haversine distance.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Grid cell edge in degrees for the geo index (~1.1 km of latitude).
pub const GRID_CELL_DEGREES: f64 = 0.01;

/// Meters per degree of latitude (and of longitude at the equator).
pub const METERS_PER_DEGREE: f64 = 111_320.0;

// =============================================================================
// PROXIMITY LEVELS
// =============================================================================

/// "Same venue": people at your exact location (~50 feet).
pub const VENUE_RADIUS_METERS: f64 = 15.0;

/// "Nearby": people within ~165 feet.
pub const NEARBY_RADIUS_METERS: f64 = 50.0;

/// "Same area": people in your neighborhood (~0.3 miles).
pub const NEIGHBORHOOD_RADIUS_METERS: f64 = 500.0;

/// "Same city": everyone in your city (~30 miles).
pub const CITY_RADIUS_METERS: f64 = 50_000.0;

/// Largest radius a proximity query will accept (the "same city" preset).
/// Anything beyond this is rejected at the geo-index boundary.
pub const MAX_QUERY_RADIUS_METERS: f64 = CITY_RADIUS_METERS;

// =============================================================================
// RANKING
// =============================================================================

/// Score contribution per shared profile tag.
pub const TAG_OVERLAP_WEIGHT: f64 = 10.0;

/// Meters of distance that cost one point of score.
pub const DISTANCE_PENALTY_METERS_PER_POINT: f64 = 100.0;

// =============================================================================
// LIFECYCLE TIMING
// =============================================================================

/// Default seconds of silence before a position is considered stale.
pub const DEFAULT_POSITION_TTL_SECS: u64 = 300;

/// Default period of the background stale-position sweep.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Default hours a declined pair must wait before interest can be re-sent.
pub const DEFAULT_DECLINE_COOLDOWN_HOURS: i64 = 24;

// =============================================================================
// LIMITS
// =============================================================================

/// Default cap on how many candidates a discovery request may ask for.
pub const DEFAULT_MAX_DISCOVERY_LIMIT: usize = 50;

/// Crossed-path history entries retained per user, newest first.
pub const CROSSED_PATHS_CAP: usize = 50;

// =============================================================================
// SERVER CONFIGURATION
// =============================================================================

/// Default HTTP server port
pub const DEFAULT_SERVER_PORT: u16 = 3001;

// =============================================================================
// TAG VOCABULARY
// =============================================================================

/// Default keyword vocabulary for bio tag extraction. Overridable via the
/// `TAG_VOCABULARY` environment variable (comma-separated).
pub const DEFAULT_TAG_VOCABULARY: &[&str] = &[
    "music",
    "coffee",
    "adventure",
    "adventures",
    "photography",
    "photographer",
    "dj",
    "art",
    "artist",
    "dog",
    "dogs",
    "tech",
    "dancing",
    "dance",
    "food",
    "foodie",
    "cooking",
    "chef",
    "startup",
    "founder",
    "karaoke",
    "yoga",
    "plants",
    "sunset",
    "sunsets",
    "netflix",
    "writing",
    "writer",
    "comedy",
    "finance",
    "fashion",
    "vintage",
    "brunch",
    "medical",
    "medicine",
    "gym",
    "fitness",
    "study",
    "studying",
    "producer",
    "vinyl",
    "architect",
    "museum",
    "museums",
    "sketching",
    "bartender",
    "hobbies",
    "travel",
    "traveling",
    "hiking",
    "running",
    "reading",
    "books",
    "movies",
    "film",
    "gaming",
    "beach",
    "wine",
    "beer",
    "concerts",
];
