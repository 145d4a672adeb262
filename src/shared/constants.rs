/// Default row cap applied when a list endpoint receives an unusable `limit`
pub const DEFAULT_LIST_LIMIT: i64 = 500;

// =============================================================================
// DISCOVERY
// =============================================================================

/// Places at or above this many dislikes are hidden from discovery surfaces
pub const QUALITY_GATE_MAX_DISLIKES: i64 = 5;

/// Number of places returned by the highlight feed
pub const HIGHLIGHT_LIMIT: i64 = 25;

// =============================================================================
// PLACES
// =============================================================================

/// Minimum number of images a place submission must reference
pub const MIN_PLACE_IMAGES: usize = 4;

/// Opening hours always carry one entry per day of the week
pub const OPENING_HOURS_DAYS: usize = 7;

/// Reviews a regular user must have written before submitting places
pub const MIN_REVIEWS_TO_SUBMIT_PLACE: i64 = 10;

// =============================================================================
// MEDIA
// =============================================================================

/// Object key prefix for place and review images
pub const MAP_CONTENTS_PREFIX: &str = "map-contents";

/// Object key prefix for category marker icons
pub const MAP_MARKERS_PREFIX: &str = "map-markers";

/// Object key prefix for user avatars
pub const AVATARS_PREFIX: &str = "avatars";

/// Fallback avatar path served by the web client
pub const PATH_NO_PICTURE: &str = "/images/no-picture.webp";

/// Maximum upload size for place and review images (10MB)
pub const MAX_MAP_CONTENT_SIZE: usize = 10 * 1024 * 1024;

/// Maximum upload size for avatars (1MB)
pub const MAX_AVATAR_SIZE: usize = 1024 * 1024;

/// Maximum upload size for category markers (1MB)
pub const MAX_MAP_MARKER_SIZE: usize = 1024 * 1024;

/// Column width of `hashtags.name`
pub const MAX_HASHTAG_LENGTH: usize = 100;

/// Unused uploads younger than this survive cleanup, so images uploaded for a
/// submission that is still being filled in are not swept away
pub const UNUSED_FILE_GRACE_MINUTES: i32 = 60;
