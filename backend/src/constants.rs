// =============================================================================
// ConnectSphere Backend Constants
// =============================================================================
// Tunables shared by the server, the services and the migration binary.

// =============================================================================
// SERVER CONFIGURATION
// =============================================================================

/// Port used when `PORT` is not set
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default pool size when `DB_MAX_CONNECTIONS` is not set
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Upper bound on a single storage call (pool acquire and statement execution)
pub const DEFAULT_STORAGE_TIMEOUT_SECS: u64 = 5;

// =============================================================================
// AUTH CONFIGURATION
// =============================================================================

/// Lifetime of an issued bearer token
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Clock skew tolerated when checking token expiry
pub const TOKEN_LEEWAY_SECS: u64 = 60;

pub const BEARER_PREFIX: &str = "Bearer ";

// =============================================================================
// ACCOUNT FIELD LIMITS
// =============================================================================

pub const USERNAME_MIN_CHARS: usize = 3;
pub const USERNAME_MAX_CHARS: usize = 30;

pub const DISPLAY_NAME_MIN_CHARS: usize = 1;
pub const DISPLAY_NAME_MAX_CHARS: usize = 100;

pub const PASSWORD_MIN_BYTES: usize = 8;

/// bcrypt ignores input past 72 bytes
pub const PASSWORD_MAX_BYTES: usize = 72;

// =============================================================================
// SEARCH CONFIGURATION
// =============================================================================

pub const SEARCH_DEFAULT_LIMIT: usize = 20;
pub const SEARCH_MIN_LIMIT: usize = 1;
pub const SEARCH_MAX_LIMIT: usize = 100;
