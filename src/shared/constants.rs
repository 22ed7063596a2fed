/// Owner recorded on uploads while the API has no authentication
pub const DEFAULT_UPLOAD_OWNER_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Status stored on every successfully ingested file
pub const FILE_STATUS_SUCCESS: &str = "success";

// =============================================================================
// REPORTING
// =============================================================================

/// Tables known to exist in the project
pub const KNOWN_TABLES: &[&str] = &["inventory", "files"];

/// Table names probed when looking for additional tables
pub const COMMON_TABLE_GUESSES: &[&str] = &[
    "users",
    "profiles",
    "auth",
    "storage",
    "buckets",
    "customers",
    "products",
    "orders",
    "transactions",
    "logs",
    "settings",
    "categories",
    "tags",
    "comments",
];

/// Rows sampled per known table
pub const DEFAULT_SAMPLE_ROWS: usize = 3;

/// Longer text values are truncated in reports
pub const MAX_REPORT_VALUE_CHARS: usize = 100;

pub const INVENTORY_TABLE: &str = "inventory";
