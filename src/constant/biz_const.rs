/// environment variable
pub const LOCAL_ENVIRONMENT: &str = "local";
pub const PRODUCTION_ENVIRONMENT: &str = "production";

/// validate waitlist form fields
pub const NAME_MIN_LENGTH: usize = 2;
pub const NAME_MAX_LENGTH: usize = 50;
pub const EMAIL_MIN_LENGTH: usize = 5;
pub const EMAIL_MAX_LENGTH: usize = 254;
pub const MESSAGE_MIN_LENGTH: usize = 10;
pub const MESSAGE_MAX_LENGTH: usize = 1000;
pub const COMPANY_MIN_LENGTH: usize = 2;
pub const COMPANY_MAX_LENGTH: usize = 100;

/// http request headers understood by the hosted store
pub const API_KEY_HEADER: &str = "apikey";
pub const PREFER_HEADER: &str = "Prefer";
pub const RANGE_HEADER: &str = "Range";
pub const CONTENT_RANGE_HEADER: &str = "content-range";

/// SQLSTATE codes reported by the hosted store
pub const UNIQUE_VIOLATION: &str = "23505";
pub const NOT_NULL_VIOLATION: &str = "23502";
pub const FOREIGN_KEY_VIOLATION: &str = "23503";
pub const UNDEFINED_TABLE: &str = "42P01";
pub const INSUFFICIENT_PRIVILEGE: &str = "42501";
