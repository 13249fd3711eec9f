/// Default page size for pagination (the archive lists 15 letters per page)
pub const DEFAULT_PAGE_SIZE: i64 = 15;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// ATTACHMENT CONSTRAINTS
// =============================================================================

/// Maximum attachment size in bytes (10MB)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Only PDF attachments are accepted
pub const ALLOWED_MIME_TYPE: &str = "application/pdf";

/// Storage key prefix for letter attachments
pub const LETTER_STORAGE_PREFIX: &str = "letters";
