//! API constants

/// API base path prefix
pub const API_PREFIX: &str = "/api";

/// Served OpenAPI document
pub const OPENAPI_PATH: &str = "/api/openapi.json";

/// Extra body allowance on top of the largest upload, for multipart framing and text fields.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;
