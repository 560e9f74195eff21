//! Shared constants for end-to-end tests
//!
//! When test data changes (user credentials, seeded content), update only
//! this file.

// ============================================================================
// Test User Credentials
// ============================================================================

/// First seeded user, used as the default authenticated identity.
pub const UPLOADER_USER: &str = "uploader";
pub const UPLOADER_PASS: &str = "uploaderpass123";
pub const UPLOADER_EMAIL: &str = "uploader@example.com";

/// Second seeded user, for cross-user scenarios (ownership checks,
/// subscriptions, likes on somebody else's content).
pub const VIEWER_USER: &str = "viewer";
pub const VIEWER_PASS: &str = "viewerpass123";
pub const VIEWER_EMAIL: &str = "viewer@example.com";

// ============================================================================
// Timeouts
// ============================================================================

/// Per-request timeout for the test client.
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// How long to wait for a spawned server to start answering.
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;
