//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, bad format)   |
//! | 3-9     | pipeline         | Merge, input, config and output codes    |
//! | 40-49   | api              | Vehicle API login/fetch codes            |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use fleetsync_client::ClientError;
use fleetsync_recon::ReconError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unsupported output format.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Pipeline (3-9)
// =============================================================================

/// Structural merge error: missing key field, duplicate key, missing
/// required column.
pub const EXIT_STRUCTURAL: u8 = 3;

/// Input file missing or unreadable (CSV, JSON, XLSX).
pub const EXIT_INPUT: u8 = 4;

/// Config file unreadable or invalid.
pub const EXIT_CONFIG: u8 = 5;

/// Output file could not be written.
pub const EXIT_WRITE: u8 = 6;

// =============================================================================
// API (40-49)
// =============================================================================

/// No credentials provided (neither flag nor env var).
pub const EXIT_API_NOT_AUTH: u8 = 40;

/// Login or request rejected (401/403).
pub const EXIT_API_AUTH: u8 = 41;

/// Network failure or non-success HTTP status.
pub const EXIT_API_NETWORK: u8 = 42;

/// Upstream answered with a body of the wrong shape.
pub const EXIT_API_PAYLOAD: u8 = 43;

// =============================================================================
// Error mapping
// =============================================================================

/// Map a ReconError to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_CONFIG,
        ReconError::MissingKeyField { .. }
        | ReconError::DuplicateKey { .. }
        | ReconError::MissingColumn { .. } => EXIT_STRUCTURAL,
    }
}

/// Map a ClientError to its exit code.
pub fn client_exit_code(err: &ClientError) -> u8 {
    match err {
        ClientError::NotAuthenticated => EXIT_API_NOT_AUTH,
        ClientError::Auth(..) => EXIT_API_AUTH,
        ClientError::Http(..) | ClientError::Network(_) => EXIT_API_NETWORK,
        ClientError::Parse(_) | ClientError::Payload(_) => EXIT_API_PAYLOAD,
        ClientError::Config(_) => EXIT_CONFIG,
    }
}
