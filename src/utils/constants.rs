//! Shared constants and invariants

/// Literal marker replaced by the PSI value in parameter templates.
pub const PSI_PLACEHOLDER: &str = "${PSI}";

/// Scheme label prepended to freshly fetched access tokens.
pub const SCHEME_LABEL: &str = "bearer";

pub const DEFAULT_REFRESH_TIMEOUT_MS: u64 = 5000;

// Methods with a dedicated request encoding
pub const METHOD_GET: &str = "GET";
pub const METHOD_POST: &str = "POST";
pub const METHOD_PUT: &str = "PUT";
