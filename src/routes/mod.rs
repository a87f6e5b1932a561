/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules.
/// Access control is applied explicitly at the module level (via Axum layers),
/// preventing accidental exposure of protected endpoints.

/// Routes accessible to all clients: service banner, registration, login,
/// and the public job board (active postings only).
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware.
/// Requires a valid bearer token; role and ownership checks happen inside
/// the handlers via the policy module.
pub mod authenticated;
