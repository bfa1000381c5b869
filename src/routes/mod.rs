/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules.
/// Access control is applied explicitly at the module level (via an Axum route
/// layer), so a handler can only be reached through the guard its module declares.
///
/// The two modules map directly to the defined access levels.

/// Routes accessible to all visitors (listing, single post, search, about,
/// login, logout).
pub mod public;

/// Routes protected by the session guard. Requires a verified session token.
pub mod admin;
