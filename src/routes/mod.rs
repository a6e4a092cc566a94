/// Router Module Index
///
/// Splits the route table by access level. Each module owns one level and the
/// guard for it is attached where the module is merged into the router, so a
/// route cannot end up protected (or exposed) by accident: its module decides.

/// Anonymous endpoints. Monitoring only; no post data is served here.
pub mod public;

/// The feed surface. Merged behind the `AuthUser` middleware layer, so every
/// handler in it starts from a resolved caller identity.
pub mod authenticated;
