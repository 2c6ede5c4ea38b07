use axum::Router;

/// A service module that contributes HTTP routes.
///
/// Each business module (auth, esign, backoffice) implements this trait
/// to register its API endpoints. The binary entry point collects all
/// modules and merges their routes under `/api` — the original public
/// surface is flat (`/api/login`, `/api/properties`, ...), so routes
/// are merged rather than nested per module.
pub trait Module: Send + Sync {
    /// Module name, used for logging.
    fn name(&self) -> &str;

    /// Return the module's routes, relative to `/api`.
    fn routes(&self) -> Router;
}
