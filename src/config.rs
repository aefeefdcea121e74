/// Application-level constants
pub const APP_NAME: &str = "Remedi";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is not set
pub fn default_log_filter() -> &'static str {
    "remedi=debug,info"
}

/// Name of the per-user medicines collection in the document store
pub const MEDICINES_COLLECTION: &str = "medicines";

/// Document path of a user's medicines collection
/// `users/{user_id}/medicines` — one collection per owning user
pub fn medicines_collection_path(user_id: &str) -> String {
    format!("users/{user_id}/{MEDICINES_COLLECTION}")
}
