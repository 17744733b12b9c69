/*
 * Responsibility
 * - The profile projection returned to clients
 * - Identities are never exposed, only this projection
 */
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ProfileBody {
    pub profile: ProfileView,
}

/// A user as seen by the current viewer. `following` is viewer-relative and
/// computed fresh per request.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub username: String,
    pub bio: String,
    pub image: Option<String>,
    pub following: bool,
}
