//! Profile endpoints (`/profile/*`).

use reqwest::Method;

use super::client::{ApiClient, ApiError};
use super::types::{Profile, ProfileUpdate, UserStats};

impl ApiClient {
    pub async fn get_profile(&self) -> Result<Profile, ApiError> {
        self.get("/profile/me").await
    }

    /// Apply a partial update and return the stored profile.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile, ApiError> {
        self.send(Method::PUT, "/profile/me", Some(update)).await
    }

    pub async fn get_stats(&self) -> Result<UserStats, ApiError> {
        self.get("/profile/stats").await
    }
}
