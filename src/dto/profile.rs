use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProfileImageRequest {
    /// Device-local path; `null` clears the picture.
    pub image_path: Option<String>,
}
