use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::UserProfile;

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub profile: Option<UserProfile>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
}
