use crate::{
    dto::profile::{ProfileImageRequest, UpdateProfileRequest},
    error::{AppError, AppResult, FieldError},
    middleware::auth::AuthUser,
    models::UserProfile,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn get_profile(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<UserProfile>> {
    let profile = state
        .profiles
        .get_profile(&user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Profile", profile, None))
}

/// The email doubles as the login on the account record, so it cannot be
/// changed through a profile edit.
pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<UserProfile>> {
    let email = payload.email.trim().to_lowercase();
    if email != user.email {
        return Err(AppError::Validation(vec![FieldError::new(
            "email",
            "Email is the login and cannot be changed here",
        )]));
    }

    let image_path = state
        .profiles
        .get_profile(&user.user_id)
        .await?
        .and_then(|p| p.image_path);

    let profile = UserProfile {
        id: user.user_id.clone(),
        full_name: payload.full_name.trim().to_string(),
        email,
        phone: payload.phone.trim().to_string(),
        image_path,
    };
    let profile = state.profiles.save_profile(profile).await?;
    Ok(ApiResponse::success(
        "Profile updated",
        profile,
        Some(Meta::empty()),
    ))
}

pub async fn set_profile_image(
    state: &AppState,
    user: &AuthUser,
    payload: ProfileImageRequest,
) -> AppResult<ApiResponse<UserProfile>> {
    let image_path = payload
        .image_path
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());
    let profile = state
        .profiles
        .set_profile_image(&user.user_id, image_path)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "Profile image updated",
        profile,
        Some(Meta::empty()),
    ))
}
