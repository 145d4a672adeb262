use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth::{self, dtos as auth_dtos};
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::files::{dtos as files_dtos, handlers as files_handlers, models as files_models};
use crate::features::places::{
    dtos as places_dtos, handlers as places_handlers, models as places_models,
};
use crate::features::reviews::{dtos as reviews_dtos, handlers as reviews_handlers};
use crate::features::summary;
use crate::features::users::{dtos as users_dtos, handlers as users_handlers, models as users_models};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::login,
        auth::handlers::google_redirect,
        auth::handlers::google_callback,
        auth::handlers::google_mobile_callback,
        auth::handlers::my_session,
        auth::handlers::logout,
        // Users
        users_handlers::list_users,
        users_handlers::upload_avatar,
        users_handlers::change_info,
        users_handlers::change_role,
        users_handlers::delete_user,
        // Files
        files_handlers::upload_map_content,
        files_handlers::map_content_media,
        files_handlers::map_marker_media,
        files_handlers::avatar_media,
        // Categories
        categories_handlers::list_categories,
        categories_handlers::get_category,
        categories_handlers::create_category,
        categories_handlers::update_category,
        categories_handlers::delete_category,
        // Places
        places_handlers::create_place,
        places_handlers::list_places,
        places_handlers::my_places,
        places_handlers::bookmarks,
        places_handlers::get_place,
        places_handlers::place_images,
        places_handlers::update_place,
        places_handlers::delete_place,
        // Place search
        places_handlers::highlight,
        places_handlers::nearest,
        places_handlers::nearby_place,
        places_handlers::map_search,
        places_handlers::ar_map_search,
        // Place actions
        places_handlers::like_place,
        places_handlers::dislike_place,
        places_handlers::increment_views,
        places_handlers::toggle_bookmark,
        places_handlers::action_metadata,
        places_handlers::recount,
        // Reviews
        reviews_handlers::create_review,
        reviews_handlers::list_reviews,
        reviews_handlers::my_review,
        reviews_handlers::my_reviews,
        reviews_handlers::update_review,
        reviews_handlers::delete_review,
        // Summary
        summary::data_overview,
    ),
    components(
        schemas(
            Meta,
            // Auth
            auth_dtos::LoginRequestDto,
            auth_dtos::LoginResponseDto,
            auth_dtos::MobileAuthResponseDto,
            auth_dtos::MySessionDto,
            auth_dtos::UserMetaDto,
            // Users
            users_models::UserRole,
            users_dtos::UserBriefDto,
            users_dtos::UserResponseDto,
            users_dtos::ContributionSummaryDto,
            users_dtos::UserListMetaDto,
            users_dtos::ChangeInfoDto,
            users_dtos::ChangeRoleDto,
            users_dtos::AvatarResponseDto,
            // Files
            files_models::FileKind,
            files_dtos::UploadImageDto,
            files_dtos::FileResponseDto,
            files_dtos::ImageDto,
            // Categories
            categories_dtos::CategoryUploadDto,
            categories_dtos::CategoryResponseDto,
            // Places
            places_models::PlaceStatus,
            places_models::OpeningHoursDay,
            places_models::ReactionState,
            places_dtos::PlaceRequestDto,
            places_dtos::CategoryBriefDto,
            places_dtos::PlaceCardDto,
            places_dtos::PlaceListItemDto,
            places_dtos::PlaceDetailDto,
            places_dtos::ImageSource,
            places_dtos::PlaceImageDto,
            places_dtos::PlaceCountersDto,
            places_dtos::CoordinateDto,
            places_dtos::ActionStateDto,
            places_dtos::ActionMetadataDto,
            // Reviews
            reviews_dtos::ReviewRequestDto,
            reviews_dtos::ReviewDto,
            reviews_dtos::ReviewedPlaceDto,
            reviews_dtos::MyReviewDto,
            // Summary
            summary::DataOverviewDto,
            ApiResponse<places_dtos::PlaceDetailDto>,
            ApiResponse<Vec<places_dtos::PlaceCardDto>>,
            ApiResponse<reviews_dtos::ReviewDto>,
            ApiResponse<users_dtos::AvatarResponseDto>,
        )
    ),
    tags(
        (name = "auth", description = "Sign-in and sessions"),
        (name = "users", description = "User accounts"),
        (name = "files", description = "Image uploads"),
        (name = "media", description = "Stored media"),
        (name = "place-categories", description = "Place categories and map markers"),
        (name = "places", description = "Place submission and management"),
        (name = "place-search", description = "Discovery feeds and geographic search"),
        (name = "place-actions", description = "Likes, dislikes, bookmarks and views"),
        (name = "place-reviews", description = "Reviews and ratings"),
        (name = "summary", description = "Admin overview"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Jelajah API",
        version = "0.1.0",
        description = "API documentation for Jelajah",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
