use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        appointments::{
            AppointmentEntry, AppointmentList, AppointmentRequest, AppointmentWithServices,
            BookedTime, BookedTimeList,
        },
        auth::{
            ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterRequest,
            UpdatePasswordRequest, UserProfile,
        },
        comments::{CommentAuthor, CommentDetail, CommentList, CreateCommentRequest},
        services::{
            CreateServiceRequest, ImageList, ServiceList, ServiceWithImages, UpdateServiceRequest,
        },
    },
    models::{Appointment, AppointmentService, Comment, Service, ServiceImage},
    response::{ApiResponse, Meta},
    routes::{appointments, auth, comments, health, params, services, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
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

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::verify_account,
        auth::login,
        auth::forgot_password,
        auth::verify_reset_token,
        auth::update_password,
        auth::me,
        auth::admin_me,
        services::list_services,
        services::get_service,
        services::create_service,
        services::update_service,
        services::delete_service,
        services::upload_image,
        services::list_images,
        services::delete_image,
        appointments::list_booked_times,
        appointments::create_appointment,
        appointments::get_appointment,
        appointments::update_appointment,
        appointments::cancel_appointment,
        users::list_user_appointments,
        comments::create_comment,
        comments::list_comments,
        comments::list_comments_for_service
    ),
    components(
        schemas(
            Service,
            ServiceImage,
            Appointment,
            AppointmentService,
            Comment,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            ForgotPasswordRequest,
            UpdatePasswordRequest,
            UserProfile,
            CreateServiceRequest,
            UpdateServiceRequest,
            ServiceList,
            ServiceWithImages,
            ImageList,
            AppointmentRequest,
            AppointmentWithServices,
            AppointmentEntry,
            AppointmentList,
            BookedTime,
            BookedTimeList,
            CreateCommentRequest,
            CommentAuthor,
            CommentDetail,
            CommentList,
            params::BookedTimesQuery,
            Meta,
            ApiResponse<Service>,
            ApiResponse<ServiceList>,
            ApiResponse<ServiceWithImages>,
            ApiResponse<ImageList>,
            ApiResponse<AppointmentWithServices>,
            ApiResponse<AppointmentList>,
            ApiResponse<BookedTimeList>,
            ApiResponse<CommentList>,
            ApiResponse<UserProfile>,
            ApiResponse<LoginResponse>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, verification and sessions"),
        (name = "Services", description = "Catalog and image management"),
        (name = "Appointments", description = "Booking lifecycle"),
        (name = "Users", description = "Per-user appointment listings"),
        (name = "Comments", description = "Service comments"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
