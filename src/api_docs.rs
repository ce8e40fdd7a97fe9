use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::books::list_books,
        api::books::get_book,
        api::books::create_book,
        api::books::update_book,
        api::books::update_copies,
        api::books::delete_book,
        api::users::list_users,
        api::users::get_user,
        api::users::create_user,
        api::users::update_user,
        api::users::delete_user,
        api::loans::list_loans,
        api::loans::get_loan,
        api::loans::create_loan,
        api::loans::renew_loan,
        api::loans::return_loan,
        api::dashboard::get_stats,
    ),
    components(
        schemas(
            crate::models::Book,
            crate::models::User,
            crate::models::Loan,
            crate::models::LoanDetails,
            crate::models::loan::LoanDto,
            crate::models::user::MembershipType,
            crate::models::user::UserStatus,
            crate::domain::lending::LoanDisplayStatus,
            crate::domain::BookInput,
            crate::domain::UserInput,
            crate::domain::UserUpdate,
            crate::domain::LoanStatusFilter,
            crate::domain::FieldError,
            crate::services::DashboardStats,
            api::books::UpdateCopiesRequest,
            api::MessageResponse,
            api::ErrorResponse,
        )
    ),
    tags(
        (name = "library-lending", description = "Library lending API")
    )
)]
pub struct ApiDoc;
