use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tower_sessions::{MemoryStore, SessionManagerLayer};

use crate::handlers;
use crate::middleware::auth_layer;
use crate::state::AppState;

pub mod health;
pub mod views;

/// API response wrapper
#[derive(Serialize, Debug)]
pub struct ApiResponse<T: Serialize> {
    pub code: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: true,
            message: "success".to_string(),
            data: Some(data),
            total: None,
        }
    }

    /// A page of records plus the total count before paging
    pub fn list(data: T, total: u64) -> Self {
        Self {
            code: true,
            message: "success".to_string(),
            data: Some(data),
            total: Some(total),
        }
    }
}

impl ApiResponse<()> {
    pub fn success_msg(message: impl Into<String>) -> Self {
        Self {
            code: true,
            message: message.into(),
            data: None,
            total: None,
        }
    }
}

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    // Session store (in-memory)
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_http_only(true);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public_routes = Router::new()
        .route("/ping", get(health::ping))
        .route("/index", get(views::index))
        .route("/account/login", post(handlers::account::login))
        .route("/company/query", get(handlers::company::query_branch_companies));

    let protected_routes = Router::new()
        .route("/authority_render/:model_name", get(views::render_authority))
        // Account
        .route("/account/quit", post(handlers::account::quit))
        // Department
        .route("/depart/create", post(handlers::department::create_department))
        .route("/depart/del/:dep_id", delete(handlers::department::delete_department))
        .route("/depart/edit", post(handlers::department::edit_department))
        .route("/depart/query/:dep_id", get(handlers::department::query_department))
        // Rank
        .route("/rank/create", post(handlers::rank::create_rank))
        .route("/rank/del/:rank_id", delete(handlers::rank::delete_rank))
        .route("/rank/edit", post(handlers::rank::edit_rank))
        .route("/rank/query/:rank_id", get(handlers::rank::query_rank))
        // Staff
        .route("/staff/create", post(handlers::staff::create_staff))
        .route("/staff/del/:staff_id", delete(handlers::staff::delete_staff))
        .route("/staff/edit", post(handlers::staff::edit_staff))
        .route("/staff/query/:staff_id", get(handlers::staff::query_staff))
        .route("/staff/query_by_name/:staff_name", get(handlers::staff::query_staff_by_name))
        .route("/staff/query_by_dep/:dep_name", get(handlers::staff::query_staff_by_dep))
        // Password
        .route("/password/query/:staff_id", get(handlers::password::query_password))
        .route("/password/edit", post(handlers::password::edit_password))
        // Authority
        .route("/authority/create", post(handlers::authority::create_authority_detail))
        .route("/authority/edit", post(handlers::authority::edit_authority_detail))
        .route(
            "/authority/query_by_user_type/:user_type",
            get(handlers::authority::query_by_user_type),
        )
        .route(
            "/authority/query_by_user_type_and_model",
            post(handlers::authority::query_by_user_type_and_model),
        )
        .route("/authority/set_admin/:staff_id", post(handlers::authority::set_admin))
        .route("/authority/set_normal/:staff_id", post(handlers::authority::set_normal))
        // Notification
        .route("/notification/create", post(handlers::notification::create_notification))
        .route(
            "/notification/delete/:notice_id",
            delete(handlers::notification::delete_notification),
        )
        .route("/notification/edit", post(handlers::notification::edit_notification))
        .route(
            "/notification/query/:notice_title",
            get(handlers::notification::query_notification),
        )
        // Salary
        .route("/salary/create", post(handlers::salary::create_salary))
        .route("/salary/delete/:salary_id", delete(handlers::salary::delete_salary))
        .route("/salary/edit", post(handlers::salary::edit_salary))
        .route("/salary/query/:staff_id", get(handlers::salary::query_salary))
        // Salary records
        .route("/salary_record/create", post(handlers::salary_record::create_salary_record))
        .route(
            "/salary_record/delete/:salary_record_id",
            delete(handlers::salary_record::delete_salary_record),
        )
        .route("/salary_record/edit", post(handlers::salary_record::edit_salary_record))
        .route(
            "/salary_record/query/:staff_id",
            get(handlers::salary_record::query_salary_record),
        )
        .route(
            "/salary_record/get_salary_record_is_pay_by_id/:id",
            get(handlers::salary_record::is_paid),
        )
        .route(
            "/salary_record/pay_salary_record_by_id/:id",
            get(handlers::salary_record::pay_salary_record),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_layer));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service("/static", ServeDir::new(&state.config.static_dir))
        .nest_service("/views", ServeDir::new(&state.config.views_dir))
        .fallback(views::not_found)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
