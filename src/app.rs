use axum::{
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::CONFIG;
use crate::database::DatabaseManager;
use crate::handlers::{protected, public};
use crate::middleware::{jwt_auth_middleware, validate_user_middleware};

/// Full application router.
pub fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth/login", post(public::auth::login_post))
        // Protected API
        .merge(api_routes())
        // Global middleware
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn api_routes() -> Router {
    Router::new()
        .merge(session_routes())
        .merge(user_routes())
        .merge(membership_routes())
        .merge(leadership_routes())
        .merge(finance_routes())
        .merge(activity_routes())
        .merge(report_routes())
        .route_layer(middleware::from_fn(jwt_auth_middleware))
}

/// Session endpoints re-check the user row, so a deactivated account cannot
/// keep refreshing its token.
fn session_routes() -> Router {
    use protected::auth;

    Router::new()
        .route("/api/auth/whoami", get(auth::session_whoami))
        .route("/api/auth/session/refresh", put(auth::session_refresh))
        .route("/api/auth/password", put(auth::session_password))
        .route_layer(middleware::from_fn(validate_user_middleware))
}

fn user_routes() -> Router {
    use protected::users;

    Router::new()
        .route("/api/users", get(users::users_list).post(users::users_create))
        .route("/api/users/:id", get(users::user_get).put(users::user_update))
        .route("/api/users/:id/password", put(users::user_reset_password))
}

fn membership_routes() -> Router {
    use protected::members;

    Router::new()
        .route("/api/members", get(members::members_list).post(members::member_create))
        .route("/api/members/stats", get(members::members_stats))
        .route(
            "/api/members/:id",
            get(members::member_get)
                .put(members::member_update)
                .delete(members::member_delete),
        )
        .route("/api/members/:id/committees", get(members::member_committees))
        .route("/api/members/:id/attendance", get(members::member_attendance))
        .route(
            "/api/home-groups",
            get(members::home_groups_list).post(members::home_group_create),
        )
        .route(
            "/api/home-groups/:id",
            get(members::home_group_get)
                .put(members::home_group_update)
                .delete(members::home_group_delete),
        )
        .route("/api/home-groups/:id/members", get(members::home_group_members))
}

fn leadership_routes() -> Router {
    use protected::leadership as l;

    Router::new()
        .route("/api/committees", get(l::committees_list).post(l::committee_create))
        .route(
            "/api/committees/:id",
            get(l::committee_get).put(l::committee_update).delete(l::committee_delete),
        )
        .route(
            "/api/committees/:id/members",
            get(l::committee_roster).post(l::committee_add_member),
        )
        .route(
            "/api/committees/:id/members/:member_id",
            put(l::committee_update_member).delete(l::committee_remove_member),
        )
        .route("/api/deacons", get(l::deacons_list).post(l::deacon_create))
        .route(
            "/api/deacons/:id",
            get(l::deacon_get).put(l::deacon_update).delete(l::deacon_delete),
        )
        .route("/api/societies", get(l::societies_list).post(l::society_create))
        .route(
            "/api/societies/:id",
            get(l::society_get).put(l::society_update).delete(l::society_delete),
        )
        .route("/api/societies/:id/leaders", post(l::society_add_leader))
        .route(
            "/api/societies/:id/leaders/:leader_id",
            put(l::society_update_leader).delete(l::society_remove_leader),
        )
}

fn finance_routes() -> Router {
    use protected::finance as f;

    Router::new()
        .route("/api/categories", get(f::categories_list).post(f::category_create))
        .route(
            "/api/categories/:id",
            get(f::category_get).put(f::category_update).delete(f::category_delete),
        )
        .route("/api/accounts", get(f::accounts_list).post(f::account_create))
        .route(
            "/api/accounts/:id",
            get(f::account_get).put(f::account_update).delete(f::account_delete),
        )
        .route("/api/petty-cash", get(f::petty_cash_list).post(f::petty_cash_create))
        .route(
            "/api/petty-cash/:id",
            get(f::petty_cash_get).put(f::petty_cash_update).delete(f::petty_cash_delete),
        )
        .route("/api/petty-cash/:id/replenish", post(f::petty_cash_replenish))
        .route("/api/transactions", get(f::transactions_list).post(f::transaction_create))
        .route(
            "/api/transactions/:id",
            get(f::transaction_get).put(f::transaction_update).delete(f::transaction_delete),
        )
        .route("/api/budgets", get(f::budgets_list).post(f::budget_create))
        .route(
            "/api/budgets/:id",
            get(f::budget_get).put(f::budget_update).delete(f::budget_delete),
        )
}

fn activity_routes() -> Router {
    use protected::activities as a;

    Router::new()
        .route("/api/activities", get(a::activities_list).post(a::activity_create))
        .route("/api/activities/upcoming", get(a::activities_upcoming))
        .route(
            "/api/activities/:id",
            get(a::activity_get).put(a::activity_update).delete(a::activity_delete),
        )
        .route(
            "/api/activities/:id/attendance",
            get(a::attendance_list).post(a::attendance_record),
        )
        .route("/api/activities/:id/attendance/summary", get(a::attendance_summary))
        .route(
            "/api/activities/:id/attendance/:member_id",
            axum::routing::delete(a::attendance_remove),
        )
}

fn report_routes() -> Router {
    use protected::reports as r;

    Router::new()
        .route("/api/reports/summary", get(r::report_summary))
        .route("/api/reports/dashboard", get(r::report_dashboard))
        .route("/api/reports/budget", get(r::report_budget))
        .route("/api/reports/giving/:member_id", get(r::report_giving))
        .route("/api/export/transactions.csv", get(r::export_transactions))
        .route("/api/export/members.csv", get(r::export_members))
}

fn cors_layer() -> CorsLayer {
    let security = &CONFIG.security;
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Congrega API",
            "version": version,
            "description": "Congregation administration: members, leadership, finances, activities and reports",
            "currency": CONFIG.finance.currency,
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "login": "/auth/login (public - token acquisition)",
                "session": "/api/auth/whoami, /api/auth/session/refresh, /api/auth/password",
                "users": "/api/users[/:id] (admin)",
                "members": "/api/members[/:id], /api/home-groups[/:id]",
                "leadership": "/api/committees[/:id], /api/deacons[/:id], /api/societies[/:id]",
                "finance": "/api/categories, /api/accounts, /api/petty-cash, /api/transactions, /api/budgets",
                "activities": "/api/activities[/:id][/attendance]",
                "reports": "/api/reports/{summary,dashboard,budget,giving/:member_id}",
                "export": "/api/export/{transactions,members}.csv",
            }
        }
    }))
}

async fn health() -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "Database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database": "unavailable"
                    }
                })),
            )
        }
    }
}
