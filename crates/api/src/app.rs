use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use persistence::repositories::{
    AdminStatsRepository, BusinessRepository, FlaggedReviewRepository, LikeRepository,
    ReviewRepository, UserRepository, VoteRepository,
};
use shared::jwt::{JwtConfig, JwtError};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, security_headers_middleware, trace_id,
};
use crate::routes::{admin, auth, businesses, cases, health, reviews, users};
use crate::services::{auth::jwt_from_config, AuthService, ModerationService};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub users: UserRepository,
    pub businesses: BusinessRepository,
    pub reviews: ReviewRepository,
    pub votes: VoteRepository,
    pub likes: LikeRepository,
    pub stats: AdminStatsRepository,
    pub auth: AuthService,
    pub moderation: ModerationService,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool) -> Result<Self, JwtError> {
        let jwt = Arc::new(jwt_from_config(&config.jwt)?);

        let users = UserRepository::new(pool.clone());
        let businesses = BusinessRepository::new(pool.clone());
        let reviews = ReviewRepository::new(pool.clone());
        let flags = FlaggedReviewRepository::new(pool.clone());

        Ok(Self {
            auth: AuthService::new(users.clone(), jwt.clone(), config.admin.clone()),
            moderation: ModerationService::new(flags, reviews.clone(), businesses.clone()),
            votes: VoteRepository::new(pool.clone()),
            likes: LikeRepository::new(pool.clone()),
            stats: AdminStatsRepository::new(pool.clone()),
            users,
            businesses,
            reviews,
            jwt,
            config: Arc::new(config),
            pool,
        })
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Builds the router. Fails only when the configured JWT keys are unusable.
pub fn create_app(config: Config, pool: PgPool) -> Result<Router, JwtError> {
    let cors = cors_layer(&config);
    let timeout = Duration::from_secs(config.server.request_timeout_secs);
    let state = AppState::new(config, pool)?;

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler))
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/businesses/search", get(businesses::search));

    // Authentication is enforced per handler by the UserAuth/AdminAuth extractors.
    let user_routes = Router::new()
        .route(
            "/api/v1/users/me",
            get(users::get_me)
                .put(users::update_me)
                .delete(users::delete_me),
        )
        .route(
            "/api/v1/users/me/liked-businesses",
            get(users::liked_businesses),
        )
        .route("/api/v1/users/me/cases", get(users::my_cases))
        .route("/api/v1/businesses", post(businesses::create_business))
        .route(
            "/api/v1/businesses/:id",
            get(businesses::get_business)
                .put(businesses::update_business)
                .delete(businesses::delete_business),
        )
        .route(
            "/api/v1/businesses/:id/like",
            post(businesses::like_business).delete(businesses::unlike_business),
        )
        .route(
            "/api/v1/businesses/:id/reviews",
            get(businesses::list_reviews).post(businesses::create_review),
        )
        .route("/api/v1/reviews/:id", put(reviews::update_review))
        .route(
            "/api/v1/reviews/:id/response",
            put(reviews::respond_to_review),
        )
        .route("/api/v1/reviews/:id/votes", post(reviews::cast_vote))
        .route("/api/v1/reviews/:id/flags", post(reviews::flag_review))
        .route("/api/v1/cases/:id/appeal", post(cases::file_appeal));

    let admin_routes = Router::new()
        .route("/api/v1/admin/dashboard", get(admin::dashboard))
        .route("/api/v1/admin/users", get(admin::list_users))
        .route(
            "/api/v1/admin/users/:id",
            axum::routing::delete(admin::delete_user),
        )
        .route("/api/v1/admin/businesses", get(admin::list_businesses))
        .route(
            "/api/v1/admin/businesses/:id",
            axum::routing::delete(admin::delete_business),
        )
        .route(
            "/api/v1/admin/flagged-reviews",
            get(admin::list_flagged_reviews),
        )
        .route(
            "/api/v1/admin/flagged-reviews/:id",
            get(admin::get_flagged_review),
        )
        .route(
            "/api/v1/admin/flagged-reviews/:id/decision",
            post(admin::decide_flagged_review),
        )
        .route("/api/v1/admin/appeals", get(admin::list_appeals))
        .route(
            "/api/v1/admin/appeals/:id/decision",
            post(admin::decide_appeal),
        );

    Ok(Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes)
        // bottom layers run first
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(timeout))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state))
}
