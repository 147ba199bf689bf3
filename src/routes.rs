use crate::{
    api::{attendance, deduction, employee, loan, profile, reports, stats, workplace},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
    error::AppError,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

type LimiterConfig = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-route-group limiters. Built once and shared by every worker, so the
/// quota is per peer IP across the whole server.
#[derive(Clone)]
pub struct RateLimits {
    login: LimiterConfig,
    signup: LimiterConfig,
    refresh: LimiterConfig,
    protected: LimiterConfig,
}

impl RateLimits {
    pub fn new(config: &Config) -> Self {
        Self {
            login: build_limiter(config.rate_login_per_min),
            signup: build_limiter(config.rate_signup_per_min),
            refresh: build_limiter(config.rate_refresh_per_min),
            protected: build_limiter(config.rate_protected_per_min),
        }
    }
}

fn build_limiter(requests_per_min: u32) -> LimiterConfig {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);

    GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        // period and burst are both clamped to at least 1 above
        .expect("rate limiter config is valid")
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(1 << 20)
        .error_handler(|err, _req| AppError::bad_request(format!("Invalid JSON payload: {err}")).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::bad_request(format!("Invalid query string: {err}")).into())
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|_err, _req| AppError::not_found("Resource not found").into())
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limits: &RateLimits) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(path_config());

    cfg.service(
        web::scope(&config.api_prefix)
            // Public routes
            .service(
                web::resource("/auth/login")
                    .wrap(Governor::new(&limits.login))
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/signup")
                    .wrap(Governor::new(&limits.signup))
                    .route(web::post().to(handlers::signup)),
            )
            .service(
                web::resource("/auth/signup")
                    .wrap(Governor::new(&limits.signup))
                    .route(web::post().to(handlers::signup)),
            )
            .service(
                web::resource("/validate-token")
                    .wrap(Governor::new(&limits.protected))
                    .route(web::get().to(handlers::validate_token)),
            )
            .service(
                web::resource("/auth/validate-token")
                    .wrap(Governor::new(&limits.protected))
                    .route(web::get().to(handlers::validate_token)),
            )
            .service(
                web::resource("/auth/refresh")
                    .wrap(Governor::new(&limits.refresh))
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/auth/logout")
                    .wrap(Governor::new(&limits.refresh))
                    .route(web::post().to(handlers::logout)),
            )
            // Protected routes
            .service(
                web::scope("")
                    .wrap(from_fn(auth_middleware)) // authentication
                    .wrap(Governor::new(&limits.protected)) // rate limiting
                    .service(
                        web::scope("/employees")
                            // /employees
                            .service(
                                web::resource("")
                                    .route(web::get().to(employee::list_employees))
                                    .route(web::post().to(employee::create_employee)),
                            )
                            // /employees/{id}
                            .service(
                                web::resource("/{id}")
                                    .route(web::get().to(employee::get_employee))
                                    .route(web::put().to(employee::update_employee))
                                    .route(web::delete().to(employee::delete_employee)),
                            ),
                    )
                    .service(
                        web::scope("/workplaces")
                            .service(
                                web::resource("")
                                    .route(web::get().to(workplace::list_workplaces))
                                    .route(web::post().to(workplace::create_workplace)),
                            )
                            .service(
                                web::resource("/{id}")
                                    .route(web::get().to(workplace::get_workplace))
                                    .route(web::put().to(workplace::update_workplace))
                                    .route(web::delete().to(workplace::delete_workplace)),
                            ),
                    )
                    .service(
                        web::scope("/deductions")
                            .service(
                                web::resource("")
                                    .route(web::get().to(deduction::list_deductions))
                                    .route(web::post().to(deduction::create_deduction)),
                            )
                            .service(
                                web::resource("/{id}")
                                    .route(web::get().to(deduction::get_deduction))
                                    .route(web::put().to(deduction::update_deduction))
                                    .route(web::delete().to(deduction::delete_deduction)),
                            ),
                    )
                    .service(
                        web::scope("/loans")
                            .service(
                                web::resource("")
                                    .route(web::get().to(loan::list_loans))
                                    .route(web::post().to(loan::create_loan)),
                            )
                            .service(
                                web::resource("/{id}")
                                    .route(web::get().to(loan::get_loan))
                                    .route(web::put().to(loan::update_loan))
                                    .route(web::delete().to(loan::delete_loan)),
                            ),
                    )
                    .service(
                        web::scope("/attendance")
                            // /attendance?date=
                            .service(
                                web::resource("")
                                    .route(web::get().to(attendance::list_attendance))
                                    .route(web::post().to(attendance::save_attendance)),
                            )
                            // /attendance/summary
                            .service(
                                web::resource("/summary")
                                    .route(web::get().to(reports::attendance_summary)),
                            ),
                    )
                    .service(
                        web::resource("/salary/summary").route(web::get().to(reports::salary_summary)),
                    )
                    .service(
                        web::scope("/stats")
                            .service(web::resource("/daily").route(web::get().to(stats::daily)))
                            .service(web::resource("/weekly").route(web::get().to(stats::weekly)))
                            .service(web::resource("/dashstats").route(web::get().to(stats::dashstats)))
                            .service(
                                web::resource("/recent-activity")
                                    .route(web::get().to(stats::recent_activity)),
                            ),
                    )
                    .service(
                        web::resource("/profile")
                            .route(web::get().to(profile::get_profile))
                            .route(web::put().to(profile::update_profile)),
                    ),
            ),
    );
}

// LOGIN / SIGNUP
//  ├─ token          (access, 1 hour)
//  └─ refresh_token  (7 days)

// API REQUEST
//  └─ Authorization: Bearer token

// ACCESS EXPIRED
//  └─ POST /auth/refresh with refresh_token
//       └─ returns a new pair, old refresh_token revoked

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, web};
    use serde_json::Value;

    use crate::{store::Store, test_support as ts};

    #[actix_web::test]
    async fn protected_routes_need_a_token() {
        let app = test::init_service(ts::app(web::Data::new(Store::new()))).await;

        let resp = test::call_service(&app, ts::get("/api/employees").to_request()).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Token required");

        let resp = test::call_service(
            &app,
            ts::get("/api/employees")
                .insert_header(("Authorization", "Bearer"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Token missing");

        let resp = test::call_service(
            &app,
            ts::get("/api/employees")
                .insert_header(ts::bearer("not.a.jwt"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Invalid token");
    }

    #[actix_web::test]
    async fn refresh_token_is_not_an_access_token() {
        let store = web::Data::new(Store::new());
        let app = test::init_service(ts::app(store.clone())).await;
        let tokens = ts::register(&store, "ann@x.com");

        let resp = test::call_service(
            &app,
            ts::get("/api/profile")
                .insert_header(ts::bearer(&tokens.refresh_token))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn malformed_json_is_a_bad_request_with_message() {
        let store = web::Data::new(Store::new());
        let app = test::init_service(ts::app(store.clone())).await;
        let token = ts::register(&store, "ann@x.com").token;

        let resp = test::call_service(
            &app,
            ts::post("/api/workplaces")
                .insert_header(ts::bearer(&token))
                .insert_header(("Content-Type", "application/json"))
                .set_payload("{not json")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["message"].as_str().unwrap().starts_with("Invalid JSON payload"));
    }

    #[actix_web::test]
    async fn non_numeric_id_is_not_found() {
        let store = web::Data::new(Store::new());
        let app = test::init_service(ts::app(store.clone())).await;
        let token = ts::register(&store, "ann@x.com").token;

        let resp = test::call_service(
            &app,
            ts::get("/api/employees/abc").insert_header(ts::bearer(&token)).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn login_is_rate_limited_per_peer() {
        let mut config = crate::config::Config::for_tests();
        config.rate_login_per_min = 2;
        let app = test::init_service(ts::app_with_config(web::Data::new(Store::new()), config)).await;

        let mut statuses = Vec::new();
        for _ in 0..3 {
            let resp = test::call_service(
                &app,
                ts::post("/api/auth/login")
                    .set_json(serde_json::json!({"email": "", "password": ""}))
                    .to_request(),
            )
            .await;
            statuses.push(resp.status());
        }

        assert_eq!(statuses[0], StatusCode::BAD_REQUEST);
        assert_eq!(statuses[2], StatusCode::TOO_MANY_REQUESTS);
    }

    #[actix_web::test]
    async fn logout_does_not_spend_the_login_quota() {
        let mut config = crate::config::Config::for_tests();
        config.rate_login_per_min = 1;
        let app = test::init_service(ts::app_with_config(web::Data::new(Store::new()), config)).await;

        for _ in 0..3 {
            let resp = test::call_service(&app, ts::post("/api/auth/logout").to_request()).await;
            assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        }

        let resp = test::call_service(
            &app,
            ts::post("/api/auth/login")
                .set_json(serde_json::json!({"email": "", "password": ""}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
