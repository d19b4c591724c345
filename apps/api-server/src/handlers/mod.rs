//! HTTP handlers and route configuration.

mod blog;
mod health;
mod user;

#[cfg(test)]
mod test_support;

use actix_web::web;

use crate::middleware::error::AppError;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // unreadable bodies get a problem document like every other failure
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    );

    cfg.route("/", web::get().to(health::banner))
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api/v1")
                .service(
                    web::scope("/user")
                        .route("/signup", web::post().to(user::signup))
                        .route("/signin", web::post().to(user::signin))
                        .route("/logout", web::post().to(user::logout))
                        .route("/profile", web::get().to(user::profile))
                        .route("/setting", web::put().to(user::update_settings))
                        .route("/delete", web::delete().to(user::delete_account)),
                )
                .service(
                    web::scope("/blog")
                        // static segments first so they never parse as an id
                        .route("/bulk", web::get().to(blog::bulk))
                        .route("/highlights", web::get().to(blog::highlights))
                        .route("/create", web::post().to(blog::create))
                        .route("/update/{id}", web::put().to(blog::update))
                        .route("/delete/{id}", web::delete().to(blog::delete))
                        .route("/like/{id}", web::put().to(blog::like))
                        .route("/dislike/{id}", web::put().to(blog::dislike))
                        .route("/{id}", web::get().to(blog::get)),
                ),
        );
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use serde_json::Value;

    use super::test_support::{test_app, test_state};

    #[actix_web::test]
    async fn test_banner_and_health() {
        let app = test::init_service(test_app(test_state())).await;

        let banner: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/").to_request(),
        )
        .await;
        assert_eq!(banner["endpoints"]["blogs"], "/api/v1/blog");

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        let health: Value = test::read_body_json(res).await;
        assert_eq!(health["status"], "healthy");
        assert!(health["timestamp"].is_string());
    }

    #[actix_web::test]
    async fn test_malformed_json_is_bad_request() {
        let app = test::init_service(test_app(test_state())).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/user/signup")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"username\": ")
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["title"], "Bad Request");
    }
}
