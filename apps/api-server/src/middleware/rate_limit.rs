//! Rate limiting middleware.

use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{HeaderName, HeaderValue},
};

use writeflow_core::ports::RateLimiter;
use writeflow_shared::ErrorResponse;

const REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Rate limiting middleware factory.
///
/// Without a limiter every request passes straight through.
pub struct RateLimitMiddleware {
    limiter: Option<Arc<dyn RateLimiter>>,
    trust_proxy: bool,
}

impl RateLimitMiddleware {
    /// Clients are keyed by socket address.
    pub fn new(limiter: Option<Arc<dyn RateLimiter>>) -> Self {
        Self {
            limiter,
            trust_proxy: false,
        }
    }

    /// Key on the client address reported by `Forwarded`/`X-Forwarded-For`.
    pub fn trust_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy = trust;
        self
    }
}

fn client_key(req: &ServiceRequest, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(addr) = req.connection_info().realip_remote_addr() {
            return addr.to_string();
        }
    }
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
            trust_proxy: self.trust_proxy,
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    limiter: Option<Arc<dyn RateLimiter>>,
    trust_proxy: bool,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let Some(limiter) = self.limiter.clone() else {
            return Box::pin(async move { Ok(service.call(req).await?.map_into_left_body()) });
        };

        let key = client_key(&req, self.trust_proxy);

        Box::pin(async move {
            let remaining = match limiter.check(&key).await {
                Ok(result) if !result.allowed => {
                    let retry_after = result.retry_in.as_secs().max(1);
                    tracing::warn!(key = %key, retry_after, "Rate limit exceeded");

                    let response = HttpResponse::TooManyRequests()
                        .insert_header((REMAINING_HEADER, "0"))
                        .insert_header(("Retry-After", retry_after.to_string()))
                        .json(ErrorResponse::too_many_requests(retry_after));

                    return Ok(req.into_response(response).map_into_right_body());
                }
                Ok(result) => Some(result.remaining),
                Err(e) => {
                    tracing::error!("Rate limiter error, failing open: {}", e);
                    None
                }
            };

            let mut res = service.call(req).await?;
            if let Some(remaining) = remaining {
                res.headers_mut().insert(
                    HeaderName::from_static(REMAINING_HEADER),
                    HeaderValue::from(remaining),
                );
            }
            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use actix_web::{App, http::StatusCode, test, web};
    use async_trait::async_trait;
    use writeflow_core::ports::{RateDecision, RateLimitError};

    use super::*;

    /// Admits the first `budget` calls.
    struct Budget(std::sync::atomic::AtomicU32);

    #[async_trait]
    impl RateLimiter for Budget {
        async fn check(&self, _key: &str) -> Result<RateDecision, RateLimitError> {
            use std::sync::atomic::Ordering;
            let left = self.0.load(Ordering::SeqCst);
            if left == 0 {
                return Ok(RateDecision {
                    allowed: false,
                    remaining: 0,
                    retry_in: Duration::from_secs(30),
                });
            }
            self.0.store(left - 1, Ordering::SeqCst);
            Ok(RateDecision {
                allowed: true,
                remaining: left - 1,
                retry_in: Duration::from_secs(60),
            })
        }
    }

    /// Records the keys it is asked about and admits everything.
    #[derive(Default)]
    struct Keys(std::sync::Mutex<Vec<String>>);

    #[async_trait]
    impl RateLimiter for Keys {
        async fn check(&self, key: &str) -> Result<RateDecision, RateLimitError> {
            self.0.lock().unwrap().push(key.to_string());
            Ok(RateDecision {
                allowed: true,
                remaining: 1,
                retry_in: Duration::from_secs(60),
            })
        }
    }

    fn from_peer(forwarded_for: &str) -> actix_web::dev::ServiceRequest {
        test::TestRequest::get()
            .uri("/")
            .peer_addr("10.1.2.3:40000".parse().unwrap())
            .insert_header(("x-forwarded-for", forwarded_for))
            .to_srv_request()
    }

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    #[actix_web::test]
    async fn test_rejects_once_budget_is_spent() {
        let limiter: Arc<dyn RateLimiter> = Arc::new(Budget(1.into()));
        let app = test::init_service(
            App::new()
                .wrap(RateLimitMiddleware::new(Some(limiter)))
                .route("/", web::get().to(ok)),
        )
        .await;

        let first = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(first.headers().get(REMAINING_HEADER).unwrap(), "0");

        let second = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(second.headers().get("Retry-After").unwrap(), "30");
    }

    #[actix_web::test]
    async fn test_passes_through_without_limiter() {
        let app = test::init_service(
            App::new()
                .wrap(RateLimitMiddleware::new(None))
                .route("/", web::get().to(ok)),
        )
        .await;

        for _ in 0..5 {
            let res =
                test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
            assert_eq!(res.status(), StatusCode::OK);
        }
    }

    #[actix_web::test]
    async fn test_forwarded_header_ignored_by_default() {
        let keys = Arc::new(Keys::default());
        let limiter: Arc<dyn RateLimiter> = keys.clone();
        let app = test::init_service(
            App::new()
                .wrap(RateLimitMiddleware::new(Some(limiter)))
                .route("/", web::get().to(ok)),
        )
        .await;

        for spoofed in ["1.1.1.1", "2.2.2.2"] {
            let req = test::TestRequest::get()
                .uri("/")
                .peer_addr("10.1.2.3:40000".parse().unwrap())
                .insert_header(("x-forwarded-for", spoofed))
                .to_request();
            test::call_service(&app, req).await;
        }

        assert_eq!(*keys.0.lock().unwrap(), vec!["10.1.2.3", "10.1.2.3"]);
    }

    #[::core::prelude::v1::test]
    fn test_client_key_source() {
        assert_eq!(client_key(&from_peer("1.1.1.1"), false), "10.1.2.3");
        assert_eq!(client_key(&from_peer("1.1.1.1"), true), "1.1.1.1");
    }
}
