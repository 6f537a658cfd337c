//! Bearer-token auth gate for HTTP handlers.
//!
//! `AuthContext` is an extractor, so protected handlers simply take it as
//! an argument: extraction fails with 401 when no token is presented and
//! 403 when verification fails, before the handler body runs. The decoded
//! identity is request-scoped state passed explicitly; nothing is stored
//! in ambient globals.

use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};

use crate::domain::{AuthenticatedUser, Error};

use super::state::HttpState;

/// Verified identity extracted from the `Authorization` header.
#[derive(Debug, Clone)]
pub struct AuthContext(AuthenticatedUser);

impl AuthContext {
    /// Borrow the authenticated identity.
    #[must_use]
    pub fn user(&self) -> &AuthenticatedUser {
        &self.0
    }

    /// Consume the context, yielding the identity.
    #[must_use]
    pub fn into_user(self) -> AuthenticatedUser {
        self.0
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, Error> {
    let missing = || Error::unauthorized("access token required");
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(missing)?
        .to_str()
        .map_err(|_| missing())?;
    value.strip_prefix("Bearer ").ok_or_else(missing)
}

fn authenticate(req: &HttpRequest) -> Result<AuthContext, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("http state not configured"))?;
    let token = bearer_token(req)?;
    state
        .tokens
        .verify(token)
        .map(AuthContext)
        .map_err(|_| Error::forbidden("invalid or expired token"))
}

impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::test_support::test_backend;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    async fn whoami(ctx: AuthContext) -> HttpResponse {
        HttpResponse::Ok().body(ctx.user().email.clone())
    }

    #[actix_web::test]
    async fn missing_token_is_unauthorized() {
        let backend = test_backend();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(backend.state.clone()))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get().uri("/whoami").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn garbage_token_is_forbidden() {
        let backend = test_backend();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(backend.state.clone()))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header((header::AUTHORIZATION, "Bearer not-a-token"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn non_bearer_scheme_is_unauthorized() {
        let backend = test_backend();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(backend.state.clone()))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header((header::AUTHORIZATION, "Basic YWxpY2U6cHc="))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn valid_token_passes_identity_through() {
        let backend = test_backend();
        let token = backend.issue_token(7, "alice@example.com", Role::User);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(backend.state.clone()))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert!(res.status().is_success());
        let body = test::read_body(res).await;
        assert_eq!(body, "alice@example.com");
    }
}
