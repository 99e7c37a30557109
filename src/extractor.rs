// src/extractor.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::convert::Infallible;
use uuid::Uuid;

pub const CART_COOKIE: &str = "cart_id";

/// UUID odwiedzającego z ciasteczka, jeśli jest poprawne.
pub fn visitor_id(jar: &CookieJar) -> Option<Uuid> {
    jar.get(CART_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

/// Ciasteczko z nowym UUID. Mini App działa w iframe/webview Telegrama,
/// stąd `SameSite=None; Secure`.
pub fn visitor_cookie(id: Uuid) -> Cookie<'static> {
    Cookie::build((CART_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .build()
}

/// Ekstraktor odwiedzającego. Zawiera `Some(uuid)`, jeśli ciasteczko
/// `cart_id` jest obecne i poprawne, lub `None` w każdym innym przypadku.
pub struct OptionalVisitor(pub Option<Uuid>);

impl<S> FromRequestParts<S> for OptionalVisitor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state).await?;
        Ok(OptionalVisitor(visitor_id(&jar)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, header};

    #[tokio::test]
    async fn reads_valid_cookie() {
        let id = Uuid::new_v4();
        let request = Request::get("/")
            .header(header::COOKIE, format!("{}={}", CART_COOKIE, id))
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();

        let OptionalVisitor(visitor) = OptionalVisitor::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(visitor, Some(id));
    }

    #[tokio::test]
    async fn garbage_cookie_is_ignored() {
        let request = Request::get("/")
            .header(header::COOKIE, "cart_id=not-a-uuid")
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();

        let OptionalVisitor(visitor) = OptionalVisitor::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(visitor, None);
    }

    #[test]
    fn cookie_is_scoped_for_webview() {
        let cookie = visitor_cookie(Uuid::nil());
        assert_eq!(cookie.same_site(), Some(SameSite::None));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }
}
