//! Session helpers keeping handlers free of framework-specific logic.
//!
//! The cookie session carries two values: the authenticated customer id and
//! the cart. Both are exposed through [`SessionContext`] so handlers deal
//! only with domain types; (de)serialisation failures map onto domain
//! errors in one place.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::cart::Cart;

pub(crate) const CUSTOMER_ID_KEY: &str = "customer_id";
pub(crate) const CART_KEY: &str = "cart";

/// Newtype wrapper exposing higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying actix session.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated customer's id.
    pub fn persist_customer(&self, customer_id: Uuid) -> Result<(), Error> {
        self.0
            .insert(CUSTOMER_ID_KEY, customer_id)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// The authenticated customer id, if any.
    ///
    /// A tampered value is treated as an anonymous session rather than an
    /// internal error; the cookie is signed, so this is belt-and-braces.
    pub fn customer_id(&self) -> Result<Option<Uuid>, Error> {
        match self.0.get::<Uuid>(CUSTOMER_ID_KEY) {
            Ok(value) => Ok(value),
            Err(error) => {
                tracing::warn!(%error, "unreadable customer id in session cookie");
                Ok(None)
            }
        }
    }

    /// Require an authenticated customer or fail with `401`.
    pub fn require_customer_id(&self) -> Result<Uuid, Error> {
        self.customer_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// End the authenticated session, keeping the cart.
    pub fn forget_customer(&self) {
        let _ = self.0.remove(CUSTOMER_ID_KEY);
    }

    /// The session cart; a missing or unreadable value is an empty cart.
    pub fn cart(&self) -> Cart {
        match self.0.get::<Cart>(CART_KEY) {
            Ok(Some(cart)) => cart,
            Ok(None) => Cart::empty(),
            Err(error) => {
                tracing::warn!(%error, "unreadable cart in session cookie, resetting");
                Cart::empty()
            }
        }
    }

    /// Persist the cart back into the session.
    pub fn save_cart(&self, cart: &Cart) -> Result<(), Error> {
        self.0
            .insert(CART_KEY, cart)
            .map_err(|error| Error::internal(format!("failed to persist cart: {error}")))
    }

    /// Drop the cart from the session.
    pub fn clear_cart(&self) {
        let _ = self.0.remove(CART_KEY);
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    use super::*;
    use crate::inbound::http::test_utils::test_session_middleware;

    fn session_test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new().wrap(test_session_middleware())
    }

    #[actix_web::test]
    async fn round_trips_customer_id() {
        let customer_id = Uuid::new_v4();
        let app = test::init_service(
            session_test_app()
                .route(
                    "/set",
                    web::get().to(move |session: SessionContext| async move {
                        session.persist_customer(customer_id)?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/get",
                    web::get().to(|session: SessionContext| async move {
                        let id = session.require_customer_id()?;
                        Ok::<_, Error>(HttpResponse::Ok().body(id.to_string()))
                    }),
                ),
        )
        .await;

        let set_res =
            test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        assert_eq!(set_res.status(), StatusCode::OK);
        let cookie = set_res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set");

        let get_res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/get")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(get_res.status(), StatusCode::OK);
        let body = test::read_body(get_res).await;
        assert_eq!(body, customer_id.to_string().as_bytes());
    }

    #[actix_web::test]
    async fn missing_customer_is_unauthorised() {
        let app = test::init_service(session_test_app().route(
            "/require",
            web::get().to(|session: SessionContext| async move {
                let _ = session.require_customer_id()?;
                Ok::<_, Error>(HttpResponse::Ok())
            }),
        ))
        .await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/require").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn cart_round_trips_and_defaults_to_empty() {
        let product_id = Uuid::new_v4();
        let app = test::init_service(
            session_test_app()
                .route(
                    "/add",
                    web::get().to(move |session: SessionContext| async move {
                        let mut cart = session.cart();
                        cart.add(product_id, 2)
                            .map_err(|err| Error::invalid_request(err.to_string()))?;
                        session.save_cart(&cart)?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/count",
                    web::get().to(|session: SessionContext| async move {
                        HttpResponse::Ok().body(session.cart().unit_count().to_string())
                    }),
                ),
        )
        .await;

        let empty_res =
            test::call_service(&app, test::TestRequest::get().uri("/count").to_request()).await;
        assert_eq!(test::read_body(empty_res).await, "0".as_bytes());

        let add_res =
            test::call_service(&app, test::TestRequest::get().uri("/add").to_request()).await;
        let cookie = add_res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set");

        let count_res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/count")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(test::read_body(count_res).await, "2".as_bytes());
    }
}
