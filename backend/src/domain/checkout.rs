//! Checkout orchestration.
//!
//! Composes the catalog read port, order repository, payment gateway, mailer
//! and ops notifier into the cart → order → payment flow. Post-payment
//! side effects (confirmation email, ops notification) are log-and-continue:
//! a paid order must never be failed by a flaky integration.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rand::SeedableRng as _;
use rand::rngs::SmallRng;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use super::cart::Cart;
use super::error::Error;
use super::orders::{Order, OrderLine, OrderReference, OrderStatus, OrderTotals};
use super::ports::{
    CallbackError, CallbackOutcome, CartQuote, CheckoutContact, CheckoutOutcome, CheckoutService,
    MailSender, OrderNotifier, OrderRepository, OrderRepositoryError, OutgoingEmail,
    PaymentEventKind, PaymentGateway, PaymentGatewayError, PaymentSessionRequest, PricedCartLine,
    ProductsQuery, ProductsQueryError,
};
use crate::domain::catalog::Product;

/// Production implementation of the checkout driving port.
pub struct CheckoutServiceImpl {
    products: Arc<dyn ProductsQuery>,
    orders: Arc<dyn OrderRepository>,
    payments: Arc<dyn PaymentGateway>,
    mail: Arc<dyn MailSender>,
    notifier: Arc<dyn OrderNotifier>,
}

impl CheckoutServiceImpl {
    /// Assemble the service from its ports.
    pub fn new(
        products: Arc<dyn ProductsQuery>,
        orders: Arc<dyn OrderRepository>,
        payments: Arc<dyn PaymentGateway>,
        mail: Arc<dyn MailSender>,
        notifier: Arc<dyn OrderNotifier>,
    ) -> Self {
        Self {
            products,
            orders,
            payments,
            mail,
            notifier,
        }
    }

    /// Load the cart's products keyed by id.
    async fn load_products(&self, cart: &Cart) -> Result<HashMap<Uuid, Product>, Error> {
        let ids: Vec<Uuid> = cart.lines().iter().map(|line| line.product_id).collect();
        let products = self
            .products
            .find_by_ids(&ids)
            .await
            .map_err(map_products_error)?;
        Ok(products
            .into_iter()
            .map(|product| (product.id(), product))
            .collect())
    }
}

fn map_products_error(error: ProductsQueryError) -> Error {
    match error {
        ProductsQueryError::Connection { message } => Error::service_unavailable(message),
        ProductsQueryError::Query { message } => Error::internal(message),
    }
}

fn map_order_error(error: OrderRepositoryError) -> Error {
    match error {
        OrderRepositoryError::Connection { message } => Error::service_unavailable(message),
        OrderRepositoryError::Query { message } => Error::internal(message),
        OrderRepositoryError::NotFound => Error::not_found("order not found"),
        OrderRepositoryError::OutOfStock { sku } => {
            Error::out_of_stock(format!("insufficient stock for {sku}"))
        }
        OrderRepositoryError::IllegalTransition { from, to } => Error::conflict(format!(
            "order cannot move from {} to {}",
            from.as_str(),
            to.as_str()
        )),
    }
}

fn map_payment_error(error: PaymentGatewayError) -> Error {
    match error {
        PaymentGatewayError::Timeout { message } | PaymentGatewayError::Transport { message } => {
            Error::service_unavailable(message)
        }
        PaymentGatewayError::Rejected { message } | PaymentGatewayError::Decode { message } => {
            Error::internal(message)
        }
    }
}

fn map_callback_error(error: CallbackError) -> Error {
    match error {
        CallbackError::InvalidSignature => Error::unauthorized("callback signature is invalid"),
        CallbackError::StaleTimestamp => {
            Error::invalid_request("callback timestamp is stale or malformed")
        }
        CallbackError::Malformed { message } => Error::invalid_request(message),
    }
}

/// Render the plain-text order confirmation email.
fn render_confirmation(order: &Order) -> OutgoingEmail {
    let mut text = format!(
        "Hello {},\n\nThank you for your order {}.\n\n",
        order.address.recipient, order.reference
    );
    for line in &order.lines {
        let line_total = line.line_total().unwrap_or(line.unit_price);
        text.push_str(&format!(
            "  {} x{} ({}) - {}\n",
            line.name, line.quantity, line.sku, line_total
        ));
    }
    text.push_str(&format!(
        "\nSubtotal: {}\nDelivery: {}\nTotal: {}\n\nDelivery to: {}, {} {}\n",
        order.totals.subtotal,
        order.totals.delivery,
        order.totals.total,
        order.address.line1,
        order.address.postcode,
        order.address.city,
    ));
    OutgoingEmail {
        to: order.email.clone(),
        subject: format!("Order {} confirmed", order.reference),
        text,
    }
}

#[async_trait]
impl CheckoutService for CheckoutServiceImpl {
    async fn quote(&self, cart: &Cart) -> Result<CartQuote, Error> {
        if cart.is_empty() {
            return Ok(CartQuote::empty());
        }
        let products = self.load_products(cart).await?;

        let mut priced = Vec::with_capacity(cart.lines().len());
        let mut order_lines = Vec::with_capacity(cart.lines().len());
        for line in cart.lines() {
            let Some(product) = products.get(&line.product_id) else {
                // Product removed from the catalog since it was added; the
                // cart cookie will drop it on the next mutation.
                warn!(product_id = %line.product_id, "cart references missing product");
                continue;
            };
            let line_total = product
                .price()
                .checked_mul(line.quantity)
                .map_err(|err| Error::internal(err.to_string()))?;
            priced.push(PricedCartLine {
                product_id: product.id(),
                slug: product.slug().to_owned(),
                sku: product.sku().to_owned(),
                name: product.name().to_owned(),
                unit_price: product.price(),
                quantity: line.quantity,
                line_total,
                available: product.stock(),
            });
            order_lines.push(OrderLine {
                product_id: product.id(),
                sku: product.sku().to_owned(),
                name: product.name().to_owned(),
                unit_price: product.price(),
                quantity: line.quantity,
            });
        }
        if order_lines.is_empty() {
            return Ok(CartQuote::empty());
        }
        let totals =
            OrderTotals::for_lines(&order_lines).map_err(|err| Error::internal(err.to_string()))?;
        Ok(CartQuote::from_parts(priced, totals))
    }

    async fn place_order(
        &self,
        cart: &Cart,
        contact: CheckoutContact,
    ) -> Result<CheckoutOutcome, Error> {
        if cart.is_empty() {
            return Err(Error::invalid_request("cart is empty"));
        }
        let products = self.load_products(cart).await?;

        let mut order_lines = Vec::with_capacity(cart.lines().len());
        let mut shortages = Vec::new();
        for line in cart.lines() {
            let Some(product) = products.get(&line.product_id) else {
                return Err(Error::not_found("a cart item is no longer available")
                    .with_details(json!({ "productId": line.product_id })));
            };
            if i64::from(line.quantity) > i64::from(product.stock().max(0)) {
                shortages.push(json!({
                    "productId": product.id(),
                    "sku": product.sku(),
                    "requested": line.quantity,
                    "available": product.stock().max(0),
                }));
                continue;
            }
            order_lines.push(OrderLine {
                product_id: product.id(),
                sku: product.sku().to_owned(),
                name: product.name().to_owned(),
                unit_price: product.price(),
                quantity: line.quantity,
            });
        }
        if !shortages.is_empty() {
            return Err(Error::out_of_stock("some items exceed available stock")
                .with_details(json!({ "lines": shortages })));
        }

        let totals =
            OrderTotals::for_lines(&order_lines).map_err(|err| Error::internal(err.to_string()))?;
        let reference = OrderReference::generate(&mut SmallRng::from_entropy());
        let order = self
            .orders
            .create(super::ports::NewOrder {
                reference: reference.clone(),
                customer_id: contact.customer_id,
                email: contact.email.clone(),
                address: contact.address,
                lines: order_lines,
                totals,
            })
            .await
            .map_err(map_order_error)?;

        let session = match self
            .payments
            .create_session(&PaymentSessionRequest {
                reference: reference.clone(),
                amount: totals.total,
                email: contact.email,
            })
            .await
        {
            Ok(session) => session,
            Err(err) => {
                // The order cannot be paid without a session; release the
                // reserved stock instead of stranding a Pending order.
                warn!(reference = %reference, error = %err, "payment session failed, cancelling order");
                if let Err(cancel_err) = self
                    .orders
                    .transition(&reference, OrderStatus::Cancelled)
                    .await
                {
                    warn!(reference = %reference, error = %cancel_err, "failed to cancel order after payment failure");
                }
                return Err(map_payment_error(err));
            }
        };
        self.orders
            .set_payment_session(&reference, &session.id)
            .await
            .map_err(map_order_error)?;

        if let Err(err) = self.notifier.order_placed(&order).await {
            warn!(reference = %reference, error = %err, "order-placed notification failed");
        }

        Ok(CheckoutOutcome {
            order,
            redirect_url: session.redirect_url,
        })
    }

    async fn handle_callback(
        &self,
        signature: &str,
        timestamp: &str,
        body: &[u8],
    ) -> Result<CallbackOutcome, Error> {
        let event = self
            .payments
            .parse_callback(signature, timestamp, body)
            .map_err(map_callback_error)?;

        let next = match event.kind {
            PaymentEventKind::Completed => OrderStatus::Paid,
            PaymentEventKind::Failed => OrderStatus::Cancelled,
            PaymentEventKind::Ignored => {
                let order = self
                    .orders
                    .find_by_reference(&event.reference)
                    .await
                    .map_err(map_order_error)?
                    .ok_or_else(|| Error::not_found("order not found"))?;
                return Ok(CallbackOutcome {
                    reference: event.reference,
                    status: order.status,
                    acted: false,
                });
            }
        };

        let outcome = self
            .orders
            .transition(&event.reference, next)
            .await
            .map_err(map_order_error)?;

        if outcome.changed && next == OrderStatus::Paid {
            let email = render_confirmation(&outcome.order);
            if let Err(err) = self.mail.send(&email).await {
                warn!(reference = %event.reference, error = %err, "confirmation email failed");
            }
            if let Err(err) = self.notifier.order_paid(&outcome.order).await {
                warn!(reference = %event.reference, error = %err, "order-paid notification failed");
            }
        }

        Ok(CallbackOutcome {
            reference: event.reference,
            status: outcome.order.status,
            acted: outcome.changed,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Behaviour coverage for the checkout flow over mocked ports.

    use chrono::Utc;
    use mockall::predicate::always;
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::cart::Cart;
    use crate::domain::catalog::{Product, ProductDraft};
    use crate::domain::customer::EmailAddress;
    use crate::domain::money::Money;
    use crate::domain::orders::ShippingAddress;
    use crate::domain::ports::{
        MockMailSender, MockOrderNotifier, MockOrderRepository, MockPaymentGateway,
        MockProductsQuery, PaymentEvent, PaymentSession, TransitionOutcome,
    };

    fn product(stock: i32, price_minor: i64) -> Product {
        Product::new(ProductDraft {
            id: Uuid::new_v4(),
            slug: "brake-pads-front".to_owned(),
            sku: "BP-0986-4612".to_owned(),
            name: "Front brake pads".to_owned(),
            description: String::new(),
            brand_id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            price: Money::from_minor(price_minor).expect("fixture price"),
            compare_at: None,
            stock,
            image_urls: Vec::new(),
            oem_refs: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .expect("valid product fixture")
    }

    fn contact() -> CheckoutContact {
        CheckoutContact {
            customer_id: None,
            email: EmailAddress::new("ivan@example.bg").expect("fixture email"),
            address: ShippingAddress::try_from_parts(
                "Ivan Petrov",
                "0888123456",
                "Sofia",
                "1000",
                "bul. Vitosha 1",
                None,
            )
            .expect("fixture address"),
        }
    }

    fn order_for(new_order: super::super::ports::NewOrder) -> Order {
        let now = Utc::now();
        Order {
            id: Uuid::new_v4(),
            reference: new_order.reference,
            customer_id: new_order.customer_id,
            email: new_order.email,
            address: new_order.address,
            lines: new_order.lines,
            totals: new_order.totals,
            status: OrderStatus::Pending,
            payment_session_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    struct Mocks {
        products: MockProductsQuery,
        orders: MockOrderRepository,
        payments: MockPaymentGateway,
        mail: MockMailSender,
        notifier: MockOrderNotifier,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                products: MockProductsQuery::new(),
                orders: MockOrderRepository::new(),
                payments: MockPaymentGateway::new(),
                mail: MockMailSender::new(),
                notifier: MockOrderNotifier::new(),
            }
        }

        fn into_service(self) -> CheckoutServiceImpl {
            CheckoutServiceImpl::new(
                Arc::new(self.products),
                Arc::new(self.orders),
                Arc::new(self.payments),
                Arc::new(self.mail),
                Arc::new(self.notifier),
            )
        }
    }

    #[tokio::test]
    async fn empty_cart_cannot_check_out() {
        let service = Mocks::new().into_service();
        let err = service
            .place_order(&Cart::empty(), contact())
            .await
            .expect_err("empty cart should be rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn quote_of_empty_cart_is_all_zero() {
        let service = Mocks::new().into_service();
        let quote = service.quote(&Cart::empty()).await.expect("quote");
        assert!(quote.lines.is_empty());
        assert!(quote.total.is_zero());
    }

    #[tokio::test]
    async fn quote_prices_lines_from_live_data() {
        let item = product(10, 5_990);
        let mut cart = Cart::empty();
        cart.add(item.id(), 2).expect("add to cart");

        let mut mocks = Mocks::new();
        let canned = vec![item];
        mocks
            .products
            .expect_find_by_ids()
            .returning(move |_| Ok(canned.clone()));
        let quote = mocks
            .into_service()
            .quote(&cart)
            .await
            .expect("quote should price");
        assert_eq!(quote.lines.len(), 1);
        assert_eq!(quote.subtotal.minor(), 11_980);
        assert_eq!(quote.total.minor(), 11_980 + 690);
    }

    #[tokio::test]
    async fn shortage_is_detected_before_any_write() {
        let item = product(1, 5_990);
        let mut cart = Cart::empty();
        cart.add(item.id(), 3).expect("add to cart");

        let mut mocks = Mocks::new();
        let canned = vec![item];
        mocks
            .products
            .expect_find_by_ids()
            .returning(move |_| Ok(canned.clone()));
        mocks.orders.expect_create().never();

        let err = mocks
            .into_service()
            .place_order(&cart, contact())
            .await
            .expect_err("shortage should be rejected");
        assert_eq!(err.code(), ErrorCode::OutOfStock);
        let details = err.details().expect("shortage details");
        assert_eq!(
            details
                .get("lines")
                .and_then(|lines| lines.as_array())
                .map(Vec::len),
            Some(1)
        );
    }

    #[tokio::test]
    async fn successful_checkout_reserves_creates_session_and_notifies() {
        let item = product(10, 5_990);
        let mut cart = Cart::empty();
        cart.add(item.id(), 1).expect("add to cart");

        let mut mocks = Mocks::new();
        let canned = vec![item];
        mocks
            .products
            .expect_find_by_ids()
            .returning(move |_| Ok(canned.clone()));
        mocks
            .orders
            .expect_create()
            .times(1)
            .returning(|new_order| Ok(order_for(new_order)));
        mocks
            .payments
            .expect_create_session()
            .times(1)
            .returning(|request| {
                Ok(PaymentSession {
                    id: "ps_1".to_owned(),
                    redirect_url: format!("https://pay.example/{}", request.reference),
                })
            });
        mocks
            .orders
            .expect_set_payment_session()
            .with(always(), mockall::predicate::eq("ps_1"))
            .times(1)
            .returning(|_, _| Ok(()));
        mocks
            .notifier
            .expect_order_placed()
            .times(1)
            .returning(|_| Ok(()));

        let outcome = mocks
            .into_service()
            .place_order(&cart, contact())
            .await
            .expect("checkout should succeed");
        assert_eq!(outcome.order.status, OrderStatus::Pending);
        assert!(outcome.redirect_url.contains(outcome.order.reference.as_str()));
    }

    #[tokio::test]
    async fn failed_session_creation_cancels_the_order() {
        let item = product(10, 5_990);
        let mut cart = Cart::empty();
        cart.add(item.id(), 1).expect("add to cart");

        let mut mocks = Mocks::new();
        let canned = vec![item];
        mocks
            .products
            .expect_find_by_ids()
            .returning(move |_| Ok(canned.clone()));
        mocks
            .orders
            .expect_create()
            .returning(|new_order| Ok(order_for(new_order)));
        mocks
            .payments
            .expect_create_session()
            .returning(|_| Err(PaymentGatewayError::timeout("no answer")));
        mocks
            .orders
            .expect_transition()
            .with(always(), mockall::predicate::eq(OrderStatus::Cancelled))
            .times(1)
            .returning(|reference, _| {
                let mut order = order_for(super::super::ports::NewOrder {
                    reference: reference.clone(),
                    customer_id: None,
                    email: EmailAddress::new("ivan@example.bg").expect("fixture email"),
                    address: contact().address,
                    lines: vec![],
                    totals: OrderTotals {
                        subtotal: Money::ZERO,
                        delivery: Money::ZERO,
                        total: Money::ZERO,
                    },
                });
                order.status = OrderStatus::Cancelled;
                Ok(TransitionOutcome {
                    order,
                    changed: true,
                })
            });

        let err = mocks
            .into_service()
            .place_order(&cart, contact())
            .await
            .expect_err("failed session should fail checkout");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }

    fn paid_transition(reference: &OrderReference, changed: bool) -> TransitionOutcome {
        let mut order = order_for(super::super::ports::NewOrder {
            reference: reference.clone(),
            customer_id: None,
            email: EmailAddress::new("ivan@example.bg").expect("fixture email"),
            address: contact().address,
            lines: vec![OrderLine {
                product_id: Uuid::new_v4(),
                sku: "BP-0986-4612".to_owned(),
                name: "Front brake pads".to_owned(),
                unit_price: Money::from_minor(5_990).expect("fixture"),
                quantity: 1,
            }],
            totals: OrderTotals {
                subtotal: Money::from_minor(5_990).expect("fixture"),
                delivery: Money::from_minor(690).expect("fixture"),
                total: Money::from_minor(6_680).expect("fixture"),
            },
        });
        order.status = OrderStatus::Paid;
        TransitionOutcome { order, changed }
    }

    #[rstest]
    #[case::first_delivery(true, 1)]
    #[case::replay(false, 0)]
    #[tokio::test]
    async fn completed_callback_sends_email_exactly_once(
        #[case] changed: bool,
        #[case] expected_sends: usize,
    ) {
        let mut mocks = Mocks::new();
        mocks.payments.expect_parse_callback().returning(|_, _, _| {
            Ok(PaymentEvent {
                kind: PaymentEventKind::Completed,
                reference: OrderReference::parse("CH-7K2M9QARZX").expect("fixture reference"),
                session_id: "ps_1".to_owned(),
            })
        });
        mocks
            .orders
            .expect_transition()
            .returning(move |reference, _| Ok(paid_transition(reference, changed)));
        mocks
            .mail
            .expect_send()
            .times(expected_sends)
            .returning(|_| Ok(()));
        mocks
            .notifier
            .expect_order_paid()
            .times(expected_sends)
            .returning(|_| Ok(()));

        let outcome = mocks
            .into_service()
            .handle_callback("sig", "0", b"{}")
            .await
            .expect("callback should process");
        assert_eq!(outcome.acted, changed);
        assert_eq!(outcome.status, OrderStatus::Paid);
    }

    #[tokio::test]
    async fn email_failure_does_not_fail_the_callback() {
        let mut mocks = Mocks::new();
        mocks.payments.expect_parse_callback().returning(|_, _, _| {
            Ok(PaymentEvent {
                kind: PaymentEventKind::Completed,
                reference: OrderReference::parse("CH-7K2M9QARZX").expect("fixture reference"),
                session_id: "ps_1".to_owned(),
            })
        });
        mocks
            .orders
            .expect_transition()
            .returning(|reference, _| Ok(paid_transition(reference, true)));
        mocks
            .mail
            .expect_send()
            .returning(|_| Err(crate::domain::ports::MailError::timeout("smtp down")));
        mocks.notifier.expect_order_paid().returning(|_| Ok(()));

        let outcome = mocks
            .into_service()
            .handle_callback("sig", "0", b"{}")
            .await
            .expect("callback should still succeed");
        assert!(outcome.acted);
    }

    #[tokio::test]
    async fn forged_callback_is_unauthorized() {
        let mut mocks = Mocks::new();
        mocks
            .payments
            .expect_parse_callback()
            .returning(|_, _, _| Err(CallbackError::InvalidSignature));
        let err = mocks
            .into_service()
            .handle_callback("forged", "0", b"{}")
            .await
            .expect_err("forged callback");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[test]
    fn confirmation_email_lists_lines_and_totals() {
        let reference = OrderReference::parse("CH-7K2M9QARZX").expect("fixture reference");
        let outcome = paid_transition(&reference, true);
        let email = render_confirmation(&outcome.order);
        assert_eq!(email.subject, "Order CH-7K2M9QARZX confirmed");
        assert!(email.text.contains("Front brake pads x1"));
        assert!(email.text.contains("Total: 66.80 lv."));
    }
}
