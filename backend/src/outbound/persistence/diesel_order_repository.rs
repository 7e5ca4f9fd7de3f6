//! PostgreSQL-backed order store.
//!
//! Order creation and stock reservation run in one transaction: each line
//! decrements stock through a guarded UPDATE (`stock >= quantity`), so a
//! concurrent checkout can never oversell — the loser's UPDATE touches zero
//! rows and the whole transaction rolls back. Cancellation restores stock
//! the same way in reverse.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use super::diesel_helpers::{diesel_error_message, pool_error_message};
use super::models::{NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow};
use super::pool::{DbPool, PoolError};
use super::schema::{order_items, orders, products};
use crate::domain::customer::EmailAddress;
use crate::domain::money::Money;
use crate::domain::orders::{
    Order, OrderLine, OrderReference, OrderStatus, OrderTotals, ShippingAddress,
};
use crate::domain::ports::{
    NewOrder, OrderRepository, OrderRepositoryError, TransitionOutcome,
};

/// Diesel-backed implementation of the order store port.
#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    /// Create a new repository with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Error type threaded through order transactions.
#[derive(Debug)]
enum OrderTxError {
    Diesel(diesel::result::Error),
    OutOfStock { sku: String },
    IllegalTransition { from: OrderStatus, to: OrderStatus },
    NotFound,
    Corrupt(String),
}

impl From<diesel::result::Error> for OrderTxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn map_pool_error(error: PoolError) -> OrderRepositoryError {
    OrderRepositoryError::connection(pool_error_message(error))
}

fn map_tx_error(error: OrderTxError) -> OrderRepositoryError {
    match error {
        OrderTxError::Diesel(err) => {
            OrderRepositoryError::query(diesel_error_message(&err, "order store"))
        }
        OrderTxError::OutOfStock { sku } => OrderRepositoryError::out_of_stock(sku),
        OrderTxError::IllegalTransition { from, to } => {
            OrderRepositoryError::IllegalTransition { from, to }
        }
        OrderTxError::NotFound => OrderRepositoryError::NotFound,
        OrderTxError::Corrupt(message) => OrderRepositoryError::query(message),
    }
}

fn quantity_for_db(quantity: u32) -> Result<i32, OrderTxError> {
    i32::try_from(quantity).map_err(|_| OrderTxError::Corrupt("quantity out of range".to_owned()))
}

/// Rebuild a domain order from its row and line rows.
fn rows_to_order(row: OrderRow, item_rows: Vec<OrderItemRow>) -> Result<Order, String> {
    let reference =
        OrderReference::parse(&row.reference).ok_or_else(|| "bad order reference".to_owned())?;
    let status = OrderStatus::parse(&row.status)
        .ok_or_else(|| format!("unknown order status: {}", row.status))?;
    let email = EmailAddress::new(row.email).map_err(|e| e.to_string())?;
    let totals = OrderTotals {
        subtotal: Money::from_minor(row.subtotal_minor).map_err(|e| e.to_string())?,
        delivery: Money::from_minor(row.delivery_minor).map_err(|e| e.to_string())?,
        total: Money::from_minor(row.total_minor).map_err(|e| e.to_string())?,
    };
    let lines = item_rows
        .into_iter()
        .map(|item| {
            Ok(OrderLine {
                product_id: item.product_id,
                sku: item.sku,
                name: item.name,
                unit_price: Money::from_minor(item.unit_price_minor).map_err(|e| e.to_string())?,
                quantity: u32::try_from(item.quantity)
                    .map_err(|_| "negative quantity".to_owned())?,
            })
        })
        .collect::<Result<Vec<_>, String>>()?;
    Ok(Order {
        id: row.id,
        reference,
        customer_id: row.customer_id,
        email,
        address: ShippingAddress {
            recipient: row.recipient,
            phone: row.phone,
            city: row.city,
            postcode: row.postcode,
            line1: row.address_line,
            note: row.note,
        },
        lines,
        totals,
        status,
        payment_session_id: row.payment_session_id,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

async fn load_items(
    conn: &mut AsyncPgConnection,
    order_id: Uuid,
) -> Result<Vec<OrderItemRow>, diesel::result::Error> {
    order_items::table
        .filter(order_items::order_id.eq(order_id))
        .select(OrderItemRow::as_select())
        .order_by(order_items::sku)
        .load(conn)
        .await
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn create(&self, new_order: NewOrder) -> Result<Order, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let order_id = Uuid::new_v4();

        let row = conn
            .transaction::<OrderRow, OrderTxError, _>(|conn| {
                async move {
                    for line in &new_order.lines {
                        let quantity = quantity_for_db(line.quantity)?;
                        let reserved = diesel::update(
                            products::table.filter(
                                products::id
                                    .eq(line.product_id)
                                    .and(products::stock.ge(quantity)),
                            ),
                        )
                        .set(products::stock.eq(products::stock - quantity))
                        .execute(conn)
                        .await?;
                        if reserved == 0 {
                            return Err(OrderTxError::OutOfStock {
                                sku: line.sku.clone(),
                            });
                        }
                    }

                    let order_row = NewOrderRow {
                        id: order_id,
                        reference: new_order.reference.as_str(),
                        customer_id: new_order.customer_id,
                        email: new_order.email.as_str(),
                        recipient: &new_order.address.recipient,
                        phone: &new_order.address.phone,
                        city: &new_order.address.city,
                        postcode: &new_order.address.postcode,
                        address_line: &new_order.address.line1,
                        note: new_order.address.note.as_deref(),
                        subtotal_minor: new_order.totals.subtotal.minor(),
                        delivery_minor: new_order.totals.delivery.minor(),
                        total_minor: new_order.totals.total.minor(),
                        status: OrderStatus::Pending.as_str(),
                    };
                    let inserted: OrderRow = diesel::insert_into(orders::table)
                        .values(&order_row)
                        .returning(OrderRow::as_returning())
                        .get_result(conn)
                        .await?;

                    let item_rows = new_order
                        .lines
                        .iter()
                        .map(|line| {
                            Ok(NewOrderItemRow {
                                id: Uuid::new_v4(),
                                order_id,
                                product_id: line.product_id,
                                sku: &line.sku,
                                name: &line.name,
                                unit_price_minor: line.unit_price.minor(),
                                quantity: quantity_for_db(line.quantity)?,
                            })
                        })
                        .collect::<Result<Vec<_>, OrderTxError>>()?;
                    diesel::insert_into(order_items::table)
                        .values(&item_rows)
                        .execute(conn)
                        .await?;

                    Ok(inserted)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_tx_error)?;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let items = load_items(&mut conn, row.id)
            .await
            .map_err(|err| OrderRepositoryError::query(diesel_error_message(&err, "order store")))?;
        rows_to_order(row, items).map_err(OrderRepositoryError::query)
    }

    async fn set_payment_session(
        &self,
        reference: &OrderReference,
        session_id: &str,
    ) -> Result<(), OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(orders::table.filter(orders::reference.eq(reference.as_str())))
            .set((
                orders::payment_session_id.eq(session_id),
                orders::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map_err(|err| OrderRepositoryError::query(diesel_error_message(&err, "order store")))?;
        if updated == 0 {
            return Err(OrderRepositoryError::NotFound);
        }
        Ok(())
    }

    async fn find_by_reference(
        &self,
        reference: &OrderReference,
    ) -> Result<Option<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<OrderRow> = orders::table
            .filter(orders::reference.eq(reference.as_str()))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| OrderRepositoryError::query(diesel_error_message(&err, "order store")))?;
        let Some(row) = row else {
            return Ok(None);
        };
        let items = load_items(&mut conn, row.id)
            .await
            .map_err(|err| OrderRepositoryError::query(diesel_error_message(&err, "order store")))?;
        rows_to_order(row, items)
            .map(Some)
            .map_err(OrderRepositoryError::query)
    }

    async fn list_for_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<OrderRow> = orders::table
            .filter(orders::customer_id.eq(customer_id))
            .select(OrderRow::as_select())
            .order_by(orders::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(|err| OrderRepositoryError::query(diesel_error_message(&err, "order store")))?;

        let order_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let all_items: Vec<OrderItemRow> = order_items::table
            .filter(order_items::order_id.eq_any(order_ids))
            .select(OrderItemRow::as_select())
            .order_by(order_items::sku)
            .load(&mut conn)
            .await
            .map_err(|err| OrderRepositoryError::query(diesel_error_message(&err, "order store")))?;

        rows.into_iter()
            .map(|row| {
                let items = all_items
                    .iter()
                    .filter(|item| item.order_id == row.id)
                    .cloned()
                    .collect();
                rows_to_order(row, items).map_err(OrderRepositoryError::query)
            })
            .collect()
    }

    async fn transition(
        &self,
        reference: &OrderReference,
        next: OrderStatus,
    ) -> Result<TransitionOutcome, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let reference_text = reference.as_str().to_owned();

        let (row, changed) = conn
            .transaction::<(OrderRow, bool), OrderTxError, _>(|conn| {
                async move {
                    let row: OrderRow = orders::table
                        .filter(orders::reference.eq(&reference_text))
                        .select(OrderRow::as_select())
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?
                        .ok_or(OrderTxError::NotFound)?;
                    let current = OrderStatus::parse(&row.status).ok_or_else(|| {
                        OrderTxError::Corrupt(format!("unknown order status: {}", row.status))
                    })?;

                    if current == next {
                        return Ok((row, false));
                    }
                    if !current.can_transition_to(next) {
                        return Err(OrderTxError::IllegalTransition {
                            from: current,
                            to: next,
                        });
                    }

                    let updated: OrderRow =
                        diesel::update(orders::table.filter(orders::id.eq(row.id)))
                            .set((
                                orders::status.eq(next.as_str()),
                                orders::updated_at.eq(Utc::now()),
                            ))
                            .returning(OrderRow::as_returning())
                            .get_result(conn)
                            .await?;

                    if next == OrderStatus::Cancelled {
                        let items = load_items(conn, row.id).await?;
                        for item in items {
                            diesel::update(products::table.filter(products::id.eq(item.product_id)))
                                .set(products::stock.eq(products::stock + item.quantity))
                                .execute(conn)
                                .await?;
                        }
                    }

                    Ok((updated, true))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_tx_error)?;

        let items = load_items(&mut conn, row.id)
            .await
            .map_err(|err| OrderRepositoryError::query(diesel_error_message(&err, "order store")))?;
        let order = rows_to_order(row, items).map_err(OrderRepositoryError::query)?;
        Ok(TransitionOutcome { order, changed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_rows_surface_as_query_errors() {
        let row = OrderRow {
            id: Uuid::new_v4(),
            reference: "not-a-reference".to_owned(),
            customer_id: None,
            email: "ivan@example.bg".to_owned(),
            recipient: "Ivan".to_owned(),
            phone: "0888123456".to_owned(),
            city: "Sofia".to_owned(),
            postcode: "1000".to_owned(),
            address_line: "bul. Vitosha 1".to_owned(),
            note: None,
            subtotal_minor: 100,
            delivery_minor: 0,
            total_minor: 100,
            status: "pending".to_owned(),
            payment_session_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let error = rows_to_order(row, Vec::new()).expect_err("bad reference should fail");
        assert!(error.contains("reference"));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let row = OrderRow {
            id: Uuid::new_v4(),
            reference: "CH-7K2M9QARZX".to_owned(),
            customer_id: None,
            email: "ivan@example.bg".to_owned(),
            recipient: "Ivan".to_owned(),
            phone: "0888123456".to_owned(),
            city: "Sofia".to_owned(),
            postcode: "1000".to_owned(),
            address_line: "bul. Vitosha 1".to_owned(),
            note: None,
            subtotal_minor: 100,
            delivery_minor: 0,
            total_minor: 100,
            status: "refunded".to_owned(),
            payment_session_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let error = rows_to_order(row, Vec::new()).expect_err("bad status should fail");
        assert!(error.contains("status"));
    }
}
