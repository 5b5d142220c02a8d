use std::collections::BTreeMap;

use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, Order, OrderItem, OrderWithItems},
    traits::InsertOrderResult,
};

/// Inserts the order and its resolvable items, unless an order for the same checkout session already exists.
///
/// The insert must be the first statement of the caller's transaction. The unique index on `stripe_session_id` decides
/// whether the session is new, including when two deliveries of the same session race each other.
///
/// This is not atomic. Run it inside a transaction (`&mut *tx`) so that a failure while inserting items does not leave
/// a half-written order behind.
pub async fn idempotent_insert(
    order: &NewOrder,
    conn: &mut SqliteConnection,
) -> Result<InsertOrderResult, sqlx::Error> {
    let id = match insert_order(order, conn).await {
        Ok(id) => id,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            debug!("🗃️ An order for session {} already exists", order.stripe_session_id);
            return match order_id_for_session(&order.stripe_session_id, conn).await? {
                Some(id) => Ok(InsertOrderResult::AlreadyExists(id)),
                None => Err(sqlx::Error::Database(e)),
            };
        },
        Err(e) => return Err(e),
    };
    let mut count = 0;
    for (vinyl_id, item) in order.resolved_items() {
        insert_order_item(id, vinyl_id, item.quantity, item.price.value(), conn).await?;
        count += 1;
    }
    let dropped = order.items.len() - count;
    if dropped > 0 {
        debug!("🗃️ {dropped} line item(s) of session {} had no vinyl id and were not stored", order.stripe_session_id);
    }
    trace!("🗃️ Order #{id} stored with {count} items");
    Ok(InsertOrderResult::Inserted(id))
}

async fn insert_order(order: &NewOrder, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let id = sqlx::query_scalar(
        r#"
            INSERT INTO orders (email, stripe_session_id, stripe_payment_intent_id, total_amount)
            VALUES ($1, $2, $3, $4)
            RETURNING id;
        "#,
    )
    .bind(&order.email)
    .bind(&order.stripe_session_id)
    .bind(&order.stripe_payment_intent_id)
    .bind(order.total_amount.value())
    .fetch_one(conn)
    .await?;
    Ok(id)
}

async fn insert_order_item(
    order_id: i64,
    vinyl_id: i64,
    quantity: i64,
    price: i64,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO order_items (order_id, vinyl_id, quantity, price) VALUES ($1, $2, $3, $4)")
        .bind(order_id)
        .bind(vinyl_id)
        .bind(quantity)
        .bind(price)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn order_id_for_session(session_id: &str, conn: &mut SqliteConnection) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar("SELECT id FROM orders WHERE stripe_session_id = $1")
        .bind(session_id)
        .fetch_optional(conn)
        .await
}

pub async fn fetch_order_by_session_id(
    session_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<OrderWithItems>, sqlx::Error> {
    let order: Option<Order> = sqlx::query_as("SELECT * FROM orders WHERE stripe_session_id = $1")
        .bind(session_id)
        .fetch_optional(&mut *conn)
        .await?;
    let Some(order) = order else {
        return Ok(None);
    };
    let items = fetch_items_for_order(order.id, conn).await?;
    Ok(Some(OrderWithItems { order, items }))
}

pub async fn fetch_items_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id ASC").bind(order_id).fetch_all(conn).await
}

/// Fetches every order with its items. Items are loaded with a second query and grouped in memory, so this costs two
/// round trips regardless of the number of orders.
pub async fn fetch_all_orders(conn: &mut SqliteConnection) -> Result<Vec<OrderWithItems>, sqlx::Error> {
    let orders: Vec<Order> = sqlx::query_as("SELECT * FROM orders ORDER BY id ASC").fetch_all(&mut *conn).await?;
    let items: Vec<OrderItem> =
        sqlx::query_as("SELECT * FROM order_items ORDER BY order_id ASC, id ASC").fetch_all(conn).await?;
    let mut grouped = BTreeMap::<i64, Vec<OrderItem>>::new();
    for item in items {
        grouped.entry(item.order_id).or_default().push(item);
    }
    let result = orders
        .into_iter()
        .map(|order| {
            let items = grouped.remove(&order.id).unwrap_or_default();
            OrderWithItems { order, items }
        })
        .collect();
    Ok(result)
}
