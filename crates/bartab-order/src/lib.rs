//! Order lifecycle management for the bartab system.
//!
//! [`OrderStore`] is the single stateful component of the core: a small
//! persistent state machine tracking a customer order through building,
//! submission, and post-submission editing. Every mutation reads the
//! current snapshot, applies a transition, persists the new snapshot,
//! and returns it. The store assumes a single writer per order id;
//! concurrent writers to the same id are not coordinated and the last
//! writer wins.

use bartab_storage::{StorageError, StorageService};
use bartab_types::{
	ItemMode, ItemRequest, KeyPrefix, LineItem, Order, OrderRecord, PaymentMethod,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors surfaced by the order store.
///
/// A missing or unreadable order is not an error; those come back as
/// `Ok(None)`. Only backend failures propagate.
#[derive(Debug, Error)]
pub enum OrderStoreError {
	/// The underlying store rejected a read or write.
	#[error("Storage error: {0}")]
	Storage(String),
}

/// Tunable limits for the order store.
#[derive(Debug, Clone, Default)]
pub struct OrderStoreConfig {
	/// Optional cap on the total number of lines an order may hold.
	/// `None` means unlimited. Hitting the cap is not an error: the
	/// offending append becomes a no-op returning the unchanged order.
	pub max_items_per_order: Option<usize>,
}

/// The order lifecycle manager: state machine plus persistence adapter,
/// keyed by an opaque order identifier.
pub struct OrderStore {
	storage: Arc<StorageService>,
	config: OrderStoreConfig,
}

impl OrderStore {
	/// Creates a store with default (unlimited) configuration.
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self::with_config(storage, OrderStoreConfig::default())
	}

	/// Creates a store with explicit limits.
	pub fn with_config(storage: Arc<StorageService>, config: OrderStoreConfig) -> Self {
		Self { storage, config }
	}

	/// Initializes a new order in the building state, persists it, and
	/// returns it. Fails only if persistence fails.
	pub async fn create(&self, id: &str) -> Result<Order, OrderStoreError> {
		let order = Order::new(id);
		self.save(&order).await?;
		debug!(order_id = %id, "created order");
		Ok(order)
	}

	/// Loads the persisted order for `id`. A missing record returns
	/// `None`; so does a record that fails to parse — corrupt records
	/// are treated as missing rather than crashing the caller.
	pub async fn get(&self, id: &str) -> Result<Option<Order>, OrderStoreError> {
		match self
			.storage
			.retrieve::<OrderRecord>(KeyPrefix::Orders, id)
			.await
		{
			Ok(record) => Ok(Some(record.order)),
			Err(StorageError::NotFound) => Ok(None),
			Err(StorageError::Serialization(e)) => {
				warn!(order_id = %id, error = %e, "corrupt order record treated as missing");
				Ok(None)
			},
			Err(e) => Err(OrderStoreError::Storage(e.to_string())),
		}
	}

	/// Expands the requests into line items and appends them according
	/// to the mode. Returns `None` if the order does not exist; no
	/// record is created as a side effect.
	///
	/// While building, both modes append to the cart. After submission,
	/// edit-mode appends grow the edit set and move the order into an
	/// edit session; cart-mode appends leave it unchanged. If the
	/// configured item cap would be exceeded, nothing is appended and
	/// the unchanged order is returned.
	pub async fn add_items(
		&self,
		id: &str,
		requests: &[ItemRequest],
		mode: ItemMode,
	) -> Result<Option<Order>, OrderStoreError> {
		let Some(order) = self.get(id).await? else {
			return Ok(None);
		};

		if let Some(cap) = self.config.max_items_per_order {
			let current = order.cart_items().len();
			if current + requests.len() > cap {
				warn!(
					order_id = %id,
					current,
					adding = requests.len(),
					cap,
					"item cap would be exceeded; leaving order unchanged"
				);
				return Ok(Some(order));
			}
		}

		let is_new = mode == ItemMode::Edit;
		let lines: Vec<LineItem> = requests.iter().map(|r| r.expand(is_new)).collect();
		let added = lines.len();
		let (order, changed) = order.add_lines(lines, mode);
		if changed {
			self.save(&order).await?;
			debug!(order_id = %id, added, state = %order.state, "appended items");
		}
		Ok(Some(order))
	}

	/// Submits the order. The first submission moves the cart into the
	/// frozen original set, locks payment, and stamps the submission
	/// time; re-invoking while already submitted or editing only
	/// updates the gratuity. Returns `None` if the order does not
	/// exist.
	pub async fn submit(
		&self,
		id: &str,
		method: PaymentMethod,
		gratuity: Decimal,
	) -> Result<Option<Order>, OrderStoreError> {
		let Some(order) = self.get(id).await? else {
			return Ok(None);
		};

		if order.gratuity != gratuity {
			debug!(order_id = %id, from = %order.gratuity, to = %gratuity, "gratuity updated");
		}
		let order = order.submit(method, gratuity);
		self.save(&order).await?;
		debug!(order_id = %id, state = %order.state, "order submitted");
		Ok(Some(order))
	}

	/// Updates the gratuity percentage in any state. Persists only
	/// when the value actually changes.
	pub async fn update_gratuity(
		&self,
		id: &str,
		gratuity: Decimal,
	) -> Result<Option<Order>, OrderStoreError> {
		let Some(mut order) = self.get(id).await? else {
			return Ok(None);
		};

		if order.gratuity != gratuity {
			debug!(order_id = %id, from = %order.gratuity, to = %gratuity, "gratuity changed");
			order.gratuity = gratuity;
			self.save(&order).await?;
		}
		Ok(Some(order))
	}

	/// Deletes the persisted record. Deleting a missing id is not an
	/// error.
	pub async fn clear(&self, id: &str) -> Result<(), OrderStoreError> {
		self.storage
			.remove(KeyPrefix::Orders, id)
			.await
			.map_err(|e| OrderStoreError::Storage(e.to_string()))
	}

	/// Enumerates every persisted order. Malformed records are skipped,
	/// not fatal. Diagnostics only.
	pub async fn list_all(&self) -> Result<Vec<Order>, OrderStoreError> {
		let ids = self
			.storage
			.ids(KeyPrefix::Orders)
			.await
			.map_err(|e| OrderStoreError::Storage(e.to_string()))?;

		let mut orders = Vec::with_capacity(ids.len());
		for id in ids {
			if let Some(order) = self.get(&id).await? {
				orders.push(order);
			}
		}
		Ok(orders)
	}

	/// Persists a snapshot, stamping the save time.
	async fn save(&self, order: &Order) -> Result<(), OrderStoreError> {
		let record = OrderRecord::new(order.clone());
		self.storage
			.store(KeyPrefix::Orders, &order.id, &record)
			.await
			.map_err(|e| OrderStoreError::Storage(e.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bartab_storage::implementations::memory::MemoryStorage;
	use bartab_types::{generate_order_id, OrderState, DEFAULT_GRATUITY};

	fn new_store() -> (OrderStore, Arc<StorageService>) {
		let service = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		(OrderStore::new(service.clone()), service)
	}

	fn request(id: &str, dollars: i64, quantity: u32) -> ItemRequest {
		ItemRequest {
			catalog_id: id.to_string(),
			name: id.to_string(),
			price: Decimal::from(dollars),
			quantity,
			category: "test".to_string(),
		}
	}

	#[tokio::test]
	async fn create_then_get_round_trips() {
		let (store, _) = new_store();
		let id = generate_order_id();
		let created = store.create(&id).await.unwrap();

		assert!(matches!(created.state, OrderState::Building { .. }));
		assert_eq!(created.gratuity, DEFAULT_GRATUITY);
		assert!(created.cart_items().is_empty());
		let totals = created.totals();
		assert_eq!(totals.subtotal, Decimal::ZERO);
		assert_eq!(totals.total, Decimal::ZERO);

		let loaded = store.get(&id).await.unwrap().unwrap();
		assert_eq!(loaded, created);
	}

	#[tokio::test]
	async fn get_missing_returns_none() {
		let (store, _) = new_store();
		assert!(store.get("ORD-MISSING00").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn building_accumulates_across_calls() {
		let (store, _) = new_store();
		let id = generate_order_id();
		store.create(&id).await.unwrap();

		store
			.add_items(&id, &[request("c1", 12, 2)], ItemMode::Cart)
			.await
			.unwrap()
			.unwrap();
		let order = store
			.add_items(
				&id,
				&[request("b1", 8, 1), request("w1", 10, 1)],
				ItemMode::Cart,
			)
			.await
			.unwrap()
			.unwrap();

		// One line per request, not per quantity unit.
		assert_eq!(order.cart_items().len(), 3);
		assert!(matches!(order.state, OrderState::Building { .. }));
	}

	#[tokio::test]
	async fn scenario_totals_through_submission() {
		let (store, _) = new_store();
		let id = generate_order_id();
		store.create(&id).await.unwrap();

		let order = store
			.add_items(
				&id,
				&[request("c1", 12, 2), request("c1", 12, 1)],
				ItemMode::Cart,
			)
			.await
			.unwrap()
			.unwrap();
		assert_eq!(order.totals().subtotal, Decimal::new(3600, 2));

		let order = store
			.submit(&id, PaymentMethod::Card, Decimal::from(15))
			.await
			.unwrap()
			.unwrap();
		let totals = order.totals();
		assert_eq!(totals.subtotal, Decimal::new(3600, 2));
		assert_eq!(totals.gratuity_amount, Decimal::new(540, 2));
		assert_eq!(totals.total, Decimal::new(4140, 2));
	}

	#[tokio::test]
	async fn edit_session_after_card_submission() {
		let (store, _) = new_store();
		let id = generate_order_id();
		store.create(&id).await.unwrap();
		store
			.add_items(&id, &[request("s2", 16, 1)], ItemMode::Cart)
			.await
			.unwrap();

		let order = store
			.submit(&id, PaymentMethod::Card, Decimal::from(15))
			.await
			.unwrap()
			.unwrap();
		let payment = order.payment().unwrap().clone();
		assert_eq!(payment.method, PaymentMethod::Card);
		assert!(payment.is_locked);
		assert_eq!(payment.last_four.as_deref(), Some("1234"));
		let before = order.all_items().len();

		let order = store
			.add_items(&id, &[request("d1", 8, 1)], ItemMode::Edit)
			.await
			.unwrap()
			.unwrap();
		assert!(matches!(order.state, OrderState::Editing { .. }));
		assert_eq!(order.all_items().len(), before + 1);
		assert_eq!(order.current_session_items().len(), 1);
		assert!(order.current_session_items()[0].is_new);
		match &order.state {
			OrderState::Editing { original_items, .. } => assert_eq!(original_items.len(), before),
			other => panic!("unexpected state: {other}"),
		}

		// The persisted snapshot reflects the edit session.
		let reloaded = store.get(&id).await.unwrap().unwrap();
		assert_eq!(reloaded, order);
	}

	#[tokio::test]
	async fn add_items_on_missing_order_has_no_side_effect() {
		let (store, service) = new_store();
		let result = store
			.add_items("ORD-NOSUCH000", &[request("c1", 12, 1)], ItemMode::Cart)
			.await
			.unwrap();
		assert!(result.is_none());
		assert!(!service
			.exists(KeyPrefix::Orders, "ORD-NOSUCH000")
			.await
			.unwrap());
	}

	#[tokio::test]
	async fn submit_on_missing_order_returns_none() {
		let (store, _) = new_store();
		let result = store
			.submit("ORD-NOSUCH000", PaymentMethod::Cash, Decimal::from(15))
			.await
			.unwrap();
		assert!(result.is_none());
	}

	#[tokio::test]
	async fn resubmit_is_idempotent_except_gratuity() {
		let (store, _) = new_store();
		let id = generate_order_id();
		store.create(&id).await.unwrap();
		store
			.add_items(&id, &[request("e2", 32, 1)], ItemMode::Cart)
			.await
			.unwrap();

		let first = store
			.submit(&id, PaymentMethod::Card, Decimal::from(15))
			.await
			.unwrap()
			.unwrap();

		let second = store
			.submit(&id, PaymentMethod::Cash, Decimal::from(20))
			.await
			.unwrap()
			.unwrap();
		assert_eq!(second.gratuity, Decimal::from(20));
		assert_eq!(second.payment(), first.payment());
		assert_eq!(second.submitted_at, first.submitted_at);
		assert_eq!(second.all_items(), first.all_items());
		assert!(matches!(second.state, OrderState::Submitted { .. }));
	}

	#[tokio::test]
	async fn item_cap_makes_append_a_no_op() {
		let service = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		let store = OrderStore::with_config(
			service,
			OrderStoreConfig {
				max_items_per_order: Some(2),
			},
		);
		let id = generate_order_id();
		store.create(&id).await.unwrap();

		// Three at once would exceed the cap of two.
		let order = store
			.add_items(
				&id,
				&[request("a1", 12, 1), request("a2", 9, 1), request("a3", 13, 1)],
				ItemMode::Cart,
			)
			.await
			.unwrap()
			.unwrap();
		assert!(order.cart_items().is_empty());

		let order = store
			.add_items(&id, &[request("a1", 12, 1), request("a2", 9, 1)], ItemMode::Cart)
			.await
			.unwrap()
			.unwrap();
		assert_eq!(order.cart_items().len(), 2);

		// At the cap, one more is rejected unchanged.
		let order = store
			.add_items(&id, &[request("a3", 13, 1)], ItemMode::Cart)
			.await
			.unwrap()
			.unwrap();
		assert_eq!(order.cart_items().len(), 2);
	}

	#[tokio::test]
	async fn all_items_length_never_decreases() {
		let (store, _) = new_store();
		let id = generate_order_id();
		store.create(&id).await.unwrap();

		let mut last_len = 0;
		let mut check = |order: &Order| {
			let len = order.all_items().len();
			assert!(len >= last_len);
			last_len = len;
		};

		let order = store
			.add_items(&id, &[request("c1", 12, 1)], ItemMode::Cart)
			.await
			.unwrap()
			.unwrap();
		check(&order);
		let order = store
			.submit(&id, PaymentMethod::ApplePay, Decimal::from(15))
			.await
			.unwrap()
			.unwrap();
		check(&order);
		let order = store
			.add_items(&id, &[request("c2", 14, 1)], ItemMode::Edit)
			.await
			.unwrap()
			.unwrap();
		check(&order);
		let order = store
			.submit(&id, PaymentMethod::ApplePay, Decimal::from(18))
			.await
			.unwrap()
			.unwrap();
		check(&order);
	}

	#[tokio::test]
	async fn zero_quantity_accepted_as_given() {
		// No validation layer exists; current behavior, not necessarily
		// desired.
		let (store, _) = new_store();
		let id = generate_order_id();
		store.create(&id).await.unwrap();

		let order = store
			.add_items(&id, &[request("z1", 5, 0)], ItemMode::Cart)
			.await
			.unwrap()
			.unwrap();
		assert_eq!(order.cart_items().len(), 1);
		assert_eq!(order.totals().subtotal, Decimal::ZERO);
	}

	#[tokio::test]
	async fn update_gratuity_works_in_any_state() {
		let (store, _) = new_store();
		let id = generate_order_id();
		store.create(&id).await.unwrap();

		let order = store
			.update_gratuity(&id, Decimal::from(10))
			.await
			.unwrap()
			.unwrap();
		assert_eq!(order.gratuity, Decimal::from(10));

		store
			.add_items(&id, &[request("p1", 15, 1)], ItemMode::Cart)
			.await
			.unwrap();
		store
			.submit(&id, PaymentMethod::GooglePay, Decimal::from(10))
			.await
			.unwrap();

		let order = store
			.update_gratuity(&id, Decimal::from(22))
			.await
			.unwrap()
			.unwrap();
		assert_eq!(order.gratuity, Decimal::from(22));
		// Change persisted, state untouched.
		let reloaded = store.get(&id).await.unwrap().unwrap();
		assert_eq!(reloaded.gratuity, Decimal::from(22));
		assert!(matches!(reloaded.state, OrderState::Submitted { .. }));
	}

	#[tokio::test]
	async fn clear_is_idempotent() {
		let (store, _) = new_store();
		let id = generate_order_id();
		store.create(&id).await.unwrap();

		store.clear(&id).await.unwrap();
		assert!(store.get(&id).await.unwrap().is_none());
		store.clear(&id).await.unwrap();
	}

	#[tokio::test]
	async fn corrupt_record_is_treated_as_missing() {
		let (store, service) = new_store();
		service
			.store(KeyPrefix::Orders, "ORD-CORRUPT00", &"not an order record")
			.await
			.unwrap();

		assert!(store.get("ORD-CORRUPT00").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn list_all_skips_malformed_records() {
		let (store, service) = new_store();
		let a = generate_order_id();
		let b = generate_order_id();
		store.create(&a).await.unwrap();
		store.create(&b).await.unwrap();
		service
			.store(KeyPrefix::Orders, "ORD-GARBAGE00", &42u32)
			.await
			.unwrap();

		let orders = store.list_all().await.unwrap();
		assert_eq!(orders.len(), 2);
		let mut ids: Vec<&str> = orders.iter().map(|o| o.id.as_str()).collect();
		ids.sort_unstable();
		let mut expected = [a.as_str(), b.as_str()];
		expected.sort_unstable();
		assert_eq!(ids, expected);
	}
}
