//! Order types for the bartab system.
//!
//! This module defines the persistent order entity, its line items and
//! payment details, and the tagged lifecycle state that drives every
//! transition: building -> submitted -> editing. Editing is a sink;
//! nothing transitions back to submitted.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::CatalogItem;
use crate::utils::{line_item_id, unix_timestamp};

/// Gratuity percentage applied to orders that never set one explicitly.
pub const DEFAULT_GRATUITY: Decimal = Decimal::from_parts(15, 0, 0, false, 0);

const ONE_HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// One catalog item instance attached to an order.
///
/// The line id is the catalog item id plus a random suffix, so adding
/// the same product twice yields two distinct lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
	/// Unique identifier for this line.
	pub id: String,
	pub name: String,
	/// Unit price. Accepted as given; there is no validation layer.
	pub price: Decimal,
	pub quantity: u32,
	pub category: String,
	/// Timestamp when the line was added (unix seconds).
	pub added_at: u64,
	/// True if the line was added during an edit session. Display-only;
	/// totals never consult it.
	pub is_new: bool,
}

/// A catalog item reference plus requested quantity, as passed to
/// `add_items`. Expansion into a [`LineItem`] mints the unique line id
/// and stamps the insertion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequest {
	/// Catalog item id this request references.
	pub catalog_id: String,
	pub name: String,
	pub price: Decimal,
	pub quantity: u32,
	pub category: String,
}

impl ItemRequest {
	/// Builds a request from a catalog record.
	pub fn from_catalog(item: &CatalogItem, quantity: u32) -> Self {
		Self {
			catalog_id: item.id.clone(),
			name: item.name.clone(),
			price: item.price,
			quantity,
			category: item.category.clone(),
		}
	}

	/// Expands the request into a line item.
	pub fn expand(&self, is_new: bool) -> LineItem {
		LineItem {
			id: line_item_id(&self.catalog_id),
			name: self.name.clone(),
			price: self.price,
			quantity: self.quantity,
			category: self.category.clone(),
			added_at: unix_timestamp(),
			is_new,
		}
	}
}

/// Payment method chosen at submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
	Card,
	Cash,
	ApplePay,
	GooglePay,
}

impl fmt::Display for PaymentMethod {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PaymentMethod::Card => write!(f, "card"),
			PaymentMethod::Cash => write!(f, "cash"),
			PaymentMethod::ApplePay => write!(f, "apple-pay"),
			PaymentMethod::GooglePay => write!(f, "google-pay"),
		}
	}
}

/// Payment details recorded at first submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
	pub method: PaymentMethod,
	/// Always true once recorded; payment never unlocks.
	pub is_locked: bool,
	/// Placeholder last-four for card payments; there is no real
	/// payment processor behind this.
	pub last_four: Option<String>,
}

impl Payment {
	const CARD_LAST_FOUR: &'static str = "1234";

	/// Locked payment as recorded when an order is first submitted.
	pub fn locked(method: PaymentMethod) -> Self {
		Self {
			method,
			is_locked: true,
			last_four: match method {
				PaymentMethod::Card => Some(Self::CARD_LAST_FOUR.to_string()),
				_ => None,
			},
		}
	}
}

/// How an item append should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemMode {
	/// Normal add-to-cart path; only meaningful while building.
	Cart,
	/// Edit-session path; grows the edit set after submission.
	Edit,
}

/// Lifecycle state of an order, tagged with the item collections and
/// payment details that are meaningful in each state.
///
/// The cart vec exists only while building; once submitted, the
/// original set is frozen and only `edit_items` may grow. Payment
/// exists exactly when the order has been submitted, so a locked
/// payment in the building state is unrepresentable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OrderState {
	/// Pre-submission: the cart is freely mutable.
	Building { items: Vec<LineItem> },
	/// Submitted with no edit session opened yet.
	Submitted {
		original_items: Vec<LineItem>,
		edit_items: Vec<LineItem>,
		payment: Payment,
	},
	/// Post-submission additions are accumulating. Editing never
	/// transitions back to submitted.
	Editing {
		original_items: Vec<LineItem>,
		edit_items: Vec<LineItem>,
		payment: Payment,
	},
}

impl fmt::Display for OrderState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrderState::Building { .. } => write!(f, "building"),
			OrderState::Submitted { .. } => write!(f, "submitted"),
			OrderState::Editing { .. } => write!(f, "editing"),
		}
	}
}

/// Monetary breakdown of an order. Each figure is rounded to 2 decimal
/// places exactly once, at the end, never per line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
	pub subtotal: Decimal,
	pub gratuity_amount: Decimal,
	pub total: Decimal,
}

/// The persistent record tracking one customer's selections, state,
/// payment, and gratuity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
	/// Opaque identifier, immutable once created.
	pub id: String,
	/// Lifecycle state, flattened so the persisted JSON keeps the flat
	/// `state` / `items` / `originalItems` / `editItems` field layout.
	#[serde(flatten)]
	pub state: OrderState,
	/// Gratuity percentage applied to the subtotal.
	pub gratuity: Decimal,
	/// Timestamp when this order was created (unix seconds).
	pub created_at: u64,
	/// Set exactly once, at first submission.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub submitted_at: Option<u64>,
}

impl Order {
	/// Creates a fresh order in the building state with the default
	/// gratuity and empty collections.
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			state: OrderState::Building { items: Vec::new() },
			gratuity: DEFAULT_GRATUITY,
			created_at: unix_timestamp(),
			submitted_at: None,
		}
	}

	/// Full post-submission item set: the originally submitted lines
	/// followed by every edit-session addition, relative order
	/// preserved within each group. Empty while building.
	pub fn all_items(&self) -> Vec<LineItem> {
		match &self.state {
			OrderState::Building { .. } => Vec::new(),
			OrderState::Submitted {
				original_items,
				edit_items,
				..
			}
			| OrderState::Editing {
				original_items,
				edit_items,
				..
			} => original_items.iter().chain(edit_items).cloned().collect(),
		}
	}

	/// Authoritative current content: the cart while building,
	/// otherwise everything submitted plus edits.
	pub fn cart_items(&self) -> Vec<LineItem> {
		match &self.state {
			OrderState::Building { items } => items.clone(),
			_ => self.all_items(),
		}
	}

	/// Lines belonging to the current session only: the cart while
	/// building, otherwise just the edit additions. Used to badge items
	/// added in the current editing pass.
	pub fn current_session_items(&self) -> Vec<LineItem> {
		match &self.state {
			OrderState::Building { items } => items.clone(),
			OrderState::Submitted { edit_items, .. } | OrderState::Editing { edit_items, .. } => {
				edit_items.clone()
			},
		}
	}

	/// Payment details; `None` until first submission locks them in.
	pub fn payment(&self) -> Option<&Payment> {
		match &self.state {
			OrderState::Building { .. } => None,
			OrderState::Submitted { payment, .. } | OrderState::Editing { payment, .. } => {
				Some(payment)
			},
		}
	}

	/// Appends expanded lines according to the mode, returning the
	/// successor order and whether anything changed.
	///
	/// Building accepts either mode (the edit flag has no meaning
	/// before first submission). After submission, edit-mode appends
	/// grow the edit set and move the order into an edit session;
	/// cart-mode appends have nothing to land on because the submitted
	/// set is frozen, so they leave the order unchanged.
	#[must_use]
	pub fn add_lines(mut self, mut lines: Vec<LineItem>, mode: ItemMode) -> (Order, bool) {
		let (state, changed) = match (self.state, mode) {
			(OrderState::Building { mut items }, _) => {
				items.append(&mut lines);
				(OrderState::Building { items }, true)
			},
			(
				OrderState::Submitted {
					original_items,
					mut edit_items,
					payment,
				}
				| OrderState::Editing {
					original_items,
					mut edit_items,
					payment,
				},
				ItemMode::Edit,
			) => {
				edit_items.append(&mut lines);
				(
					OrderState::Editing {
						original_items,
						edit_items,
						payment,
					},
					true,
				)
			},
			(state, ItemMode::Cart) => (state, false),
		};
		self.state = state;
		(self, changed)
	}

	/// Submits the order. First submission freezes the cart into the
	/// original set, locks payment, and stamps the submission time.
	/// Re-submitting only updates the gratuity: payment and the
	/// original set are immutable after the first lock, and editing
	/// never transitions back to submitted.
	#[must_use]
	pub fn submit(mut self, method: PaymentMethod, gratuity: Decimal) -> Order {
		self.gratuity = gratuity;
		self.state = match self.state {
			OrderState::Building { items } => {
				self.submitted_at = Some(unix_timestamp());
				OrderState::Submitted {
					original_items: items,
					edit_items: Vec::new(),
					payment: Payment::locked(method),
				}
			},
			state => state,
		};
		self
	}

	/// Computes the monetary breakdown over the authoritative item set.
	pub fn totals(&self) -> OrderTotals {
		let items = match &self.state {
			OrderState::Building { .. } => self.cart_items(),
			_ => self.all_items(),
		};
		let subtotal: Decimal = items
			.iter()
			.map(|item| item.price * Decimal::from(item.quantity))
			.sum();
		let gratuity_amount = subtotal * self.gratuity / ONE_HUNDRED;
		let total = subtotal + gratuity_amount;
		OrderTotals {
			subtotal: round_money(subtotal),
			gratuity_amount: round_money(gratuity_amount),
			total: round_money(total),
		}
	}
}

/// Rounds a monetary figure to 2 decimal places, half away from zero.
fn round_money(value: Decimal) -> Decimal {
	value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Persisted snapshot of an order: the order itself plus a timestamp
/// added at save time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
	#[serde(flatten)]
	pub order: Order,
	pub last_updated: u64,
}

impl OrderRecord {
	/// Wraps an order for persistence, stamping the save time.
	pub fn new(order: Order) -> Self {
		Self {
			order,
			last_updated: unix_timestamp(),
		}
	}
}
