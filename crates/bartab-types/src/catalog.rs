//! Catalog records, the demo menu, and the search filter.
//!
//! The catalog is an external collaborator to the order core: the core
//! only ever sees [`ItemRequest`](crate::ItemRequest)s built from these
//! records. This module fixes the record shape and ships the static
//! demo menu together with the substring search the menu pages use.

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
	pub id: String,
	pub name: String,
	pub description: String,
	pub price: Decimal,
	/// Display name of the category this item belongs to.
	pub category: String,
}

/// A group of catalog items under one heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogCategory {
	pub id: String,
	pub name: String,
	pub items: Vec<CatalogItem>,
}

fn item(id: &str, name: &str, description: &str, cents: i64, category: &str) -> CatalogItem {
	CatalogItem {
		id: id.to_string(),
		name: name.to_string(),
		description: description.to_string(),
		price: Decimal::new(cents, 2),
		category: category.to_string(),
	}
}

fn category(id: &str, name: &str, items: Vec<CatalogItem>) -> CatalogCategory {
	CatalogCategory {
		id: id.to_string(),
		name: name.to_string(),
		items,
	}
}

static MENU: Lazy<Vec<CatalogCategory>> = Lazy::new(|| {
	vec![
		category(
			"cocktails",
			"Cocktails",
			vec![
				item("c1", "Margarita", "Classic lime margarita with salt rim", 1200, "Cocktails"),
				item("c2", "Old Fashioned", "Bourbon, bitters, orange twist", 1400, "Cocktails"),
				item("c3", "Mojito", "Rum, mint, lime, soda", 1100, "Cocktails"),
			],
		),
		category(
			"beer",
			"Beer",
			vec![
				item("b1", "IPA", "Local craft IPA", 800, "Beer"),
				item("b2", "Lager", "Crisp pilsner lager", 700, "Beer"),
				item("b3", "Stout", "Dark chocolate stout", 900, "Beer"),
			],
		),
		category(
			"wine",
			"Wine",
			vec![
				item("w1", "Cabernet Sauvignon", "Full-bodied red wine", 1000, "Wine"),
				item("w2", "Chardonnay", "Buttery white wine", 900, "Wine"),
				item("w3", "Pinot Noir", "Light red wine", 1100, "Wine"),
			],
		),
		category(
			"appetizers",
			"Appetizers",
			vec![
				item("a1", "Buffalo Wings", "Spicy chicken wings with ranch", 1200, "Appetizers"),
				item("a2", "Mozzarella Sticks", "Fried cheese with marinara", 900, "Appetizers"),
				item("a3", "Calamari", "Fried squid with lemon aioli", 1300, "Appetizers"),
			],
		),
		category(
			"sandwiches",
			"Sandwiches",
			vec![
				item("s1", "Club Sandwich", "Turkey, bacon, lettuce, tomato", 1400, "Sandwiches"),
				item("s2", "Burger", "Beef patty with cheese and fries", 1600, "Sandwiches"),
				item("s3", "BLT", "Bacon, lettuce, tomato on toast", 1200, "Sandwiches"),
			],
		),
		category(
			"pizza",
			"Pizza",
			vec![
				item("p1", "Margherita", "Tomato, mozzarella, basil", 1500, "Pizza"),
				item("p2", "Pepperoni", "Classic pepperoni pizza", 1700, "Pizza"),
				item("p3", "Vegetarian", "Bell peppers, onions, mushrooms", 1600, "Pizza"),
			],
		),
		category(
			"entrees",
			"Entrees",
			vec![
				item("e1", "Grilled Salmon", "Atlantic salmon with vegetables", 2400, "Entrees"),
				item("e2", "Ribeye Steak", "12oz ribeye with mashed potatoes", 3200, "Entrees"),
				item("e3", "Pasta Carbonara", "Creamy pasta with bacon", 1800, "Entrees"),
			],
		),
		category(
			"dessert",
			"Dessert",
			vec![
				item("d1", "Chocolate Cake", "Rich chocolate layer cake", 800, "Dessert"),
				item("d2", "Tiramisu", "Italian coffee dessert", 900, "Dessert"),
				item("d3", "Cheesecake", "New York style cheesecake", 800, "Dessert"),
			],
		),
	]
});

/// The built-in demo menu, grouped by category.
pub fn categories() -> &'static [CatalogCategory] {
	&MENU
}

/// All products flattened across categories.
pub fn all_products() -> Vec<CatalogItem> {
	MENU.iter().flat_map(|c| c.items.iter().cloned()).collect()
}

/// Case-insensitive substring search over item names and descriptions.
/// Categories left empty by the filter are dropped; an empty query
/// returns the input unchanged.
pub fn search(categories: &[CatalogCategory], query: &str) -> Vec<CatalogCategory> {
	if query.is_empty() {
		return categories.to_vec();
	}
	let needle = query.to_lowercase();
	categories
		.iter()
		.filter_map(|cat| {
			let items: Vec<CatalogItem> = cat
				.items
				.iter()
				.filter(|item| {
					item.name.to_lowercase().contains(&needle)
						|| item.description.to_lowercase().contains(&needle)
				})
				.cloned()
				.collect();
			if items.is_empty() {
				None
			} else {
				Some(CatalogCategory {
					id: cat.id.clone(),
					name: cat.name.clone(),
					items,
				})
			}
		})
		.collect()
}
