//! Order snapshot types.
//!
//! These are the normalized shapes the view renders from. Every text field is
//! already filled with [`PLACEHOLDER`] when the backend omitted it, and numeric
//! fields are wrapped in [`Numeric`], so rendering code never checks presence.

use crate::utils::{format_timestamp, PLACEHOLDER};
use std::fmt;

/// A numeric wire value that may be missing.
///
/// Displays the number itself, or the placeholder when absent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Numeric(pub Option<f64>);

impl Numeric {
	pub fn new(value: f64) -> Self {
		Self(Some(value))
	}

	pub fn missing() -> Self {
		Self(None)
	}
}

impl fmt::Display for Numeric {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.0 {
			Some(value) => write!(f, "{}", value),
			None => f.write_str(PLACEHOLDER),
		}
	}
}

/// Render key of an item within the order's item list.
///
/// Keys are unique within one [`OrderRecord`]; normalization falls back to
/// [`ItemKey::Position`] when the wire key is missing or repeated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemKey {
	/// Integer chart id sent by the backend.
	Id(i64),
	/// Chart id sent as a string.
	Code(String),
	/// Position in the item list.
	Position(usize),
}

impl fmt::Display for ItemKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ItemKey::Id(id) => write!(f, "{}", id),
			ItemKey::Code(code) => f.write_str(code),
			ItemKey::Position(index) => write!(f, "#{}", index),
		}
	}
}

/// Delivery details of an order.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryInfo {
	pub name: String,
	pub phone: String,
	pub zip: String,
	pub city: String,
	pub address: String,
	pub region: String,
	pub email: String,
}

impl DeliveryInfo {
	/// Delivery block used when the backend sent none.
	pub fn placeholder() -> Self {
		Self {
			name: PLACEHOLDER.to_string(),
			phone: PLACEHOLDER.to_string(),
			zip: PLACEHOLDER.to_string(),
			city: PLACEHOLDER.to_string(),
			address: PLACEHOLDER.to_string(),
			region: PLACEHOLDER.to_string(),
			email: PLACEHOLDER.to_string(),
		}
	}
}

impl Default for DeliveryInfo {
	fn default() -> Self {
		Self::placeholder()
	}
}

/// Payment details of an order.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentInfo {
	pub transaction: String,
	pub request_id: String,
	pub amount: Numeric,
	pub currency: String,
	pub provider: String,
	/// Seconds since the Unix epoch.
	pub payment_dt: Option<i64>,
	pub bank: String,
	pub delivery_cost: Numeric,
	pub goods_total: Numeric,
	pub custom_fee: Numeric,
}

impl PaymentInfo {
	/// Payment block used when the backend sent none.
	pub fn placeholder() -> Self {
		Self {
			transaction: PLACEHOLDER.to_string(),
			request_id: PLACEHOLDER.to_string(),
			amount: Numeric::missing(),
			currency: PLACEHOLDER.to_string(),
			provider: PLACEHOLDER.to_string(),
			payment_dt: None,
			bank: PLACEHOLDER.to_string(),
			delivery_cost: Numeric::missing(),
			goods_total: Numeric::missing(),
			custom_fee: Numeric::missing(),
		}
	}

	/// Payment time as a local date-time in `format`, or the placeholder.
	pub fn payment_date(&self, format: &str) -> String {
		self.payment_dt
			.and_then(|secs| format_timestamp(secs, format))
			.unwrap_or_else(|| PLACEHOLDER.to_string())
	}
}

impl Default for PaymentInfo {
	fn default() -> Self {
		Self::placeholder()
	}
}

/// A single line item of an order.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemInfo {
	pub key: ItemKey,
	pub track_number: String,
	pub price: Numeric,
	pub rid: String,
	pub name: String,
	pub sale: Numeric,
	pub size: String,
	pub total_price: Numeric,
	pub nm_id: Numeric,
	pub brand: String,
	pub status: Numeric,
}

/// Read-only snapshot of one order as returned by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
	pub order_uid: String,
	pub track_number: String,
	pub entry: String,
	pub locale: String,
	pub internal_signature: String,
	pub customer_id: String,
	pub delivery_service: String,
	pub shardkey: String,
	pub sm_id: Numeric,
	pub date_created: String,
	pub oof_shard: String,
	pub delivery: DeliveryInfo,
	pub payment: PaymentInfo,
	pub items: Vec<ItemInfo>,
}
