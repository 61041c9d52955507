//! Normalization of order bodies into [`OrderRecord`].
//!
//! Backends in the wild send the same record with either snake-style keys
//! (`order_uid`, `track_number`, `chrt_id`) or camel-style keys (`orderUID`,
//! `trackNumber`, `chrtID`). Every wire field is listed once in a mapping table
//! with both spellings. For each object the convention in effect is detected
//! from the keys actually present; lookups try that spelling first and fall
//! back to the other one.
//!
//! Normalization is total: any value that is missing, null, empty or of an
//! unusable type becomes a placeholder.

use lookup_types::{
	DeliveryInfo, ItemInfo, ItemKey, Numeric, OrderRecord, PaymentInfo, PLACEHOLDER,
};
use serde_json::{Map, Value};
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur during normalization.
#[derive(Debug, Error)]
pub enum NormalizeError {
	/// The body parsed, but is not a JSON object.
	#[error("Expected an order object, got {0}")]
	NotAnObject(&'static str),
}

/// Key naming convention of a wire object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingConvention {
	Snake,
	Camel,
}

impl NamingConvention {
	fn other(self) -> Self {
		match self {
			NamingConvention::Snake => NamingConvention::Camel,
			NamingConvention::Camel => NamingConvention::Snake,
		}
	}
}

/// Both spellings of one wire field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldName {
	pub snake: &'static str,
	pub camel: &'static str,
}

impl FieldName {
	const fn new(snake: &'static str, camel: &'static str) -> Self {
		Self { snake, camel }
	}

	const fn same(name: &'static str) -> Self {
		Self::new(name, name)
	}

	pub fn spelled(&self, convention: NamingConvention) -> &'static str {
		match convention {
			NamingConvention::Snake => self.snake,
			NamingConvention::Camel => self.camel,
		}
	}

	/// Whether the two conventions spell this field differently.
	fn is_distinctive(&self) -> bool {
		self.snake != self.camel
	}
}

/// Wire field names, grouped by the object they belong to.
pub mod fields {
	use super::FieldName;

	pub const ORDER_UID: FieldName = FieldName::new("order_uid", "orderUID");
	pub const TRACK_NUMBER: FieldName = FieldName::new("track_number", "trackNumber");
	pub const ENTRY: FieldName = FieldName::same("entry");
	pub const LOCALE: FieldName = FieldName::same("locale");
	pub const INTERNAL_SIGNATURE: FieldName =
		FieldName::new("internal_signature", "internalSignature");
	pub const CUSTOMER_ID: FieldName = FieldName::new("customer_id", "customerID");
	pub const DELIVERY_SERVICE: FieldName = FieldName::new("delivery_service", "deliveryService");
	pub const SHARDKEY: FieldName = FieldName::same("shardkey");
	pub const SM_ID: FieldName = FieldName::new("sm_id", "smID");
	pub const DATE_CREATED: FieldName = FieldName::new("date_created", "dateCreated");
	pub const OOF_SHARD: FieldName = FieldName::new("oof_shard", "oofShard");
	pub const DELIVERY: FieldName = FieldName::same("delivery");
	pub const PAYMENT: FieldName = FieldName::same("payment");
	pub const ITEMS: FieldName = FieldName::same("items");

	pub const NAME: FieldName = FieldName::same("name");
	pub const PHONE: FieldName = FieldName::same("phone");
	pub const ZIP: FieldName = FieldName::same("zip");
	pub const CITY: FieldName = FieldName::same("city");
	pub const ADDRESS: FieldName = FieldName::same("address");
	pub const REGION: FieldName = FieldName::same("region");
	pub const EMAIL: FieldName = FieldName::same("email");

	pub const TRANSACTION: FieldName = FieldName::same("transaction");
	pub const REQUEST_ID: FieldName = FieldName::new("request_id", "requestID");
	pub const CURRENCY: FieldName = FieldName::same("currency");
	pub const PROVIDER: FieldName = FieldName::same("provider");
	pub const AMOUNT: FieldName = FieldName::same("amount");
	pub const PAYMENT_DT: FieldName = FieldName::new("payment_dt", "paymentDt");
	pub const BANK: FieldName = FieldName::same("bank");
	pub const DELIVERY_COST: FieldName = FieldName::new("delivery_cost", "deliveryCost");
	pub const GOODS_TOTAL: FieldName = FieldName::new("goods_total", "goodsTotal");
	pub const CUSTOM_FEE: FieldName = FieldName::new("custom_fee", "customFee");

	pub const CHRT_ID: FieldName = FieldName::new("chrt_id", "chrtID");
	pub const PRICE: FieldName = FieldName::same("price");
	pub const RID: FieldName = FieldName::same("rid");
	pub const SALE: FieldName = FieldName::same("sale");
	pub const SIZE: FieldName = FieldName::same("size");
	pub const TOTAL_PRICE: FieldName = FieldName::new("total_price", "totalPrice");
	pub const NM_ID: FieldName = FieldName::new("nm_id", "nmID");
	pub const BRAND: FieldName = FieldName::same("brand");
	pub const STATUS: FieldName = FieldName::same("status");

	pub const ORDER: &[FieldName] = &[
		ORDER_UID,
		TRACK_NUMBER,
		ENTRY,
		LOCALE,
		INTERNAL_SIGNATURE,
		CUSTOMER_ID,
		DELIVERY_SERVICE,
		SHARDKEY,
		SM_ID,
		DATE_CREATED,
		OOF_SHARD,
		DELIVERY,
		PAYMENT,
		ITEMS,
	];

	pub const DELIVERY_FIELDS: &[FieldName] = &[NAME, PHONE, ZIP, CITY, ADDRESS, REGION, EMAIL];

	pub const PAYMENT_FIELDS: &[FieldName] = &[
		TRANSACTION,
		REQUEST_ID,
		CURRENCY,
		PROVIDER,
		AMOUNT,
		PAYMENT_DT,
		BANK,
		DELIVERY_COST,
		GOODS_TOTAL,
		CUSTOM_FEE,
	];

	pub const ITEM_FIELDS: &[FieldName] = &[
		CHRT_ID,
		TRACK_NUMBER,
		PRICE,
		RID,
		NAME,
		SALE,
		SIZE,
		TOTAL_PRICE,
		NM_ID,
		BRAND,
		STATUS,
	];
}

/// Detects the convention of `object` from the distinctive keys in `table`.
///
/// Returns `None` when the keys do not tell the conventions apart.
pub fn detect_convention(object: &Map<String, Value>, table: &[FieldName]) -> Option<NamingConvention> {
	let (mut snake, mut camel) = (0usize, 0usize);
	for field in table.iter().filter(|f| f.is_distinctive()) {
		if object.contains_key(field.snake) {
			snake += 1;
		}
		if object.contains_key(field.camel) {
			camel += 1;
		}
	}

	match snake.cmp(&camel) {
		std::cmp::Ordering::Greater => Some(NamingConvention::Snake),
		std::cmp::Ordering::Less => Some(NamingConvention::Camel),
		std::cmp::Ordering::Equal => None,
	}
}

/// A wire object together with the convention its keys are read in.
struct WireObject<'a> {
	object: &'a Map<String, Value>,
	convention: NamingConvention,
}

impl<'a> WireObject<'a> {
	fn new(
		object: &'a Map<String, Value>,
		table: &[FieldName],
		inherited: NamingConvention,
	) -> Self {
		let convention = detect_convention(object, table).unwrap_or(inherited);
		Self { object, convention }
	}

	/// Value of `field`, trying the detected spelling first. Nulls count as absent.
	fn get(&self, field: FieldName) -> Option<&'a Value> {
		[self.convention, self.convention.other()]
			.into_iter()
			.filter_map(|convention| self.object.get(field.spelled(convention)))
			.find(|value| !value.is_null())
	}

	fn text(&self, field: FieldName) -> String {
		self.get(field)
			.and_then(text_value)
			.unwrap_or_else(|| PLACEHOLDER.to_string())
	}

	fn numeric(&self, field: FieldName) -> Numeric {
		Numeric(self.get(field).and_then(numeric_value))
	}

	fn object(&self, field: FieldName) -> Option<&'a Map<String, Value>> {
		self.get(field).and_then(Value::as_object)
	}
}

fn text_value(value: &Value) -> Option<String> {
	match value {
		Value::String(s) if !s.is_empty() => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		_ => None,
	}
}

fn numeric_value(value: &Value) -> Option<f64> {
	match value {
		Value::Number(n) => n.as_f64(),
		Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
		_ => None,
	}
}

/// Seconds since the epoch; zero and negative values mean "not set".
fn timestamp_value(value: &Value) -> Option<i64> {
	let secs = match value {
		Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
		Value::String(s) => s.trim().parse::<i64>().ok(),
		_ => None,
	}?;
	(secs > 0).then_some(secs)
}

fn item_key_value(value: &Value) -> Option<ItemKey> {
	match value {
		Value::Number(n) => Some(match n.as_i64() {
			Some(id) => ItemKey::Id(id),
			None => ItemKey::Code(n.to_string()),
		}),
		Value::String(s) if !s.is_empty() => Some(ItemKey::Code(s.clone())),
		_ => None,
	}
}

fn type_name(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}

/// Normalizes a parsed order body into an [`OrderRecord`].
///
/// `requested_uid` fills the identifier when the body does not carry one, so
/// the record identifier is never empty.
pub fn normalize_order(body: &Value, requested_uid: &str) -> Result<OrderRecord, NormalizeError> {
	let object = body
		.as_object()
		.ok_or_else(|| NormalizeError::NotAnObject(type_name(body)))?;

	let order = WireObject::new(object, fields::ORDER, NamingConvention::Snake);
	tracing::debug!(convention = ?order.convention, "Normalizing order body");

	let order_uid = order
		.get(fields::ORDER_UID)
		.and_then(text_value)
		.unwrap_or_else(|| requested_uid.trim().to_string());

	let delivery = order
		.object(fields::DELIVERY)
		.map(|delivery| normalize_delivery(delivery, order.convention))
		.unwrap_or_else(DeliveryInfo::placeholder);

	let payment = order
		.object(fields::PAYMENT)
		.map(|payment| normalize_payment(payment, order.convention))
		.unwrap_or_else(PaymentInfo::placeholder);

	let items = order
		.get(fields::ITEMS)
		.and_then(Value::as_array)
		.map(|items| normalize_items(items, order.convention))
		.unwrap_or_default();

	Ok(OrderRecord {
		order_uid,
		track_number: order.text(fields::TRACK_NUMBER),
		entry: order.text(fields::ENTRY),
		locale: order.text(fields::LOCALE),
		internal_signature: order.text(fields::INTERNAL_SIGNATURE),
		customer_id: order.text(fields::CUSTOMER_ID),
		delivery_service: order.text(fields::DELIVERY_SERVICE),
		shardkey: order.text(fields::SHARDKEY),
		sm_id: order.numeric(fields::SM_ID),
		date_created: order.text(fields::DATE_CREATED),
		oof_shard: order.text(fields::OOF_SHARD),
		delivery,
		payment,
		items,
	})
}

fn normalize_delivery(object: &Map<String, Value>, inherited: NamingConvention) -> DeliveryInfo {
	let delivery = WireObject::new(object, fields::DELIVERY_FIELDS, inherited);

	DeliveryInfo {
		name: delivery.text(fields::NAME),
		phone: delivery.text(fields::PHONE),
		zip: delivery.text(fields::ZIP),
		city: delivery.text(fields::CITY),
		address: delivery.text(fields::ADDRESS),
		region: delivery.text(fields::REGION),
		email: delivery.text(fields::EMAIL),
	}
}

fn normalize_payment(object: &Map<String, Value>, inherited: NamingConvention) -> PaymentInfo {
	let payment = WireObject::new(object, fields::PAYMENT_FIELDS, inherited);

	PaymentInfo {
		transaction: payment.text(fields::TRANSACTION),
		request_id: payment.text(fields::REQUEST_ID),
		amount: payment.numeric(fields::AMOUNT),
		currency: payment.text(fields::CURRENCY),
		provider: payment.text(fields::PROVIDER),
		payment_dt: payment.get(fields::PAYMENT_DT).and_then(timestamp_value),
		bank: payment.text(fields::BANK),
		delivery_cost: payment.numeric(fields::DELIVERY_COST),
		goods_total: payment.numeric(fields::GOODS_TOTAL),
		custom_fee: payment.numeric(fields::CUSTOM_FEE),
	}
}

fn normalize_items(items: &[Value], inherited: NamingConvention) -> Vec<ItemInfo> {
	let mut seen = HashSet::new();
	let mut normalized = Vec::with_capacity(items.len());

	for (position, value) in items.iter().enumerate() {
		let Some(object) = value.as_object() else {
			tracing::debug!(position, kind = type_name(value), "Skipping non-object item");
			continue;
		};
		let item = WireObject::new(object, fields::ITEM_FIELDS, inherited);

		let key = item
			.get(fields::CHRT_ID)
			.and_then(item_key_value)
			.filter(|key| !seen.contains(key))
			.unwrap_or(ItemKey::Position(position));
		seen.insert(key.clone());

		normalized.push(ItemInfo {
			key,
			track_number: item.text(fields::TRACK_NUMBER),
			price: item.numeric(fields::PRICE),
			rid: item.text(fields::RID),
			name: item.text(fields::NAME),
			sale: item.numeric(fields::SALE),
			size: item.text(fields::SIZE),
			total_price: item.numeric(fields::TOTAL_PRICE),
			nm_id: item.numeric(fields::NM_ID),
			brand: item.text(fields::BRAND),
			status: item.numeric(fields::STATUS),
		});
	}

	normalized
}
