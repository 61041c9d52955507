//! Text rendering of the session state.
//!
//! Rendering is a pure function of [`SessionState`] and [`ViewOptions`]; the
//! only environment it reads is the local time zone used for payment dates.

use lookup_config::LookupConfig;
use lookup_types::{ItemInfo, OrderRecord, SessionState, DEFAULT_DATETIME_FORMAT};
use std::fmt;

pub const LOADING_TEXT: &str = "Loading...";
pub const NO_ITEMS_TEXT: &str = "No items";

/// Rendering settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOptions {
	/// `strftime` pattern for payment dates.
	pub datetime_format: String,
}

impl Default for ViewOptions {
	fn default() -> Self {
		Self {
			datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
		}
	}
}

impl From<&LookupConfig> for ViewOptions {
	fn from(config: &LookupConfig) -> Self {
		Self {
			datetime_format: config.datetime_format.clone(),
		}
	}
}

/// Renders `state` as terminal text. Idle renders as an empty string.
pub fn render(state: &SessionState, options: &ViewOptions) -> String {
	Rendered { state, options }.to_string()
}

struct Rendered<'a> {
	state: &'a SessionState,
	options: &'a ViewOptions,
}

impl fmt::Display for Rendered<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.state {
			SessionState::Idle => Ok(()),
			SessionState::Loading => f.write_str(LOADING_TEXT),
			SessionState::Error(message) => write!(f, "Error: {}", message),
			SessionState::Success(record) => write_record(f, record, self.options),
		}
	}
}

fn write_field(f: &mut fmt::Formatter<'_>, indent: usize, label: &str, value: impl fmt::Display) -> fmt::Result {
	writeln!(f, "{:indent$}{}: {}", "", label, value, indent = indent)
}

fn write_record(f: &mut fmt::Formatter<'_>, record: &OrderRecord, options: &ViewOptions) -> fmt::Result {
	writeln!(f, "Order {}", record.order_uid)?;
	write_field(f, 2, "Track number", &record.track_number)?;
	write_field(f, 2, "Entry", &record.entry)?;
	write_field(f, 2, "Locale", &record.locale)?;
	write_field(f, 2, "Customer ID", &record.customer_id)?;
	write_field(f, 2, "Delivery service", &record.delivery_service)?;
	write_field(f, 2, "Internal signature", &record.internal_signature)?;
	write_field(f, 2, "Shard key", &record.shardkey)?;
	write_field(f, 2, "SM ID", record.sm_id)?;
	write_field(f, 2, "OOF shard", &record.oof_shard)?;
	write_field(f, 2, "Created", &record.date_created)?;

	let delivery = &record.delivery;
	writeln!(f, "Delivery")?;
	write_field(f, 2, "Name", &delivery.name)?;
	write_field(f, 2, "Phone", &delivery.phone)?;
	write_field(f, 2, "Zip", &delivery.zip)?;
	write_field(f, 2, "City", &delivery.city)?;
	write_field(f, 2, "Address", &delivery.address)?;
	write_field(f, 2, "Region", &delivery.region)?;
	write_field(f, 2, "Email", &delivery.email)?;

	let payment = &record.payment;
	writeln!(f, "Payment")?;
	write_field(f, 2, "Transaction", &payment.transaction)?;
	write_field(f, 2, "Request ID", &payment.request_id)?;
	write_field(f, 2, "Amount", payment.amount)?;
	write_field(f, 2, "Currency", &payment.currency)?;
	write_field(f, 2, "Provider", &payment.provider)?;
	write_field(f, 2, "Payment date", payment.payment_date(&options.datetime_format))?;
	write_field(f, 2, "Bank", &payment.bank)?;
	write_field(f, 2, "Delivery cost", payment.delivery_cost)?;
	write_field(f, 2, "Goods total", payment.goods_total)?;
	write_field(f, 2, "Custom fee", payment.custom_fee)?;

	write!(f, "Items")?;
	if record.items.is_empty() {
		return write!(f, "\n  {}", NO_ITEMS_TEXT);
	}
	for item in &record.items {
		f.write_str("\n")?;
		write_item(f, item)?;
	}
	Ok(())
}

fn write_item(f: &mut fmt::Formatter<'_>, item: &ItemInfo) -> fmt::Result {
	writeln!(f, "  [{}] {}", item.key, item.name)?;
	write_field(f, 4, "Brand", &item.brand)?;
	write_field(f, 4, "Price", item.price)?;
	write_field(f, 4, "Sale", item.sale)?;
	write_field(f, 4, "Total price", item.total_price)?;
	write_field(f, 4, "Size", &item.size)?;
	write_field(f, 4, "NM ID", item.nm_id)?;
	write_field(f, 4, "Track number", &item.track_number)?;
	write_field(f, 4, "RID", &item.rid)?;
	write!(f, "    Status: {}", item.status)
}
