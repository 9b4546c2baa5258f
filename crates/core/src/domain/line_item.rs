use std::fmt;
use std::num::IntErrorKind;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Upper bound for any quantity-type line item.
pub const MAX_ITEM_QUANTITY: u32 = 99;

/// Option value that marks a choice item as not selected.
pub const UNSELECTED_OPTION: &str = "unselected";

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemId(pub String);

impl LineItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for LineItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingUnit {
    Monthly,
    OneTime,
}

/// Pricing behavior of a line item. Each variant carries the state its rule
/// depends on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LineItemKind {
    /// Base subscription with no control; always active.
    Service,
    Toggle { enabled: bool },
    Quantity { quantity: u32 },
    /// `options[0]` is always [`UNSELECTED_OPTION`].
    Choice { options: Vec<String>, selected: String },
}

impl LineItemKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::Toggle { .. } => "toggle",
            Self::Quantity { .. } => "quantity",
            Self::Choice { .. } => "choice",
        }
    }

    pub fn choice(options: &[&str]) -> Self {
        let mut all = vec![UNSELECTED_OPTION.to_owned()];
        all.extend(options.iter().map(|option| (*option).to_owned()));
        Self::Choice { options: all, selected: UNSELECTED_OPTION.to_owned() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub title: String,
    pub price: Decimal,
    pub billing: BillingUnit,
    #[serde(flatten)]
    pub kind: LineItemKind,
}

impl LineItem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        price: Decimal,
        billing: BillingUnit,
        kind: LineItemKind,
    ) -> Self {
        Self { id: LineItemId::new(id), title: title.into(), price, billing, kind }
    }

    pub fn is_active(&self) -> bool {
        match &self.kind {
            LineItemKind::Service => true,
            LineItemKind::Toggle { enabled } => *enabled,
            LineItemKind::Quantity { quantity } => *quantity > 0,
            LineItemKind::Choice { selected, .. } => selected != UNSELECTED_OPTION,
        }
    }

    /// Amount this item adds to its billing bucket in its current state.
    pub fn contribution(&self) -> Decimal {
        match &self.kind {
            LineItemKind::Service => self.price,
            LineItemKind::Toggle { enabled: true } => self.price,
            LineItemKind::Toggle { enabled: false } => Decimal::ZERO,
            LineItemKind::Quantity { quantity } => self.price * Decimal::from(*quantity),
            LineItemKind::Choice { selected, .. } if selected != UNSELECTED_OPTION => self.price,
            LineItemKind::Choice { .. } => Decimal::ZERO,
        }
    }

    /// Price shown next to the item: the line amount for quantity items (at
    /// least one unit), the flat price otherwise.
    pub fn display_price(&self) -> Decimal {
        match &self.kind {
            LineItemKind::Quantity { quantity } => {
                self.price * Decimal::from((*quantity).max(1))
            }
            _ => self.price,
        }
    }
}

/// Raw numeric field input as it arrives from a form: a whole number, the
/// text typed into the field, or any other JSON value (fractions, `null`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(i64),
    Text(String),
    Other(serde_json::Value),
}

impl NumericInput {
    /// Clamps into `0..=max`. Fractions truncate toward zero, overflow
    /// saturates, and anything that is not a number coerces to zero.
    pub fn coerce(&self, max: u32) -> u32 {
        let value = match self {
            Self::Number(value) => *value,
            Self::Text(text) => parse_text(text.trim()),
            Self::Other(serde_json::Value::Number(number)) => {
                number.as_i64().unwrap_or_else(|| truncate(number.as_f64().unwrap_or(0.0)))
            }
            Self::Other(_) => 0,
        };
        clamp_count(value, max)
    }
}

fn parse_text(text: &str) -> i64 {
    match text.parse::<i64>() {
        Ok(value) => value,
        Err(error) => match error.kind() {
            IntErrorKind::PosOverflow => i64::MAX,
            IntErrorKind::NegOverflow => i64::MIN,
            _ => text.parse::<f64>().ok().filter(|value| value.is_finite()).map_or(0, truncate),
        },
    }
}

/// `as` saturates at the `i64` bounds and maps NaN to zero.
fn truncate(value: f64) -> i64 {
    value.trunc() as i64
}

impl From<i64> for NumericInput {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

pub fn clamp_count(value: i64, max: u32) -> u32 {
    if value <= 0 {
        return 0;
    }
    u32::try_from(value).map_or(max, |value| value.min(max))
}

pub fn clamp_quantity(value: i64) -> u32 {
    clamp_count(value, MAX_ITEM_QUANTITY)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{
        clamp_quantity, BillingUnit, LineItem, LineItemKind, NumericInput, MAX_ITEM_QUANTITY,
        UNSELECTED_OPTION,
    };

    fn item(kind: LineItemKind) -> LineItem {
        LineItem::new("probe", "Probe", Decimal::new(1_800, 2), BillingUnit::Monthly, kind)
    }

    #[test]
    fn quantity_clamp_matches_form_limits() {
        assert_eq!(clamp_quantity(-5), 0);
        assert_eq!(clamp_quantity(150), MAX_ITEM_QUANTITY);
        assert_eq!(clamp_quantity(7), 7);
        assert_eq!(clamp_quantity(i64::MAX), MAX_ITEM_QUANTITY);
    }

    #[test]
    fn non_numeric_text_coerces_to_zero() {
        assert_eq!(NumericInput::from("abc").coerce(MAX_ITEM_QUANTITY), 0);
        assert_eq!(NumericInput::from(" 12 ").coerce(MAX_ITEM_QUANTITY), 12);
        assert_eq!(NumericInput::from("").coerce(999), 0);
        assert_eq!(NumericInput::from(1200).coerce(999), 999);
    }

    #[test]
    fn overflowing_text_saturates_instead_of_resetting() {
        assert_eq!(NumericInput::from("99999999999999999999").coerce(MAX_ITEM_QUANTITY), 99);
        assert_eq!(NumericInput::from("-99999999999999999999").coerce(MAX_ITEM_QUANTITY), 0);
        assert_eq!(NumericInput::from("12abc").coerce(MAX_ITEM_QUANTITY), 0);
        assert_eq!(NumericInput::from("7.9").coerce(MAX_ITEM_QUANTITY), 7);
        assert_eq!(NumericInput::from("NaN").coerce(MAX_ITEM_QUANTITY), 0);
    }

    #[test]
    fn fractional_and_null_json_inputs_coerce() {
        let parse = |raw: &str| -> NumericInput {
            serde_json::from_str(raw).expect("any JSON value is accepted")
        };
        assert_eq!(parse("2.5").coerce(MAX_ITEM_QUANTITY), 2);
        assert_eq!(parse("-2.5").coerce(MAX_ITEM_QUANTITY), 0);
        assert_eq!(parse("1e30").coerce(MAX_ITEM_QUANTITY), 99);
        assert_eq!(parse("18446744073709551615").coerce(999), 999);
        assert_eq!(parse("null").coerce(MAX_ITEM_QUANTITY), 0);
        assert_eq!(parse("true").coerce(MAX_ITEM_QUANTITY), 0);
        assert_eq!(parse("[3]").coerce(MAX_ITEM_QUANTITY), 0);
    }

    #[test]
    fn untagged_input_accepts_numbers_and_strings() {
        let number: NumericInput = serde_json::from_str("3").expect("number input");
        let text: NumericInput = serde_json::from_str("\"x\"").expect("text input");
        assert_eq!(number, NumericInput::Number(3));
        assert_eq!(text, NumericInput::Text("x".to_owned()));
    }

    #[test]
    fn contribution_follows_type_rule() {
        assert_eq!(item(LineItemKind::Service).contribution(), Decimal::new(1_800, 2));
        assert_eq!(item(LineItemKind::Toggle { enabled: false }).contribution(), Decimal::ZERO);
        assert_eq!(
            item(LineItemKind::Quantity { quantity: 2 }).contribution(),
            Decimal::new(3_600, 2)
        );
        assert_eq!(item(LineItemKind::Quantity { quantity: 0 }).contribution(), Decimal::ZERO);
        assert_eq!(item(LineItemKind::choice(&["basic"])).contribution(), Decimal::ZERO);
    }

    #[test]
    fn choice_contribution_is_selection_gated() {
        let mut choice = item(LineItemKind::choice(&["basic", "premium"]));
        assert!(!choice.is_active());

        choice.kind = LineItemKind::Choice {
            options: vec![UNSELECTED_OPTION.to_owned(), "basic".to_owned()],
            selected: "basic".to_owned(),
        };
        assert!(choice.is_active());
        assert_eq!(choice.contribution(), Decimal::new(1_800, 2));
    }

    #[test]
    fn quantity_display_price_shows_at_least_one_unit() {
        assert_eq!(
            item(LineItemKind::Quantity { quantity: 0 }).display_price(),
            Decimal::new(1_800, 2)
        );
        assert_eq!(
            item(LineItemKind::Quantity { quantity: 3 }).display_price(),
            Decimal::new(5_400, 2)
        );
    }

    #[test]
    fn item_serializes_with_type_tag() {
        let json = serde_json::to_value(item(LineItemKind::Toggle { enabled: true }))
            .expect("serialize item");
        assert_eq!(json["type"], "toggle");
        assert_eq!(json["enabled"], true);
        assert_eq!(json["billing"], "monthly");
    }
}
