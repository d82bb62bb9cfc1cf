//! Pricing Engine
//!
//! Cost breakdown in, unit and total price out. Pure arithmetic over defaulted
//! numbers: missing or unparsable inputs contribute zero, nothing is rejected.

use serde::{Deserialize, Serialize};

use crate::format::{format_amount_with, DISPLAY_DECIMALS};
use crate::lenient;
use crate::units::Unit;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CostCategory {
    #[default]
    Ingredient,
    Packaging,
    Box,
    Label,
}

/// One itemized row of cost input.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostLine {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub category: CostCategory,
    #[serde(default, alias = "amount", deserialize_with = "lenient::f64_or_zero")]
    pub quantity: f64,
    #[serde(default)]
    pub unit: Unit,
    #[serde(default, alias = "price", deserialize_with = "lenient::f64_or_zero")]
    pub unit_price: f64,
    /// Units consumed per finished box; ingredients only, 1 when absent
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub per_box_multiplier: Option<f64>,
}

impl CostLine {
    pub fn new(category: CostCategory, quantity: f64, unit: Unit, unit_price: f64) -> Self {
        Self {
            name: String::new(),
            category,
            quantity,
            unit,
            unit_price,
            per_box_multiplier: None,
        }
    }

    pub fn ingredient(quantity: f64, unit: Unit, unit_price: f64) -> Self {
        Self::new(CostCategory::Ingredient, quantity, unit, unit_price)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_per_box_multiplier(mut self, multiplier: f64) -> Self {
        self.per_box_multiplier = Some(multiplier);
        self
    }

    /// Ingredient contribution: normalized quantity x price x per-box multiplier.
    pub fn ingredient_cost(&self) -> f64 {
        self.unit.normalize(self.quantity) * self.unit_price * self.per_box_multiplier.unwrap_or(1.0)
    }

    /// Packaging, box and label contribution: quantity x price.
    pub fn flat_cost(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OtherCost {
    #[serde(default)]
    pub name: String,
    /// Already per unit
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProfitPolicy {
    Percentage {
        #[serde(default, deserialize_with = "lenient::f64_or_zero")]
        value: f64,
    },
    Fixed {
        #[serde(default, deserialize_with = "lenient::f64_or_zero")]
        value: f64,
    },
}

impl Default for ProfitPolicy {
    fn default() -> Self {
        Self::Percentage { value: 0.0 }
    }
}

impl ProfitPolicy {
    pub fn profit_for(&self, cost_per_unit: f64) -> f64 {
        match *self {
            Self::Percentage { value } => cost_per_unit * (value / 100.0),
            Self::Fixed { value } => value,
        }
    }
}

/// Everything needed for one recalculation. Built fresh from form state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PricingInput {
    #[serde(default, deserialize_with = "lenient::vec_or_empty")]
    pub ingredients: Vec<CostLine>,
    #[serde(default, deserialize_with = "lenient::vec_or_empty")]
    pub packaging: Vec<CostLine>,
    #[serde(default, deserialize_with = "lenient::vec_or_empty")]
    pub boxes: Vec<CostLine>,
    #[serde(default, deserialize_with = "lenient::vec_or_empty")]
    pub labels: Vec<CostLine>,
    #[serde(default, deserialize_with = "lenient::vec_or_empty")]
    pub other_costs: Vec<OtherCost>,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub labor_cost_per_unit: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub profit: ProfitPolicy,
}

impl PricingInput {
    /// Route a flat list of tagged cost lines into their category lists.
    pub fn from_lines(
        lines: impl IntoIterator<Item = CostLine>,
        labor_cost_per_unit: f64,
        quantity: f64,
        profit: ProfitPolicy,
    ) -> Self {
        let mut input = Self {
            labor_cost_per_unit,
            quantity,
            profit,
            ..Self::default()
        };
        for line in lines {
            match line.category {
                CostCategory::Ingredient => input.ingredients.push(line),
                CostCategory::Packaging => input.packaging.push(line),
                CostCategory::Box => input.boxes.push(line),
                CostCategory::Label => input.labels.push(line),
            }
        }
        input
    }

    pub fn lines(&self, category: CostCategory) -> &[CostLine] {
        match category {
            CostCategory::Ingredient => &self.ingredients,
            CostCategory::Packaging => &self.packaging,
            CostCategory::Box => &self.boxes,
            CostCategory::Label => &self.labels,
        }
    }
}

/// Derived figures. Full precision; use [`PricingResult::to_display`] for output.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PricingResult {
    pub ingredients_cost_per_unit: f64,
    pub packaging_cost_per_unit: f64,
    pub box_cost_per_unit: f64,
    pub label_cost_per_unit: f64,
    pub labor_cost_per_unit: f64,
    pub other_cost_per_unit: f64,
    pub total_cost_per_unit: f64,
    pub profit_per_unit: f64,
    pub unit_price: f64,
    pub quantity: f64,
    pub total_cost: f64,
    pub total_profit: f64,
    pub total_price: f64,
    pub margin_percent: f64,
}

impl PricingResult {
    pub fn category_cost(&self, category: CostCategory) -> f64 {
        match category {
            CostCategory::Ingredient => self.ingredients_cost_per_unit,
            CostCategory::Packaging => self.packaging_cost_per_unit,
            CostCategory::Box => self.box_cost_per_unit,
            CostCategory::Label => self.label_cost_per_unit,
        }
    }

    pub fn to_display(&self) -> PricingDisplay {
        self.to_display_with(DISPLAY_DECIMALS)
    }

    pub fn to_display_with(&self, decimals: usize) -> PricingDisplay {
        let fmt = |v: f64| format_amount_with(v, decimals);
        PricingDisplay {
            ingredients_cost_per_unit: fmt(self.ingredients_cost_per_unit),
            packaging_cost_per_unit: fmt(self.packaging_cost_per_unit),
            box_cost_per_unit: fmt(self.box_cost_per_unit),
            label_cost_per_unit: fmt(self.label_cost_per_unit),
            labor_cost_per_unit: fmt(self.labor_cost_per_unit),
            other_cost_per_unit: fmt(self.other_cost_per_unit),
            total_cost_per_unit: fmt(self.total_cost_per_unit),
            profit_per_unit: fmt(self.profit_per_unit),
            unit_price: fmt(self.unit_price),
            total_cost: fmt(self.total_cost),
            total_profit: fmt(self.total_profit),
            total_price: fmt(self.total_price),
            margin_percent: fmt(self.margin_percent),
        }
    }
}

/// Rounded strings for presentation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PricingDisplay {
    pub ingredients_cost_per_unit: String,
    pub packaging_cost_per_unit: String,
    pub box_cost_per_unit: String,
    pub label_cost_per_unit: String,
    pub labor_cost_per_unit: String,
    pub other_cost_per_unit: String,
    pub total_cost_per_unit: String,
    pub profit_per_unit: String,
    pub unit_price: String,
    pub total_cost: String,
    pub total_profit: String,
    pub total_price: String,
    pub margin_percent: String,
}

fn sum_lines(lines: &[CostLine], cost: fn(&CostLine) -> f64) -> f64 {
    lines.iter().map(cost).sum()
}

pub fn calculate_pricing(input: &PricingInput) -> PricingResult {
    let ingredients_cost_per_unit = sum_lines(&input.ingredients, CostLine::ingredient_cost);
    let packaging_cost_per_unit = sum_lines(&input.packaging, CostLine::flat_cost);
    let box_cost_per_unit = sum_lines(&input.boxes, CostLine::flat_cost);
    let label_cost_per_unit = sum_lines(&input.labels, CostLine::flat_cost);
    let labor_cost_per_unit = input.labor_cost_per_unit;
    let other_cost_per_unit: f64 = input.other_costs.iter().map(|c| c.amount).sum();

    let total_cost_per_unit = ingredients_cost_per_unit
        + packaging_cost_per_unit
        + box_cost_per_unit
        + label_cost_per_unit
        + labor_cost_per_unit
        + other_cost_per_unit;

    let profit_per_unit = input.profit.profit_for(total_cost_per_unit);
    let unit_price = total_cost_per_unit + profit_per_unit;
    let quantity = input.quantity;

    let margin_percent = if unit_price != 0.0 {
        profit_per_unit / unit_price * 100.0
    } else {
        0.0
    };

    tracing::debug!(
        total_cost_per_unit,
        profit_per_unit,
        unit_price,
        quantity,
        "pricing calculated"
    );

    PricingResult {
        ingredients_cost_per_unit,
        packaging_cost_per_unit,
        box_cost_per_unit,
        label_cost_per_unit,
        labor_cost_per_unit,
        other_cost_per_unit,
        total_cost_per_unit,
        profit_per_unit,
        unit_price,
        quantity,
        total_cost: total_cost_per_unit * quantity,
        total_profit: profit_per_unit * quantity,
        total_price: unit_price * quantity,
        margin_percent,
    }
}
