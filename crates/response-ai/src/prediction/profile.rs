use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Customer attributes submitted for scoring.
///
/// Field names on the wire match the column names the classification model was
/// trained on, so the struct serializes straight into the request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    #[serde(rename = "Year_Birth")]
    pub year_birth: i32,
    #[serde(rename = "Income")]
    pub income: f64,
    #[serde(rename = "Kidhome")]
    pub kid_home: u32,
    #[serde(rename = "Teenhome")]
    pub teen_home: u32,
    #[serde(rename = "Recency")]
    pub recency: u32,
    #[serde(rename = "MntWines")]
    pub mnt_wines: f64,
    #[serde(rename = "MntFruits")]
    pub mnt_fruits: f64,
    #[serde(rename = "MntMeatProducts")]
    pub mnt_meat_products: f64,
    #[serde(rename = "MntFishProducts")]
    pub mnt_fish_products: f64,
    #[serde(rename = "MntSweetProducts")]
    pub mnt_sweet_products: f64,
    #[serde(rename = "MntGoldProds")]
    pub mnt_gold_prods: f64,
    #[serde(rename = "NumDealsPurchases")]
    pub num_deals_purchases: u32,
    #[serde(rename = "NumWebPurchases")]
    pub num_web_purchases: u32,
    #[serde(rename = "NumCatalogPurchases")]
    pub num_catalog_purchases: u32,
    #[serde(rename = "NumStorePurchases")]
    pub num_store_purchases: u32,
    #[serde(rename = "NumWebVisitsMonth")]
    pub num_web_visits_month: u32,
    #[serde(rename = "AcceptedCmp3")]
    pub accepted_cmp3: u8,
    #[serde(rename = "AcceptedCmp4")]
    pub accepted_cmp4: u8,
    #[serde(rename = "AcceptedCmp5")]
    pub accepted_cmp5: u8,
    #[serde(rename = "AcceptedCmp1")]
    pub accepted_cmp1: u8,
    #[serde(rename = "AcceptedCmp2")]
    pub accepted_cmp2: u8,
    #[serde(rename = "Complain")]
    pub complain: u8,
    #[serde(rename = "Z_CostContact")]
    pub z_cost_contact: u32,
    #[serde(rename = "Z_Revenue")]
    pub z_revenue: u32,
}

impl Default for CustomerProfile {
    fn default() -> Self {
        Self {
            year_birth: 1980,
            income: 55_000.0,
            kid_home: 0,
            teen_home: 0,
            recency: 30,
            mnt_wines: 200.0,
            mnt_fruits: 20.0,
            mnt_meat_products: 100.0,
            mnt_fish_products: 15.0,
            mnt_sweet_products: 10.0,
            mnt_gold_prods: 15.0,
            num_deals_purchases: 2,
            num_web_purchases: 5,
            num_catalog_purchases: 2,
            num_store_purchases: 5,
            num_web_visits_month: 4,
            accepted_cmp3: 0,
            accepted_cmp4: 0,
            accepted_cmp5: 0,
            accepted_cmp1: 0,
            accepted_cmp2: 0,
            complain: 0,
            z_cost_contact: 3,
            z_revenue: 11,
        }
    }
}

impl CustomerProfile {
    /// Current value of a field as a plain number.
    pub fn get(&self, field: ProfileField) -> f64 {
        use ProfileField::*;
        match field {
            YearBirth => f64::from(self.year_birth),
            Income => self.income,
            KidHome => f64::from(self.kid_home),
            TeenHome => f64::from(self.teen_home),
            Recency => f64::from(self.recency),
            MntWines => self.mnt_wines,
            MntFruits => self.mnt_fruits,
            MntMeatProducts => self.mnt_meat_products,
            MntFishProducts => self.mnt_fish_products,
            MntSweetProducts => self.mnt_sweet_products,
            MntGoldProds => self.mnt_gold_prods,
            NumDealsPurchases => f64::from(self.num_deals_purchases),
            NumWebPurchases => f64::from(self.num_web_purchases),
            NumCatalogPurchases => f64::from(self.num_catalog_purchases),
            NumStorePurchases => f64::from(self.num_store_purchases),
            NumWebVisitsMonth => f64::from(self.num_web_visits_month),
            AcceptedCmp3 => f64::from(self.accepted_cmp3),
            AcceptedCmp4 => f64::from(self.accepted_cmp4),
            AcceptedCmp5 => f64::from(self.accepted_cmp5),
            AcceptedCmp1 => f64::from(self.accepted_cmp1),
            AcceptedCmp2 => f64::from(self.accepted_cmp2),
            Complain => f64::from(self.complain),
            ZCostContact => f64::from(self.z_cost_contact),
            ZRevenue => f64::from(self.z_revenue),
        }
    }

    /// Store `value` into `field`, normalized to the field's storage type.
    ///
    /// Integer fields truncate toward zero and saturate at their bounds
    /// (negative counts become 0). Flags store 1 for any non-zero value.
    /// Currency amounts below zero clamp to 0.
    pub fn set(&mut self, field: ProfileField, value: f64) {
        use ProfileField::*;
        let amount = if value.is_nan() { 0.0 } else { value.max(0.0) };
        let count = value as u32;
        let flag = u8::from(value != 0.0 && !value.is_nan());
        match field {
            YearBirth => self.year_birth = value as i32,
            Income => self.income = amount,
            KidHome => self.kid_home = count,
            TeenHome => self.teen_home = count,
            Recency => self.recency = count,
            MntWines => self.mnt_wines = amount,
            MntFruits => self.mnt_fruits = amount,
            MntMeatProducts => self.mnt_meat_products = amount,
            MntFishProducts => self.mnt_fish_products = amount,
            MntSweetProducts => self.mnt_sweet_products = amount,
            MntGoldProds => self.mnt_gold_prods = amount,
            NumDealsPurchases => self.num_deals_purchases = count,
            NumWebPurchases => self.num_web_purchases = count,
            NumCatalogPurchases => self.num_catalog_purchases = count,
            NumStorePurchases => self.num_store_purchases = count,
            NumWebVisitsMonth => self.num_web_visits_month = count,
            AcceptedCmp3 => self.accepted_cmp3 = flag,
            AcceptedCmp4 => self.accepted_cmp4 = flag,
            AcceptedCmp5 => self.accepted_cmp5 = flag,
            AcceptedCmp1 => self.accepted_cmp1 = flag,
            AcceptedCmp2 => self.accepted_cmp2 = flag,
            Complain => self.complain = flag,
            ZCostContact => self.z_cost_contact = count,
            ZRevenue => self.z_revenue = count,
        }
    }

    /// Wine, meat and gold spend combined.
    pub fn headline_spend(&self) -> f64 {
        self.mnt_wines + self.mnt_meat_products + self.mnt_gold_prods
    }

    /// Web and in-store purchases combined.
    pub fn channel_engagement(&self) -> u32 {
        self.num_web_purchases
            .saturating_add(self.num_store_purchases)
    }
}

/// Identifier for one of the 24 profile attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProfileField {
    #[serde(rename = "Year_Birth")]
    YearBirth,
    Income,
    #[serde(rename = "Kidhome")]
    KidHome,
    #[serde(rename = "Teenhome")]
    TeenHome,
    Recency,
    MntWines,
    MntFruits,
    MntMeatProducts,
    MntFishProducts,
    MntSweetProducts,
    MntGoldProds,
    NumDealsPurchases,
    NumWebPurchases,
    NumCatalogPurchases,
    NumStorePurchases,
    NumWebVisitsMonth,
    AcceptedCmp3,
    AcceptedCmp4,
    AcceptedCmp5,
    AcceptedCmp1,
    AcceptedCmp2,
    Complain,
    #[serde(rename = "Z_CostContact")]
    ZCostContact,
    #[serde(rename = "Z_Revenue")]
    ZRevenue,
}

impl ProfileField {
    pub const COUNT: usize = 24;

    /// Fields in the column order the model expects.
    pub const fn ordered() -> [Self; Self::COUNT] {
        [
            Self::YearBirth,
            Self::Income,
            Self::KidHome,
            Self::TeenHome,
            Self::Recency,
            Self::MntWines,
            Self::MntFruits,
            Self::MntMeatProducts,
            Self::MntFishProducts,
            Self::MntSweetProducts,
            Self::MntGoldProds,
            Self::NumDealsPurchases,
            Self::NumWebPurchases,
            Self::NumCatalogPurchases,
            Self::NumStorePurchases,
            Self::NumWebVisitsMonth,
            Self::AcceptedCmp3,
            Self::AcceptedCmp4,
            Self::AcceptedCmp5,
            Self::AcceptedCmp1,
            Self::AcceptedCmp2,
            Self::Complain,
            Self::ZCostContact,
            Self::ZRevenue,
        ]
    }

    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::YearBirth => "Year_Birth",
            Self::Income => "Income",
            Self::KidHome => "Kidhome",
            Self::TeenHome => "Teenhome",
            Self::Recency => "Recency",
            Self::MntWines => "MntWines",
            Self::MntFruits => "MntFruits",
            Self::MntMeatProducts => "MntMeatProducts",
            Self::MntFishProducts => "MntFishProducts",
            Self::MntSweetProducts => "MntSweetProducts",
            Self::MntGoldProds => "MntGoldProds",
            Self::NumDealsPurchases => "NumDealsPurchases",
            Self::NumWebPurchases => "NumWebPurchases",
            Self::NumCatalogPurchases => "NumCatalogPurchases",
            Self::NumStorePurchases => "NumStorePurchases",
            Self::NumWebVisitsMonth => "NumWebVisitsMonth",
            Self::AcceptedCmp3 => "AcceptedCmp3",
            Self::AcceptedCmp4 => "AcceptedCmp4",
            Self::AcceptedCmp5 => "AcceptedCmp5",
            Self::AcceptedCmp1 => "AcceptedCmp1",
            Self::AcceptedCmp2 => "AcceptedCmp2",
            Self::Complain => "Complain",
            Self::ZCostContact => "Z_CostContact",
            Self::ZRevenue => "Z_Revenue",
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Raised when a caller names a field the profile does not have.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown profile field '{0}'")]
pub struct UnknownField(pub String);

impl FromStr for ProfileField {
    type Err = UnknownField;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        Self::ordered()
            .into_iter()
            .find(|field| field.wire_name() == trimmed)
            .ok_or_else(|| UnknownField(trimmed.to_string()))
    }
}
