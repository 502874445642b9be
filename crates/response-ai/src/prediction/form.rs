use serde::Serialize;

use super::profile::{ProfileField, UnknownField};

/// Presentational grouping of profile fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormSection {
    Demographics,
    Spending,
    Engagement,
    CampaignHistory,
    Technical,
}

impl FormSection {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Demographics,
            Self::Spending,
            Self::Engagement,
            Self::CampaignHistory,
            Self::Technical,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Demographics => "Demographics",
            Self::Spending => "Spending Habits (Last 2 Years)",
            Self::Engagement => "Engagement & Behavior",
            Self::CampaignHistory => "Campaign History",
            Self::Technical => "Technical / Other",
        }
    }

    pub const fn fields(self) -> &'static [ProfileField] {
        use ProfileField::*;
        match self {
            Self::Demographics => &[YearBirth, Income, KidHome, TeenHome],
            Self::Spending => &[
                MntWines,
                MntFruits,
                MntMeatProducts,
                MntFishProducts,
                MntSweetProducts,
                MntGoldProds,
            ],
            Self::Engagement => &[
                Recency,
                NumDealsPurchases,
                NumWebPurchases,
                NumCatalogPurchases,
                NumStorePurchases,
                NumWebVisitsMonth,
            ],
            Self::CampaignHistory => &[
                AcceptedCmp1,
                AcceptedCmp2,
                AcceptedCmp3,
                AcceptedCmp4,
                AcceptedCmp5,
            ],
            Self::Technical => &[Complain, ZCostContact, ZRevenue],
        }
    }
}

/// How a field is entered and what values it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Year,
    Count,
    Currency,
    Toggle,
}

/// Input control description for one field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSpec {
    pub field: ProfileField,
    pub label: &'static str,
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    pub step: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldValueError {
    #[error("{field} must be a finite number")]
    NotFinite { field: ProfileField },
    #[error("{field} must be a whole number, got {value}")]
    NotWhole { field: ProfileField, value: f64 },
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: ProfileField,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{field} is a toggle and only accepts 0 or 1, got {value}")]
    NotToggle { field: ProfileField, value: f64 },
}

impl FieldSpec {
    pub fn for_field(field: ProfileField) -> Self {
        use ProfileField::*;
        let (label, kind, min, max, step) = match field {
            YearBirth => ("Year of Birth", FieldKind::Year, Some(1900.0), Some(2024.0), 1.0),
            Income => ("Annual Income", FieldKind::Currency, Some(0.0), None, 100.0),
            KidHome => ("Kids at Home", FieldKind::Count, Some(0.0), Some(10.0), 1.0),
            TeenHome => ("Teens at Home", FieldKind::Count, Some(0.0), Some(10.0), 1.0),
            Recency => ("Days Since Last Purchase", FieldKind::Count, Some(0.0), None, 1.0),
            MntWines => ("Wines", FieldKind::Currency, Some(0.0), None, 1.0),
            MntFruits => ("Fruits", FieldKind::Currency, Some(0.0), None, 1.0),
            MntMeatProducts => ("Meat Products", FieldKind::Currency, Some(0.0), None, 1.0),
            MntFishProducts => ("Fish Products", FieldKind::Currency, Some(0.0), None, 1.0),
            MntSweetProducts => ("Sweet Products", FieldKind::Currency, Some(0.0), None, 1.0),
            MntGoldProds => ("Gold Products", FieldKind::Currency, Some(0.0), None, 1.0),
            NumDealsPurchases => ("Deals Purchases", FieldKind::Count, Some(0.0), None, 1.0),
            NumWebPurchases => ("Web Purchases", FieldKind::Count, Some(0.0), None, 1.0),
            NumCatalogPurchases => ("Catalog Purchases", FieldKind::Count, Some(0.0), None, 1.0),
            NumStorePurchases => ("Store Purchases", FieldKind::Count, Some(0.0), None, 1.0),
            NumWebVisitsMonth => ("Web Visits (Month)", FieldKind::Count, Some(0.0), None, 1.0),
            AcceptedCmp1 => ("Accepted Campaign 1", FieldKind::Toggle, None, None, 1.0),
            AcceptedCmp2 => ("Accepted Campaign 2", FieldKind::Toggle, None, None, 1.0),
            AcceptedCmp3 => ("Accepted Campaign 3", FieldKind::Toggle, None, None, 1.0),
            AcceptedCmp4 => ("Accepted Campaign 4", FieldKind::Toggle, None, None, 1.0),
            AcceptedCmp5 => ("Accepted Campaign 5", FieldKind::Toggle, None, None, 1.0),
            Complain => ("Complaints Filed", FieldKind::Toggle, None, None, 1.0),
            ZCostContact => ("Z Cost Contact", FieldKind::Count, Some(0.0), None, 1.0),
            ZRevenue => ("Z Revenue", FieldKind::Count, Some(0.0), None, 1.0),
        };

        Self {
            field,
            label,
            kind,
            min,
            max,
            step,
        }
    }

    /// Validate raw user input before it reaches the controller.
    pub fn check(&self, value: f64) -> Result<f64, FieldValueError> {
        let field = self.field;
        if !value.is_finite() {
            return Err(FieldValueError::NotFinite { field });
        }

        match self.kind {
            FieldKind::Toggle => {
                if value == 0.0 || value == 1.0 {
                    Ok(value)
                } else {
                    Err(FieldValueError::NotToggle { field, value })
                }
            }
            FieldKind::Year | FieldKind::Count if value.fract() != 0.0 => {
                Err(FieldValueError::NotWhole { field, value })
            }
            _ => {
                let min = self.min.unwrap_or(f64::MIN);
                let max = self.max.unwrap_or(f64::MAX);
                if value < min || value > max {
                    Err(FieldValueError::OutOfRange {
                        field,
                        value,
                        min,
                        max,
                    })
                } else {
                    Ok(value)
                }
            }
        }
    }
}

/// Raised when user input names an unknown field or carries an invalid value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error(transparent)]
    Unknown(#[from] UnknownField),
    #[error(transparent)]
    Value(#[from] FieldValueError),
}

/// Resolve a field by wire name and check the value against its spec.
pub fn validate_input(name: &str, value: f64) -> Result<(ProfileField, f64), FieldError> {
    let field = name.parse::<ProfileField>()?;
    let value = FieldSpec::for_field(field).check(value)?;
    Ok((field, value))
}

/// Parse a `Field=value` assignment as typed on the command line.
pub fn parse_assignment(raw: &str) -> Result<(ProfileField, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{raw}'"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid number '{}' for {} ({err})", value.trim(), name.trim()))?;
    validate_input(name, value).map_err(|err| err.to_string())
}

/// One section with the specs of its fields, ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SectionLayout {
    pub section: FormSection,
    pub title: &'static str,
    pub fields: Vec<FieldSpec>,
}

/// The full form, sections in display order.
pub fn form_layout() -> Vec<SectionLayout> {
    FormSection::ordered()
        .into_iter()
        .map(|section| SectionLayout {
            section,
            title: section.label(),
            fields: section
                .fields()
                .iter()
                .copied()
                .map(FieldSpec::for_field)
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_field_belongs_to_exactly_one_section() {
        let mut seen = HashSet::new();
        for section in FormSection::ordered() {
            for field in section.fields() {
                assert!(seen.insert(*field), "{field} listed twice");
            }
        }
        assert_eq!(seen.len(), ProfileField::COUNT);
    }

    #[test]
    fn checks_reject_values_the_form_would_not_accept() {
        let year = FieldSpec::for_field(ProfileField::YearBirth);
        assert!(year.check(1985.0).is_ok());
        assert!(matches!(
            year.check(1850.0),
            Err(FieldValueError::OutOfRange { .. })
        ));

        let kids = FieldSpec::for_field(ProfileField::KidHome);
        assert!(matches!(
            kids.check(1.5),
            Err(FieldValueError::NotWhole { .. })
        ));
        assert!(matches!(
            kids.check(11.0),
            Err(FieldValueError::OutOfRange { .. })
        ));

        let toggle = FieldSpec::for_field(ProfileField::AcceptedCmp4);
        assert!(toggle.check(1.0).is_ok());
        assert!(matches!(
            toggle.check(2.0),
            Err(FieldValueError::NotToggle { .. })
        ));

        let income = FieldSpec::for_field(ProfileField::Income);
        assert_eq!(income.check(72_500.25), Ok(72_500.25));
        assert!(matches!(
            income.check(-1.0),
            Err(FieldValueError::OutOfRange { .. })
        ));
        assert!(matches!(
            income.check(f64::NAN),
            Err(FieldValueError::NotFinite { .. })
        ));
    }

    #[test]
    fn assignments_parse_and_validate() {
        assert_eq!(
            parse_assignment("Income=75000"),
            Ok((ProfileField::Income, 75_000.0))
        );
        assert_eq!(
            parse_assignment(" NumWebPurchases = 12 "),
            Ok((ProfileField::NumWebPurchases, 12.0))
        );
        assert!(parse_assignment("Income").is_err());
        assert!(parse_assignment("Income=lots").is_err());
        assert_eq!(
            parse_assignment("Salary=1"),
            Err("unknown profile field 'Salary'".to_string())
        );
        assert!(matches!(
            validate_input("Complain", 2.0),
            Err(FieldError::Value(FieldValueError::NotToggle { .. }))
        ));
    }

    #[test]
    fn layout_titles_follow_section_order() {
        let titles: Vec<_> = form_layout().iter().map(|layout| layout.title).collect();
        assert_eq!(
            titles,
            vec![
                "Demographics",
                "Spending Habits (Last 2 Years)",
                "Engagement & Behavior",
                "Campaign History",
                "Technical / Other",
            ]
        );
    }
}
