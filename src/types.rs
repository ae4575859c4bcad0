use crate::error::ConfigError;
use crate::util::{
    clean_label, display_decimal, display_money, display_optional_score, display_percent,
    is_present, non_negative,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

/// One CSV row as exported from the procurement system. Every column is
/// optional text; numeric cleanup happens in the loader.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Category", alias = "category")]
    pub category: Option<String>,
    #[serde(
        rename = "Average Lead Time (Days)",
        alias = "AverageLeadTimeDays",
        alias = "averageLeadTimeDays"
    )]
    pub average_lead_time_days: Option<String>,
    #[serde(rename = "Annual Spend", alias = "AnnualSpend", alias = "annualSpend")]
    pub annual_spend: Option<String>,
    #[serde(rename = "Vendor Number", alias = "VendorNumber", alias = "vendorNumber")]
    pub vendor_number: Option<String>,
    #[serde(rename = "Vendor Name", alias = "VendorName", alias = "vendorName")]
    pub vendor_name: Option<String>,
    #[serde(
        rename = "Country of Origin",
        alias = "CountryOfOrigin",
        alias = "countryOfOrigin"
    )]
    pub country_of_origin: Option<String>,
}

/// A procurement vendor. Aggregations only ever borrow these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorRecord {
    pub category: Option<String>,
    pub average_lead_time_days: Option<f64>,
    pub annual_spend: Option<f64>,
    pub vendor_number: Option<String>,
    pub vendor_name: Option<String>,
    pub country_of_origin: Option<String>,
}

impl VendorRecord {
    pub fn category_label(&self) -> &str {
        clean_label(self.category.as_deref())
    }

    pub fn country_label(&self) -> &str {
        clean_label(self.country_of_origin.as_deref())
    }

    pub fn spend(&self) -> f64 {
        non_negative(self.annual_spend)
    }

    pub fn lead_time_days(&self) -> f64 {
        non_negative(self.average_lead_time_days)
    }

    /// Supplier identity within a category. Vendors without a number share
    /// a single synthetic key per category.
    pub fn supplier_key(&self) -> String {
        match self.vendor_number.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => format!("{}-unknown", self.category_label()),
        }
    }
}

/// Vendor fields that completeness can be measured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Category,
    AverageLeadTimeDays,
    AnnualSpend,
    VendorNumber,
    VendorName,
    CountryOfOrigin,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Category,
        Field::AverageLeadTimeDays,
        Field::AnnualSpend,
        Field::VendorNumber,
        Field::VendorName,
        Field::CountryOfOrigin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Category => "category",
            Field::AverageLeadTimeDays => "averageLeadTimeDays",
            Field::AnnualSpend => "annualSpend",
            Field::VendorNumber => "vendorNumber",
            Field::VendorName => "vendorName",
            Field::CountryOfOrigin => "countryOfOrigin",
        }
    }

    /// Numeric fields need a positive value, text fields a non-blank one.
    pub fn is_usable(&self, record: &VendorRecord) -> bool {
        match self {
            Field::Category => is_present(record.category.as_deref()),
            Field::AverageLeadTimeDays => non_negative(record.average_lead_time_days) > 0.0,
            Field::AnnualSpend => non_negative(record.annual_spend) > 0.0,
            Field::VendorNumber => is_present(record.vendor_number.as_deref()),
            Field::VendorName => is_present(record.vendor_name.as_deref()),
            Field::CountryOfOrigin => is_present(record.country_of_origin.as_deref()),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .copied()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown vendor field '{}'", s))
    }
}

/// Supply risk bucket derived from how many distinct suppliers a category has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLabel {
    High,
    Medium,
    Low,
}

impl RiskLabel {
    pub fn from_supplier_count(count: usize) -> Self {
        match count {
            0..=2 => RiskLabel::High,
            3..=4 => RiskLabel::Medium,
            _ => RiskLabel::Low,
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLabel::High => write!(f, "High"),
            RiskLabel::Medium => write!(f, "Medium"),
            RiskLabel::Low => write!(f, "Low"),
        }
    }
}

/// Ordered allow-list of critical categories. Names are trimmed, non-blank
/// and unique; the order is the column order of pivoted rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CategorySet(Vec<String>);

impl CategorySet {
    pub fn new<I, S>(names: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                return Err(ConfigError::BlankCategory);
            }
            if !seen.insert(name.to_string()) {
                return Err(ConfigError::DuplicateCategory(name.to_string()));
            }
            out.push(name.to_string());
        }
        if out.is_empty() {
            return Err(ConfigError::EmptyCategories);
        }
        Ok(Self(out))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|c| c == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Zero spend for every member, the starting point of a pivoted row.
    pub fn zeroed(&self) -> BTreeMap<String, f64> {
        self.0.iter().map(|c| (c.clone(), 0.0)).collect()
    }
}

/// Which countries a breakdown should include.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CountryFilter {
    #[default]
    All,
    Only(BTreeSet<String>),
    Exclude(BTreeSet<String>),
}

impl CountryFilter {
    pub fn only<I, S>(countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        CountryFilter::Only(countries.into_iter().map(|c| c.as_ref().trim().to_string()).collect())
    }

    pub fn exclude<I, S>(countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        CountryFilter::Exclude(
            countries.into_iter().map(|c| c.as_ref().trim().to_string()).collect(),
        )
    }

    pub fn allows(&self, country: &str) -> bool {
        match self {
            CountryFilter::All => true,
            CountryFilter::Only(set) => set.contains(country),
            CountryFilter::Exclude(set) => !set.contains(country),
        }
    }
}

/// Entry of the logistics-performance lookup table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticsScore {
    pub country: String,
    pub score: f64,
    pub label: String,
}

/// Pivoted spend for one country: one entry per critical category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountrySpendRow {
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Spend")]
    pub spend: BTreeMap<String, f64>,
    #[serde(rename = "Total")]
    pub total: f64,
}

impl CountrySpendRow {
    pub fn spend_for(&self, category: &str) -> f64 {
        self.spend.get(category).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct CategoryLeadTimeRow {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "AvgLeadTimeDays")]
    #[tabled(rename = "AvgLeadTimeDays", display_with = "display_decimal")]
    pub avg_lead_time_days: f64,
    #[serde(rename = "SpendMillions")]
    #[tabled(rename = "SpendMillions", display_with = "display_money")]
    pub spend_millions: f64,
    #[serde(rename = "SupplierCount")]
    #[tabled(rename = "SupplierCount")]
    pub supplier_count: usize,
    #[serde(rename = "Risk")]
    #[tabled(rename = "Risk")]
    pub risk: RiskLabel,
    #[serde(rename = "BubbleSize")]
    #[tabled(rename = "BubbleSize")]
    pub bubble_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct TariffImpactRow {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "AffectedSpend")]
    #[tabled(rename = "AffectedSpend", display_with = "display_money")]
    pub affected_spend: f64,
    #[serde(rename = "OriginTotalSpend")]
    #[tabled(rename = "OriginTotalSpend", display_with = "display_money")]
    pub origin_total_spend: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct CountryRankingRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Country")]
    #[tabled(rename = "Country")]
    pub country: String,
    #[serde(rename = "TotalSpend")]
    #[tabled(rename = "TotalSpend", display_with = "display_money")]
    pub total_spend: f64,
    #[serde(rename = "SharePct")]
    #[tabled(rename = "SharePct", display_with = "display_percent")]
    pub share_pct: f64,
    #[serde(rename = "Vendors")]
    #[tabled(rename = "Vendors")]
    pub vendor_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct VendorRankingRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Vendor")]
    #[tabled(rename = "Vendor")]
    pub vendor: String,
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Country")]
    #[tabled(rename = "Country")]
    pub country: String,
    #[serde(rename = "AnnualSpend")]
    #[tabled(rename = "AnnualSpend", display_with = "display_money")]
    pub annual_spend: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct AlternativeSourceRow {
    #[serde(rename = "Country")]
    #[tabled(rename = "Country")]
    pub country: String,
    #[serde(rename = "CriticalSpend")]
    #[tabled(rename = "CriticalSpend", display_with = "display_money")]
    pub critical_spend: f64,
    #[serde(rename = "LogisticsScore")]
    #[tabled(rename = "LogisticsScore", display_with = "display_optional_score")]
    pub logistics_score: Option<f64>,
    #[serde(rename = "LogisticsLabel")]
    #[tabled(rename = "LogisticsLabel")]
    pub logistics_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct CompletenessRow {
    #[serde(rename = "Field")]
    #[tabled(rename = "Field")]
    pub field: Field,
    #[serde(rename = "CompletePct")]
    #[tabled(rename = "CompletePct")]
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct TrendPoint {
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "ProjectedSpend")]
    #[tabled(rename = "ProjectedSpend", display_with = "display_money")]
    pub projected_spend: f64,
}

/// Headline numbers for the context and conclusion slides.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub total_vendors: usize,
    pub total_spend: f64,
    pub distinct_categories: usize,
    pub distinct_countries: usize,
    pub origin_country: String,
    pub origin_share_pct: f64,
    pub critical_spend: f64,
    pub high_risk_categories: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_set_validation() {
        let set = CategorySet::new(["Switchgear", " Transformers "]).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains("Transformers"));

        assert!(matches!(
            CategorySet::new(Vec::<String>::new()),
            Err(ConfigError::EmptyCategories)
        ));
        assert!(matches!(
            CategorySet::new(["Switchgear", "  "]),
            Err(ConfigError::BlankCategory)
        ));
        assert!(matches!(
            CategorySet::new(["Switchgear", "Switchgear"]),
            Err(ConfigError::DuplicateCategory(name)) if name == "Switchgear"
        ));
    }

    #[test]
    fn test_risk_label_thresholds() {
        assert_eq!(RiskLabel::from_supplier_count(1), RiskLabel::High);
        assert_eq!(RiskLabel::from_supplier_count(2), RiskLabel::High);
        assert_eq!(RiskLabel::from_supplier_count(3), RiskLabel::Medium);
        assert_eq!(RiskLabel::from_supplier_count(4), RiskLabel::Medium);
        assert_eq!(RiskLabel::from_supplier_count(5), RiskLabel::Low);
    }

    #[test]
    fn test_supplier_key_fallback() {
        let named = VendorRecord {
            category: Some("Generators".into()),
            vendor_number: Some(" V-100 ".into()),
            ..Default::default()
        };
        let anonymous = VendorRecord {
            category: Some("Generators".into()),
            vendor_number: Some("".into()),
            ..Default::default()
        };
        assert_eq!(named.supplier_key(), "V-100");
        assert_eq!(anonymous.supplier_key(), "Generators-unknown");
    }

    #[test]
    fn test_country_filter() {
        let only = CountryFilter::only(["Mexico", "Canada"]);
        assert!(only.allows("Mexico"));
        assert!(!only.allows("USA"));

        let exclude = CountryFilter::exclude(["USA"]);
        assert!(!exclude.allows("USA"));
        assert!(exclude.allows("Unknown"));
        assert!(CountryFilter::All.allows("anything"));
    }

    #[test]
    fn test_country_spend_row_json_keys() {
        let set = CategorySet::new(["Switchgear"]).unwrap();
        let row = CountrySpendRow {
            country: "Mexico".to_string(),
            spend: set.zeroed(),
            total: 0.0,
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["Country"], "Mexico");
        assert_eq!(value["Spend"]["Switchgear"], 0.0);
        assert_eq!(value["Total"], 0.0);
        assert!(value.get("country").is_none());
    }

    #[test]
    fn test_field_from_str() {
        assert_eq!("annualSpend".parse::<Field>(), Ok(Field::AnnualSpend));
        assert_eq!("COUNTRYOFORIGIN".parse::<Field>(), Ok(Field::CountryOfOrigin));
        assert!("price".parse::<Field>().is_err());
    }

    #[test]
    fn test_field_usability() {
        let record = VendorRecord {
            category: Some("  ".into()),
            average_lead_time_days: Some(0.0),
            annual_spend: Some(12.0),
            ..Default::default()
        };
        assert!(!Field::Category.is_usable(&record));
        assert!(!Field::AverageLeadTimeDays.is_usable(&record));
        assert!(Field::AnnualSpend.is_usable(&record));
        assert!(!Field::CountryOfOrigin.is_usable(&record));
    }
}
