//! Vendor aggregation pipeline.
//!
//! Pure transforms from a borrowed vendor list into the summary rows the
//! deck's charts and tables consume. Nothing here fails: missing values
//! become "Unknown" or 0, empty input gives empty output, and every
//! ranking breaks ties by name so repeated calls agree.

use crate::types::{
    AlternativeSourceRow, CategoryLeadTimeRow, CategorySet, CountryFilter, CountryRankingRow,
    CountrySpendRow, DatasetSummary, Field, LogisticsScore, RiskLabel, TariffImpactRow,
    TrendPoint, VendorRankingRow, VendorRecord,
};
use crate::util::{percent_of, round_percent, to_millions, UNKNOWN};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

pub const MAX_COUNTRY_ROWS: usize = 8;
pub const MAX_LEAD_TIME_ROWS: usize = 15;
pub const MAX_TARIFF_ROWS: usize = 5;

fn desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Critical-category spend pivoted into one row per country, top 8 by total.
pub fn group_spend_by_category_and_country(
    records: &[VendorRecord],
    critical: &CategorySet,
    filter: &CountryFilter,
) -> Vec<CountrySpendRow> {
    let mut map: HashMap<&str, CountrySpendRow> = HashMap::new();
    for r in records {
        let category = r.category_label();
        let country = r.country_label();
        if !critical.contains(category) || !filter.allows(country) {
            continue;
        }
        let row = map.entry(country).or_insert_with(|| CountrySpendRow {
            country: country.to_string(),
            spend: critical.zeroed(),
            total: 0.0,
        });
        let spend = r.spend();
        if let Some(v) = row.spend.get_mut(category) {
            *v += spend;
        }
        row.total += spend;
    }

    let mut rows: Vec<CountrySpendRow> = map.into_values().collect();
    rows.sort_by(|a, b| desc(a.total, b.total).then_with(|| a.country.cmp(&b.country)));
    rows.truncate(MAX_COUNTRY_ROWS);
    debug!(
        "Country spend breakdown: {} records -> {} rows",
        records.len(),
        rows.len()
    );
    rows
}

/// Lead time against spend per category, with supplier concentration risk.
pub fn compute_lead_time_vs_spend_by_category(
    records: &[VendorRecord],
) -> Vec<CategoryLeadTimeRow> {
    #[derive(Default)]
    struct Acc {
        lead_time_total: f64,
        lead_time_count: usize,
        spend: f64,
        suppliers: HashSet<String>,
    }

    let mut map: HashMap<&str, Acc> = HashMap::new();
    for r in records {
        let e = map.entry(r.category_label()).or_default();
        let lead = r.lead_time_days();
        if lead > 0.0 {
            e.lead_time_total += lead;
            e.lead_time_count += 1;
        }
        e.spend += r.spend();
        e.suppliers.insert(r.supplier_key());
    }

    let mut rows: Vec<CategoryLeadTimeRow> = map
        .into_iter()
        .filter(|(_, acc)| acc.lead_time_count > 0 && acc.spend > 0.0)
        .map(|(category, acc)| {
            let supplier_count = acc.suppliers.len();
            CategoryLeadTimeRow {
                category: category.to_string(),
                avg_lead_time_days: acc.lead_time_total / acc.lead_time_count as f64,
                spend_millions: to_millions(acc.spend),
                supplier_count,
                risk: RiskLabel::from_supplier_count(supplier_count),
                bubble_size: bubble_size(supplier_count),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        desc(a.spend_millions, b.spend_millions).then_with(|| a.category.cmp(&b.category))
    });
    rows.truncate(MAX_LEAD_TIME_ROWS);
    debug!("Lead time vs spend: {} categories kept", rows.len());
    rows
}

/// Chart marker size; scarcer supply draws a bigger bubble, never below 20.
pub fn bubble_size(supplier_count: usize) -> u32 {
    let raw = 80i64.saturating_sub(5i64.saturating_mul(supplier_count as i64));
    raw.max(20) as u32
}

/// Spend exposed to a tariff on goods from `origin_country`, top 5 categories.
pub fn compute_tariff_impact(
    records: &[VendorRecord],
    tariff_rate: f64,
    origin_country: &str,
) -> Vec<TariffImpactRow> {
    let origin = origin_country.trim();
    let mut by_category: HashMap<&str, f64> = HashMap::new();
    for r in records.iter().filter(|r| r.country_label() == origin) {
        *by_category.entry(r.category_label()).or_insert(0.0) += r.spend();
    }

    let mut rows: Vec<TariffImpactRow> = by_category
        .into_iter()
        .map(|(category, total)| TariffImpactRow {
            category: category.to_string(),
            affected_spend: total * tariff_rate,
            origin_total_spend: total,
        })
        .filter(|row| row.affected_spend > 0.0)
        .collect();

    rows.sort_by(|a, b| {
        desc(a.affected_spend, b.affected_spend).then_with(|| a.category.cmp(&b.category))
    });
    rows.truncate(MAX_TARIFF_ROWS);
    debug!(
        "Tariff impact at {:.0}% on {}: {} categories",
        tariff_rate * 100.0,
        origin,
        rows.len()
    );
    rows
}

/// Share of records with a usable value for each requested field, as an
/// integer percentage. An empty dataset scores 0 everywhere.
pub fn compute_completeness(records: &[VendorRecord], fields: &[Field]) -> BTreeMap<Field, u32> {
    fields
        .iter()
        .map(|field| {
            let usable = records.iter().filter(|r| field.is_usable(r)).count();
            (*field, round_percent(usable, records.len()))
        })
        .collect()
}

/// Countries ranked by total spend with their share of the grand total.
pub fn rank_countries_by_spend(records: &[VendorRecord], limit: usize) -> Vec<CountryRankingRow> {
    let mut map: HashMap<&str, (f64, usize)> = HashMap::new();
    let mut grand_total = 0.0;
    for r in records {
        let e = map.entry(r.country_label()).or_insert((0.0, 0));
        e.0 += r.spend();
        e.1 += 1;
        grand_total += r.spend();
    }

    let mut tmp: Vec<(&str, f64, usize)> = map
        .into_iter()
        .map(|(country, (spend, count))| (country, spend, count))
        .collect();
    tmp.sort_by(|a, b| desc(a.1, b.1).then_with(|| a.0.cmp(b.0)));

    tmp.into_iter()
        .take(limit)
        .enumerate()
        .map(|(idx, (country, spend, count))| CountryRankingRow {
            rank: idx + 1,
            country: country.to_string(),
            total_spend: spend,
            share_pct: percent_of(spend, grand_total),
            vendor_count: count,
        })
        .collect()
}

/// Individual vendors with positive spend, largest first.
pub fn rank_vendors_by_spend(records: &[VendorRecord], limit: usize) -> Vec<VendorRankingRow> {
    let mut tmp: Vec<(String, &VendorRecord)> = records
        .iter()
        .filter(|r| r.spend() > 0.0)
        .map(|r| (vendor_display_name(r), r))
        .collect();
    tmp.sort_by(|a, b| desc(a.1.spend(), b.1.spend()).then_with(|| a.0.cmp(&b.0)));

    tmp.into_iter()
        .take(limit)
        .enumerate()
        .map(|(idx, (vendor, r))| VendorRankingRow {
            rank: idx + 1,
            vendor,
            category: r.category_label().to_string(),
            country: r.country_label().to_string(),
            annual_spend: r.spend(),
        })
        .collect()
}

fn vendor_display_name(r: &VendorRecord) -> String {
    [r.vendor_name.as_deref(), r.vendor_number.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or("Unknown Vendor")
        .to_string()
}

/// Attach logistics-performance scores to a country breakdown. Scored
/// countries come first, best score first; unscored ones follow by spend.
pub fn rank_alternative_sources(
    rows: &[CountrySpendRow],
    table: &[LogisticsScore],
) -> Vec<AlternativeSourceRow> {
    let mut out: Vec<AlternativeSourceRow> = rows
        .iter()
        .map(|row| {
            let entry = table.iter().find(|s| s.country == row.country);
            AlternativeSourceRow {
                country: row.country.clone(),
                critical_spend: row.total,
                logistics_score: entry.map(|s| s.score),
                logistics_label: entry
                    .map(|s| s.label.clone())
                    .unwrap_or_else(|| UNKNOWN.to_string()),
            }
        })
        .collect();

    out.sort_by(|a, b| {
        let by_score = match (a.logistics_score, b.logistics_score) {
            (Some(x), Some(y)) => desc(x, y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_score
            .then_with(|| desc(a.critical_spend, b.critical_spend))
            .then_with(|| a.country.cmp(&b.country))
    });
    out
}

/// Year-over-year flow projected from today's total spend with fixed
/// per-year multipliers.
pub fn project_flow_trend(records: &[VendorRecord], growth: &[(i32, f64)]) -> Vec<TrendPoint> {
    let base: f64 = records.iter().map(VendorRecord::spend).sum();
    let mut points: Vec<TrendPoint> = growth
        .iter()
        .map(|(year, multiplier)| TrendPoint {
            year: *year,
            projected_spend: base * multiplier.max(0.0),
        })
        .collect();
    points.sort_by_key(|p| p.year);
    points
}

pub fn summarize_dataset(
    records: &[VendorRecord],
    origin_country: &str,
    critical: &CategorySet,
) -> DatasetSummary {
    let origin = origin_country.trim();
    let categories: HashSet<&str> = records.iter().map(|r| r.category_label()).collect();
    let countries: HashSet<&str> = records.iter().map(|r| r.country_label()).collect();
    let total_spend: f64 = records.iter().map(VendorRecord::spend).sum();
    let origin_spend: f64 = records
        .iter()
        .filter(|r| r.country_label() == origin)
        .map(VendorRecord::spend)
        .sum();
    let critical_spend: f64 = records
        .iter()
        .filter(|r| critical.contains(r.category_label()))
        .map(VendorRecord::spend)
        .sum();
    // Counted over every category with spend, not just the 15 charted ones.
    let high_risk_categories = category_risk_labels(records)
        .into_iter()
        .filter(|risk| *risk == RiskLabel::High)
        .count();

    DatasetSummary {
        total_vendors: records.len(),
        total_spend,
        distinct_categories: categories.len(),
        distinct_countries: countries.len(),
        origin_country: origin.to_string(),
        origin_share_pct: percent_of(origin_spend, total_spend),
        critical_spend,
        high_risk_categories,
    }
}

fn category_risk_labels(records: &[VendorRecord]) -> Vec<RiskLabel> {
    let mut suppliers: HashMap<&str, HashSet<String>> = HashMap::new();
    let mut spend: HashMap<&str, f64> = HashMap::new();
    for r in records {
        suppliers
            .entry(r.category_label())
            .or_default()
            .insert(r.supplier_key());
        *spend.entry(r.category_label()).or_insert(0.0) += r.spend();
    }
    suppliers
        .into_iter()
        .filter(|(category, _)| spend.get(category).copied().unwrap_or(0.0) > 0.0)
        .map(|(_, set)| RiskLabel::from_supplier_count(set.len()))
        .collect()
}
