//! One render pass over the vendor list.
//!
//! Every aggregation runs exactly once here and the results are bundled
//! for the console preview and the exporters.

use crate::config::Config;
use crate::pipeline;
use crate::types::{
    AlternativeSourceRow, CategoryLeadTimeRow, CategorySet, CompletenessRow, CountryFilter,
    CountryRankingRow, CountrySpendRow, DatasetSummary, Field, TariffImpactRow, TrendPoint,
    VendorRankingRow, VendorRecord,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct DeckReport {
    pub generated_at: DateTime<Utc>,
    pub critical_categories: CategorySet,
    pub tariff_rate: f64,
    pub summary: DatasetSummary,
    pub critical_spend_by_country: Vec<CountrySpendRow>,
    pub alternative_spend_by_country: Vec<CountrySpendRow>,
    pub lead_time_vs_spend: Vec<CategoryLeadTimeRow>,
    pub tariff_impact: Vec<TariffImpactRow>,
    pub completeness: Vec<CompletenessRow>,
    pub country_ranking: Vec<CountryRankingRow>,
    pub vendor_ranking: Vec<VendorRankingRow>,
    pub alternative_sources: Vec<AlternativeSourceRow>,
    pub flow_trend: Vec<TrendPoint>,
}

pub fn build_report(
    records: &[VendorRecord],
    config: &Config,
    categories: &CategorySet,
) -> DeckReport {
    let p = &config.pipeline;

    let critical_spend_by_country =
        pipeline::group_spend_by_category_and_country(records, categories, &CountryFilter::All);
    let alternative_spend_by_country = pipeline::group_spend_by_category_and_country(
        records,
        categories,
        &config.alternative_filter(),
    );
    let alternative_sources =
        pipeline::rank_alternative_sources(&alternative_spend_by_country, &config.logistics);

    let completeness = pipeline::compute_completeness(records, &Field::ALL)
        .into_iter()
        .map(|(field, percent)| CompletenessRow { field, percent })
        .collect();

    let report = DeckReport {
        generated_at: Utc::now(),
        critical_categories: categories.clone(),
        tariff_rate: p.tariff_rate,
        summary: pipeline::summarize_dataset(records, &p.origin_country, categories),
        critical_spend_by_country,
        alternative_spend_by_country,
        lead_time_vs_spend: pipeline::compute_lead_time_vs_spend_by_category(records),
        tariff_impact: pipeline::compute_tariff_impact(records, p.tariff_rate, &p.origin_country),
        completeness,
        country_ranking: pipeline::rank_countries_by_spend(records, p.top_countries),
        vendor_ranking: pipeline::rank_vendors_by_spend(records, p.top_vendors),
        alternative_sources,
        flow_trend: pipeline::project_flow_trend(records, &config.trend_multipliers()),
    };
    info!(
        "Report built: {} vendors, {} critical countries, {} tariff rows",
        records.len(),
        report.critical_spend_by_country.len(),
        report.tariff_impact.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vendor(number: &str, category: &str, country: &str, spend: f64) -> VendorRecord {
        VendorRecord {
            category: Some(category.to_string()),
            average_lead_time_days: Some(60.0),
            annual_spend: Some(spend),
            vendor_number: Some(number.to_string()),
            vendor_name: None,
            country_of_origin: Some(country.to_string()),
        }
    }

    #[test]
    fn test_build_report_sections() {
        let records = vec![
            vendor("V1", "Switchgear", "USA", 1_000_000.0),
            vendor("V2", "Switchgear", "Mexico", 200_000.0),
            vendor("V3", "Transformers", "Germany", 300_000.0),
            vendor("V4", "Office Supplies", "USA", 5_000.0),
        ];
        let config = Config::default();
        let categories = config.validate().unwrap();
        let report = build_report(&records, &config, &categories);

        assert_eq!(report.critical_spend_by_country[0].country, "USA");
        assert!(report
            .alternative_spend_by_country
            .iter()
            .all(|r| r.country != "USA"));
        assert_eq!(report.alternative_sources[0].country, "Germany");
        assert_eq!(report.tariff_impact[0].affected_spend, 250_000.0);
        assert_eq!(report.completeness.len(), Field::ALL.len());
        assert_eq!(report.flow_trend.len(), 4);
        assert_eq!(report.summary.total_vendors, 4);
    }

    #[test]
    fn test_build_report_empty_input() {
        let config = Config::default();
        let categories = config.validate().unwrap();
        let report = build_report(&[], &config, &categories);

        assert!(report.critical_spend_by_country.is_empty());
        assert!(report.lead_time_vs_spend.is_empty());
        assert!(report.tariff_impact.is_empty());
        assert!(report.completeness.iter().all(|c| c.percent == 0));
        assert_eq!(report.summary.total_spend, 0.0);
    }
}
