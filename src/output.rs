use crate::types::{CategorySet, CountrySpendRow};
use crate::util::format_number;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

/// Serde and tabled renames match on every row type, so the table headers
/// double as the CSV header when there are no rows to serialize.
pub fn write_csv<T: Serialize + Tabled>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    if rows.is_empty() {
        wtr.write_record(T::headers().iter().map(|h| h.to_string()))?;
    }
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Pivoted rows have one column per critical category, in allow-list order.
pub fn write_pivot_csv(path: &Path, categories: &CategorySet, rows: &[CountrySpendRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    wtr.write_record(pivot_header(categories))?;
    for row in rows {
        let mut record = vec![row.country.clone()];
        record.extend(categories.iter().map(|c| format!("{:.2}", row.spend_for(c))));
        record.push(format!("{:.2}", row.total));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    print_heading(title, note);
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

pub fn preview_pivot(
    title: &str,
    note: Option<&str>,
    categories: &CategorySet,
    rows: &[CountrySpendRow],
    max_rows: usize,
) {
    print_heading(title, note);
    if rows.is_empty() {
        println!("(no rows)\n");
        return;
    }
    println!("{}\n", render_pivot(categories, rows, max_rows));
}

fn render_pivot(categories: &CategorySet, rows: &[CountrySpendRow], max_rows: usize) -> String {
    let mut builder = Builder::default();
    builder.push_record(pivot_header(categories));
    for row in rows.iter().take(max_rows) {
        let mut record = vec![row.country.clone()];
        record.extend(categories.iter().map(|c| format_number(row.spend_for(c), 2)));
        record.push(format_number(row.total, 2));
        builder.push_record(record);
    }
    builder.build().with(Style::markdown()).to_string()
}

fn pivot_header(categories: &CategorySet) -> Vec<String> {
    let mut header = vec!["Country".to_string()];
    header.extend(categories.iter().map(String::from));
    header.push("Total".to_string());
    header
}

fn print_heading(title: &str, note: Option<&str>) {
    println!("{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TariffImpactRow;
    use std::collections::BTreeMap;

    fn pivot_rows() -> (CategorySet, Vec<CountrySpendRow>) {
        let categories = CategorySet::new(["Transformers", "Switchgear"]).unwrap();
        let mut spend = BTreeMap::new();
        spend.insert("Transformers".to_string(), 1500.0);
        spend.insert("Switchgear".to_string(), 0.0);
        let rows = vec![CountrySpendRow {
            country: "Mexico".to_string(),
            spend,
            total: 1500.0,
        }];
        (categories, rows)
    }

    #[test]
    fn test_write_pivot_csv_keeps_category_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pivot.csv");
        let (categories, rows) = pivot_rows();
        write_pivot_csv(&path, &categories, &rows).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("Country,Transformers,Switchgear,Total"));
        assert_eq!(lines.next(), Some("Mexico,1500.00,0.00,1500.00"));
    }

    #[test]
    fn test_write_csv_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![TariffImpactRow {
            category: "Switchgear".to_string(),
            affected_spend: 250000.0,
            origin_total_spend: 1000000.0,
        }];

        let csv_path = dir.path().join("tariff.csv");
        write_csv(&csv_path, &rows).unwrap();
        let content = std::fs::read_to_string(&csv_path).unwrap();
        assert!(content.starts_with("Category,AffectedSpend,OriginTotalSpend"));
        assert!(content.contains("Switchgear,250000.0,1000000.0"));

        let json_path = dir.path().join("tariff.json");
        write_json(&json_path, &rows).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(value[0]["AffectedSpend"], 250000.0);
    }

    #[test]
    fn test_write_csv_empty_rows_keeps_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tariff.csv");
        let rows: Vec<TariffImpactRow> = Vec::new();
        write_csv(&path, &rows).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Category,AffectedSpend,OriginTotalSpend\n");
    }

    #[test]
    fn test_render_pivot_markdown() {
        let (categories, rows) = pivot_rows();
        let table = render_pivot(&categories, &rows, 5);
        assert!(table.contains("Transformers"));
        assert!(table.contains("1,500.00"));
        assert!(table.lines().count() >= 3);
    }

    #[test]
    fn test_write_csv_bad_path() {
        let rows: Vec<TariffImpactRow> = Vec::new();
        assert!(write_csv(Path::new("/nonexistent-dir/x/y.csv"), &rows).is_err());
    }
}
