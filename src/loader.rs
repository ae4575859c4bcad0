use crate::error::LoadError;
use crate::types::{RawRow, VendorRecord};
use crate::util::parse_f64_safe;
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
    pub coerced_values: usize,
}

pub fn load_vendors(path: impl AsRef<Path>) -> Result<(Vec<VendorRecord>, LoadReport), LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Reading vendors from {}", path.display());
    load_vendors_from_reader(file)
}

pub fn load_vendors_from_reader<R: Read>(
    reader: R,
) -> Result<(Vec<VendorRecord>, LoadReport), LoadError> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);
    rdr.headers().map_err(LoadError::Header)?;

    let mut report = LoadReport::default();
    let mut vendors: Vec<VendorRecord> = Vec::new();

    for (idx, result) in rdr.deserialize::<RawRow>().enumerate() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                // +2: header line plus 1-based numbering
                warn!("Skipping vendor row {}: {}", idx + 2, e);
                report.parse_errors += 1;
                continue;
            }
        };

        let average_lead_time_days =
            parse_amount(row.average_lead_time_days.as_deref(), &mut report.coerced_values);
        let annual_spend = parse_amount(row.annual_spend.as_deref(), &mut report.coerced_values);

        vendors.push(VendorRecord {
            category: non_blank(row.category),
            average_lead_time_days,
            annual_spend,
            vendor_number: non_blank(row.vendor_number),
            vendor_name: non_blank(row.vendor_name),
            country_of_origin: non_blank(row.country_of_origin),
        });
    }

    report.loaded_rows = vendors.len();
    Ok((vendors, report))
}

/// Empty cells stay absent; anything present but unusable (text, negative)
/// is coerced to 0 and counted.
fn parse_amount(raw: Option<&str>, coerced: &mut usize) -> Option<f64> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match parse_f64_safe(Some(raw)) {
        Some(v) if v >= 0.0 => Some(v),
        _ => {
            *coerced += 1;
            Some(0.0)
        }
    }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
