use std::io::Read;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

use super::product::{default_currency, Product};
use crate::records::{CrudService, Entity, Record, RecordId, ServiceError};

/// Outcome of a catalog upload. Bad rows never abort the import.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub imported: Vec<Record<Product>>,
    pub rejected: Vec<RejectedRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("invalid catalog CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("catalog header is missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

const REQUIRED_COLUMNS: [&str; 3] = ["sku", "name", "price"];

#[derive(Debug, Deserialize)]
struct CatalogRow {
    sku: String,
    name: String,
    price: f64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    category: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    brand: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    model: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    currency: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    description: Option<String>,
}

impl CatalogRow {
    fn into_product(self, distributor_id: RecordId) -> Product {
        Product {
            distributor_id,
            name: self.name,
            sku: self.sku,
            description: self.description,
            category: self.category,
            brand: self.brand,
            model: self.model,
            price: self.price,
            currency: self
                .currency
                .map(|code| code.to_ascii_uppercase())
                .unwrap_or_else(default_currency),
            is_active: true,
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Loads `SKU,Name,Price,...` rows into `service` for `distributor_id`. Header names are
/// matched case-insensitively.
pub fn import_products<R: Read>(
    service: &CrudService<Product>,
    distributor_id: RecordId,
    reader: R,
) -> Result<ImportReport, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: csv::StringRecord = csv_reader
        .headers()?
        .iter()
        .map(|header| header.to_ascii_lowercase())
        .collect();
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|header| header == **column))
    {
        return Err(ImportError::MissingColumn(*missing));
    }

    let mut report = ImportReport {
        imported: Vec::new(),
        rejected: Vec::new(),
    };

    for row in csv_reader.records() {
        let row = match row {
            Ok(row) => row,
            Err(err) if err.is_io_error() => return Err(err.into()),
            Err(err) => {
                report.rejected.push(RejectedRow {
                    line: err.position().map(|position| position.line()).unwrap_or(0),
                    reason: err.to_string(),
                });
                continue;
            }
        };
        let line = row.position().map(|position| position.line()).unwrap_or(0);

        let product = match row.deserialize::<CatalogRow>(Some(&headers)) {
            Ok(parsed) => parsed.into_product(distributor_id),
            Err(err) => {
                report.rejected.push(RejectedRow {
                    line,
                    reason: err.to_string(),
                });
                continue;
            }
        };

        match service.create(product) {
            Ok(record) => report.imported.push(record),
            Err(ServiceError::Validation(error)) => report.rejected.push(RejectedRow {
                line,
                reason: error.to_string(),
            }),
            Err(other) => return Err(other.into()),
        }
    }

    if !report.rejected.is_empty() {
        warn!(
            %distributor_id,
            rejected = report.rejected.len(),
            "catalog import skipped rows"
        );
    }
    info!(
        %distributor_id,
        imported = report.imported.len(),
        kind = Product::KIND,
        "catalog import finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{InMemoryRepository, PageLimits};
    use std::io::Cursor;
    use std::sync::Arc;

    fn service() -> CrudService<Product> {
        CrudService::new(
            Arc::new(InMemoryRepository::<Product>::default()),
            PageLimits::default(),
        )
    }

    #[test]
    fn imports_valid_rows_and_reports_bad_ones() {
        let csv = "\
SKU,Name,Price,Currency,Category,Brand,Model,Description
TR-100,Compact Tractor,18500.00,usd,Machinery,Agri,T100,Two-wheel drive
TR-200,Utility Tractor,not-a-price,USD,Machinery,Agri,T200,
,Seeder,900,USD,,,,
";
        let service = service();
        let distributor = RecordId::new();
        let report =
            import_products(&service, distributor, Cursor::new(csv)).expect("import runs");

        assert_eq!(report.imported.len(), 1);
        let tractor = &report.imported[0].data;
        assert_eq!(tractor.sku, "TR-100");
        assert_eq!(tractor.currency, "USD");
        assert_eq!(tractor.distributor_id, distributor);
        assert_eq!(tractor.description.as_deref(), Some("Two-wheel drive"));

        let lines: Vec<_> = report.rejected.iter().map(|row| row.line).collect();
        assert_eq!(lines, [3, 4]);
        assert!(report.rejected[1].reason.contains("sku"));
    }

    #[test]
    fn header_matching_ignores_case_and_defaults_currency() {
        let csv = "sku,NAME,price\nHV-1,Harvester,99000\n";
        let service = service();
        let report =
            import_products(&service, RecordId::new(), Cursor::new(csv)).expect("import runs");
        assert_eq!(report.imported.len(), 1);
        assert_eq!(report.imported[0].data.currency, "USD");
        assert!(report.imported[0].data.category.is_none());
    }

    #[test]
    fn unreadable_row_is_rejected_without_stopping_the_import() {
        let mut csv = b"SKU,Name,Price\nHV-1,Harvester,99000\n".to_vec();
        csv.extend_from_slice(b"HV-2,Broken \xff name,1200\n");
        csv.extend_from_slice(b"HV-3,Baler,4300\n");

        let service = service();
        let report =
            import_products(&service, RecordId::new(), Cursor::new(csv)).expect("import runs");

        let skus: Vec<_> = report
            .imported
            .iter()
            .map(|record| record.data.sku.as_str())
            .collect();
        assert_eq!(skus, ["HV-1", "HV-3"]);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].line, 3);
        assert_eq!(service.filter(&Default::default()).expect("filter").total_elements, 2);
    }

    #[test]
    fn missing_required_column_aborts() {
        let csv = "SKU,Name\nHV-1,Harvester\n";
        let service = service();
        match import_products(&service, RecordId::new(), Cursor::new(csv)) {
            Err(ImportError::MissingColumn(column)) => assert_eq!(column, "price"),
            other => panic!("expected missing column, got {other:?}"),
        }
    }
}
