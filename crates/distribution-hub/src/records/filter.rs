use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entity::Record;

/// Equality filters plus paging and sorting for list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterRequest {
    #[serde(default)]
    pub filters: BTreeMap<String, Value>,
    #[serde(default)]
    pub page: usize,
    #[serde(default)]
    pub size: Option<usize>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_direction: SortDirection,
}

impl FilterRequest {
    pub fn matching(field: &str, value: impl Into<Value>) -> Self {
        let mut request = Self::default();
        request.filters.insert(field.to_string(), value.into());
        request
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub page_size: usize,
}

/// Bounds applied to requested page sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_size: usize,
    pub max_size: usize,
}

impl PageLimits {
    pub fn resolve(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_size)
            .clamp(1, self.max_size.max(1))
    }
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_size: 20,
            max_size: 100,
        }
    }
}

/// Applies `request` to `records`. Unknown filter fields match nothing.
pub fn apply<E: Serialize>(
    records: Vec<Record<E>>,
    request: &FilterRequest,
    limits: PageLimits,
) -> Result<Page<Record<E>>, serde_json::Error> {
    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        let json = serde_json::to_value(&record)?;
        let keep = request
            .filters
            .iter()
            .all(|(field, expected)| json.get(field) == Some(expected));
        if keep {
            rows.push((json, record));
        }
    }

    let sort_by = request.sort_by.as_deref().unwrap_or("created_at");
    rows.sort_by(|(left_json, left), (right_json, right)| {
        let ordering = match sort_by {
            "created_at" => left.created_at.cmp(&right.created_at),
            "updated_at" => left.updated_at.cmp(&right.updated_at),
            field => compare_values(left_json.get(field), right_json.get(field)),
        }
        .then(left.id.cmp(&right.id));
        match request.sort_direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    let page_size = limits.resolve(request.size);
    let total_elements = rows.len();
    let total_pages = total_elements.div_ceil(page_size);
    let content = rows
        .into_iter()
        .skip(request.page.saturating_mul(page_size))
        .take(page_size)
        .map(|(_, record)| record)
        .collect();

    Ok(Page {
        content,
        total_elements,
        total_pages,
        current_page: request.page,
        page_size,
    })
}

fn compare_values(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }

    match (left, right) {
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => {
            let a = a.as_f64().unwrap_or_default();
            let b = b.as_f64().unwrap_or_default();
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        _ => rank(left).cmp(&rank(right)),
    }
}
