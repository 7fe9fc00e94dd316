use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde_json::Value;

use super::{scalar_text, Direction, Filter, Order, Record, RecordStore, StoreError};

const REST_PREFIX: &str = "rest/v1";

/// Client for a hosted PostgREST-style backend.
pub struct RestStore {
    base_url: String,
    api_key: String,
    http_client: Client,
}

impl RestStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, StoreError> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(StoreError::Unavailable(
                "rest store url is not configured".to_string(),
            ));
        }
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(StoreError::Unavailable(
                "rest store api key is not configured".to_string(),
            ));
        }

        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|error| StoreError::Http {
                status: None,
                message: error.to_string(),
            })?;

        Ok(Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            api_key,
            http_client,
        })
    }

    fn collection_url(&self, collection: &str) -> String {
        collection_url(&self.base_url, collection)
    }

    fn execute(&self, request: RequestBuilder) -> Result<Vec<Record>, StoreError> {
        let response = request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .send()
            .map_err(|error| StoreError::Http {
                status: None,
                message: error.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .unwrap_or_else(|_| "unable to read error response body".to_string());
            return Err(StoreError::Http {
                status: Some(status.as_u16()),
                message,
            });
        }

        let body: Value = response.json().map_err(|error| StoreError::Http {
            status: Some(status.as_u16()),
            message: error.to_string(),
        })?;
        rows_from_body(body)
    }
}

impl RecordStore for RestStore {
    fn select(
        &self,
        collection: &str,
        filters: &[Filter],
        order: Option<&Order>,
    ) -> Result<Vec<Record>, StoreError> {
        let request = self
            .http_client
            .get(self.collection_url(collection))
            .query(&select_query(filters, order));
        self.execute(request)
    }

    fn insert(&self, collection: &str, records: Vec<Record>) -> Result<Vec<Record>, StoreError> {
        let request = self
            .http_client
            .post(self.collection_url(collection))
            .header("Prefer", "return=representation")
            .json(&records);
        self.execute(request)
    }

    fn update(
        &self,
        collection: &str,
        patch: Record,
        filters: &[Filter],
    ) -> Result<Vec<Record>, StoreError> {
        let request = self
            .http_client
            .patch(self.collection_url(collection))
            .query(&filter_query(filters))
            .header("Prefer", "return=representation")
            .json(&patch);
        self.execute(request)
    }
}

fn collection_url(base_url: &str, collection: &str) -> String {
    format!("{base_url}/{REST_PREFIX}/{collection}")
}

fn select_query(filters: &[Filter], order: Option<&Order>) -> Vec<(String, String)> {
    let mut pairs = vec![("select".to_string(), "*".to_string())];
    pairs.extend(filter_query(filters));
    if let Some(order) = order {
        let direction = match order.direction {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        };
        pairs.push(("order".to_string(), format!("{}.{direction}", order.field)));
    }
    pairs
}

fn filter_query(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|filter| match filter {
            Filter::Eq(field, value) => (
                field.clone(),
                format!("eq.{}", scalar_text(value).unwrap_or_else(|| value.to_string())),
            ),
            Filter::IsNull(field) => (field.clone(), "is.null".to_string()),
        })
        .collect()
}

fn rows_from_body(body: Value) -> Result<Vec<Record>, StoreError> {
    match body {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(record) => Ok(record),
                other => Err(StoreError::InvalidRecord(format!(
                    "expected row object, got {other}"
                ))),
            })
            .collect(),
        Value::Object(record) => Ok(vec![record]),
        Value::Null => Ok(Vec::new()),
        other => Err(StoreError::InvalidRecord(format!(
            "unexpected response body: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::{collection_url, rows_from_body, select_query, RestStore};
    use crate::store::{Filter, Order, StoreError};
    use serde_json::json;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn select_query_encodes_filters_and_order() {
        let query = select_query(
            &[
                Filter::eq("project_id", 12),
                Filter::eq("status", "Waiting funds"),
                Filter::is_null("assigned_to"),
            ],
            Some(&Order::desc("created_at")),
        );
        assert_eq!(
            query,
            pairs(&[
                ("select", "*"),
                ("project_id", "eq.12"),
                ("status", "eq.Waiting funds"),
                ("assigned_to", "is.null"),
                ("order", "created_at.desc"),
            ])
        );
    }

    #[test]
    fn select_query_without_filters_selects_everything() {
        assert_eq!(select_query(&[], None), pairs(&[("select", "*")]));
    }

    #[test]
    fn collection_url_appends_rest_prefix() {
        assert_eq!(
            collection_url("https://db.example.com", "task_notes"),
            "https://db.example.com/rest/v1/task_notes"
        );
    }

    #[test]
    fn blank_settings_leave_the_store_unavailable() {
        assert!(matches!(
            RestStore::new("  ", "key"),
            Err(StoreError::Unavailable(message)) if message.contains("url")
        ));
        assert!(matches!(
            RestStore::new("https://db.example.com", ""),
            Err(StoreError::Unavailable(message)) if message.contains("api key")
        ));
        let store = RestStore::new("https://db.example.com/", "key").expect("store should build");
        assert_eq!(
            store.collection_url("projects"),
            "https://db.example.com/rest/v1/projects"
        );
    }

    #[test]
    fn response_bodies_normalize_to_row_lists() {
        let rows = rows_from_body(json!([{"id": 1}, {"id": 2}])).expect("array body");
        assert_eq!(rows.len(), 2);
        let single = rows_from_body(json!({"id": 3})).expect("object body");
        assert_eq!(single.len(), 1);
        assert!(rows_from_body(json!(null)).expect("null body").is_empty());
        assert!(rows_from_body(json!([1])).is_err());
    }
}
