use serde::Deserialize;

/// `include` value selecting the requisition bundle of an order.
pub const INCLUDE_REQUISITION: &str = "requisition";
/// `include` value selecting everything, results included.
pub const INCLUDE_EVERYTHING: &str = "everything";

/// Parameters for listing orders (`GET /customers`).
///
/// Dates are passed through verbatim; the remote API is the one that rejects
/// malformed values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OrderListQuery {
    pub status: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: u32,
    pub per_page: u32,
}

impl Default for OrderListQuery {
    fn default() -> Self {
        Self {
            status: "all".to_owned(),
            start_date: None,
            end_date: None,
            page: 0,
            per_page: 10,
        }
    }
}

impl OrderListQuery {
    #[must_use]
    pub fn between(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            start_date: Some(start_date.into()),
            end_date: Some(end_date.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    #[must_use]
    pub fn with_page(mut self, page: u32, per_page: u32) -> Self {
        self.page = page;
        self.per_page = per_page;
        self
    }

    /// Query pairs in wire order. Absent dates are left out.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("status", self.status.clone())];
        if let Some(start) = &self.start_date {
            pairs.push(("start_date", start.clone()));
        }
        if let Some(end) = &self.end_date {
            pairs.push(("end_date", end.clone()));
        }
        pairs.push(("page", self.page.to_string()));
        pairs.push(("per_page", self.per_page.to_string()));
        pairs
    }
}
