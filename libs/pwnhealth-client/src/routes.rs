use http::Method;
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::query::OrderListQuery;

/// One remote API call: its method, path under the base endpoint, and query.
#[derive(Debug, Clone, Copy)]
pub enum Route<'a> {
    CreateOrder,
    ListOrders(&'a OrderListQuery),
    OrderDetails {
        order_id: &'a str,
        include: &'a str,
    },
    RegisteredLabs {
        lab_id: Option<u64>,
    },
    TestTypes {
        lab_id: Option<u64>,
    },
    TestGroups {
        lab_id: u64,
        account_number: &'a str,
        name: &'a str,
    },
    NearestServiceCenter {
        zip: &'a str,
        lab_id: Option<u64>,
        limit: u32,
    },
}

impl Route<'_> {
    pub fn method(&self) -> Method {
        match self {
            Self::CreateOrder => Method::POST,
            _ => Method::GET,
        }
    }

    fn segments(&self) -> Vec<&str> {
        match self {
            Self::CreateOrder | Self::ListOrders(_) => vec!["customers"],
            Self::OrderDetails { order_id, .. } => vec!["customers", *order_id],
            Self::RegisteredLabs { .. } => vec!["registered_labs"],
            Self::TestTypes { .. } => vec!["test_types"],
            Self::TestGroups { .. } => vec!["test_groups"],
            Self::NearestServiceCenter { zip, .. } => vec!["find_psc", *zip],
        }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::CreateOrder => Vec::new(),
            Self::ListOrders(query) => query.to_pairs(),
            Self::OrderDetails { include, .. } => vec![("include", (*include).to_owned())],
            Self::RegisteredLabs { lab_id } | Self::TestTypes { lab_id } => lab_id
                .map(|id| vec![("lab_id", id.to_string())])
                .unwrap_or_default(),
            Self::TestGroups {
                lab_id,
                account_number,
                name,
            } => vec![
                ("lab_id", lab_id.to_string()),
                ("account_number", (*account_number).to_owned()),
                ("name", (*name).to_owned()),
            ],
            Self::NearestServiceCenter { lab_id, limit, .. } => {
                let mut pairs = Vec::with_capacity(2);
                if let Some(id) = lab_id {
                    pairs.push(("lab", id.to_string()));
                }
                pairs.push(("limit", limit.to_string()));
                pairs
            }
        }
    }

    /// Resolve against `base`. Path segments are percent-encoded, and a query
    /// string is only attached when there is at least one parameter.
    pub fn url(&self, base: &Url) -> ClientResult<Url> {
        for segment in self.segments() {
            if segment.trim().is_empty() {
                return Err(ClientError::validation("path identifier must not be empty"));
            }
            // Dot segments are dropped by the URL path normalizer.
            if matches!(segment, "." | "..") {
                return Err(ClientError::validation(format!(
                    "path identifier '{segment}' is not allowed"
                )));
            }
        }

        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::configuration(format!("base URL '{base}' cannot be a base")))?
            .pop_if_empty()
            .extend(self.segments());

        let query = self.query();
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(&query);
        }
        Ok(url)
    }
}
