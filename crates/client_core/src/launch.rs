//! Launch parameters carried on the frame URL (`?id=<token>&amount=<decimal>`).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::{form_urlencoded, Url};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchParams {
    pub id: Option<String>,
    pub amount: Option<String>,
}

impl LaunchParams {
    pub fn new(id: Option<String>, amount: Option<String>) -> Self {
        Self {
            id: id.filter(|v| !v.is_empty()),
            amount: amount.filter(|v| !v.is_empty()),
        }
    }

    pub fn from_url(raw: &str) -> Result<Self> {
        let url = Url::parse(raw).with_context(|| format!("invalid launch url '{raw}'"))?;
        Ok(Self::from_query(url.query().unwrap_or_default()))
    }

    /// Unknown keys are ignored; empty values count as absent.
    pub fn from_query(query: &str) -> Self {
        let mut id = None;
        let mut amount = None;
        for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            match key.as_ref() {
                "id" => id = Some(value.into_owned()),
                "amount" => amount = Some(value.into_owned()),
                _ => {}
            }
        }
        Self::new(id, amount)
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.amount.is_none()
    }

    /// Fallback values fill in whatever this set leaves out.
    pub fn or(self, fallback: LaunchParams) -> Self {
        Self {
            id: self.id.or(fallback.id),
            amount: self.amount.or(fallback.amount),
        }
    }
}
