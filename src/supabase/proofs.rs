use super::Client;
use anyhow::Result;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, instrument};

/// Identifier of a proof template in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProofId(pub i64);

impl fmt::Display for ProofId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Row shape of the `proof_templates` table, only the id column is selected
#[derive(Debug, Deserialize)]
struct ProofTemplateRow {
    id: ProofId,
}

/// PostgREST `in.(...)` filter, the one place ids turn into strings
fn in_filter(ids: &[ProofId]) -> String {
    let ids = ids
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");

    format!("in.({ids})")
}

impl Client {
    /// Keep only the submitted ids that exist in the proof catalog
    #[instrument(skip(self))]
    pub async fn existing_proofs(&self, ids: &[ProofId]) -> Result<Vec<ProofId>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let filter = in_filter(ids);
        let response = self
            .request(Method::GET, "proof_templates")
            .query(&[("select", "id"), ("id", filter.as_str())])
            .send()
            .await?;

        let rows: Vec<ProofTemplateRow> =
            self.check(response, "proof_templates").await?.json().await?;

        debug!("{} of {} submitted ids exist", rows.len(), ids.len());

        Ok(rows.into_iter().map(|row| row.id).collect())
    }
}
