use super::{Client, ProofId};
use anyhow::Result;
use reqwest::Method;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, instrument};

/// Row shape of the `users` table
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub email: String,
    /// PHC-format password hash
    pub password: String,
    #[serde(default, deserialize_with = "nullable_proofs")]
    pub proofs_completed: Vec<ProofId>,
}

// older rows carry a NULL instead of an empty array
fn nullable_proofs<'de, D>(deserializer: D) -> Result<Vec<ProofId>, D::Error>
where
    D: Deserializer<'de>,
{
    let proofs = Option::<Vec<ProofId>>::deserialize(deserializer)?;

    Ok(proofs.unwrap_or_default())
}

#[derive(Debug, Serialize)]
struct NewUser<'a> {
    email: &'a str,
    password: &'a str,
    proofs_completed: &'a [ProofId],
}

#[derive(Debug, Serialize)]
struct ProofsPatch<'a> {
    proofs_completed: &'a [ProofId],
}

impl Client {
    /// Case-sensitive equality lookup on email
    #[instrument(skip(self))]
    pub async fn find_user(&self, email: &str) -> Result<Option<UserRecord>> {
        let filter = format!("eq.{email}");
        let response = self
            .request(Method::GET, "users")
            .query(&[("select", "*"), ("email", filter.as_str())])
            .send()
            .await?;

        let mut rows: Vec<UserRecord> = self.check(response, "users").await?.json().await?;

        debug!("{} matching users", rows.len());

        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.remove(0)))
        }
    }

    /// Insert a new user with an empty completed-proof set
    #[instrument(skip(self, password_hash))]
    pub async fn insert_user(&self, email: &str, password_hash: &str) -> Result<()> {
        let response = self
            .request(Method::POST, "users")
            .json(&NewUser {
                email,
                password: password_hash,
                proofs_completed: &[],
            })
            .send()
            .await?;

        self.check(response, "users").await?;

        Ok(())
    }

    /// Full replace of the stored completed-proof set
    #[instrument(skip(self))]
    pub async fn update_proofs(&self, email: &str, proofs: &[ProofId]) -> Result<()> {
        let filter = format!("eq.{email}");
        let response = self
            .request(Method::PATCH, "users")
            .query(&[("email", filter.as_str())])
            .json(&ProofsPatch {
                proofs_completed: proofs,
            })
            .send()
            .await?;

        self.check(response, "users").await?;

        Ok(())
    }
}
