use secrecy::SecretString;

/// Shared read-only settings, constructed once at startup
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub supabase_url: String,
    pub supabase_key: SecretString,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(url: String, key: SecretString) -> Self {
        Self {
            supabase_url: url,
            supabase_key: key,
        }
    }
}
