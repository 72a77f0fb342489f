//! System prompt construction and fingerprinting.

use sha2::{Digest, Sha256};

/// Base system prompt for the phone assistant.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful phone assistant handling customer \
    inquiries. You can help with appointment scheduling, status updates, and general questions. \
    Be professional, friendly, and concise in your responses as this is a phone conversation. \
    Keep responses brief and to the point.";

/// Build the system prompt for a call.
///
/// Starts from [`DEFAULT_SYSTEM_PROMPT`] (optionally naming the
/// business) and appends caller context when the customer is known.
pub fn build_system_prompt(
    business_name: Option<&str>,
    customer_name: Option<&str>,
    customer_email: Option<&str>,
) -> String {
    let mut prompt = String::from(DEFAULT_SYSTEM_PROMPT);

    if let Some(business) = business_name {
        prompt.push_str(&format!(" You are answering calls for {}.", business));
    }

    if let Some(name) = customer_name {
        prompt.push_str(&format!("\n\nCurrent caller: {}", name));
        if let Some(email) = customer_email {
            prompt.push_str(&format!("\nEmail: {}", email));
        }
    }

    prompt
}

/// Compute a stable SHA-256 fingerprint for a prompt string.
///
/// Logged at startup so prompt changes are visible across deploys.
pub fn hash_prompt(prompt: &str) -> String {
    let digest = Sha256::digest(prompt.as_bytes());
    digest.iter().map(|byte| format!("{:02x}", byte)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_prompt_no_customer() {
        let prompt = build_system_prompt(None, None, None);
        assert_eq!(prompt, DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn test_prompt_with_customer() {
        let prompt = build_system_prompt(None, Some("Alice Smith"), Some("alice@example.com"));
        assert!(prompt.contains("Current caller: Alice Smith"));
        assert!(prompt.contains("Email: alice@example.com"));
    }

    #[test]
    fn test_prompt_with_business() {
        let prompt = build_system_prompt(Some("Cyber Auto"), None, None);
        assert!(prompt.contains("answering calls for Cyber Auto"));
    }

    #[test]
    fn test_hash_prompt_stable() {
        let first = hash_prompt("test prompt");
        let second = hash_prompt("test prompt");
        let different = hash_prompt("another prompt");

        assert_eq!(first, second);
        assert_ne!(first, different);
        assert_eq!(first.len(), 64);
    }
}
