//! Shared-secret checks: payment confirmation signatures and bearer tokens.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex HMAC-SHA256 over `"{order_reference}|{payment_id}"`.
///
/// This is what the payment gateway sends back alongside a successful
/// payment; the storefront recomputes it to confirm the order.
#[must_use]
pub fn payment_signature(secret: &[u8], order_reference: &str, payment_id: &str) -> String {
    // HMAC accepts keys of any length, so construction cannot fail.
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return String::new();
    };
    mac.update(order_reference.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a payment signature in constant time. Hex case is ignored.
#[must_use]
pub fn verify_payment_signature(
    secret: &[u8],
    order_reference: &str,
    payment_id: &str,
    signature: &str,
) -> bool {
    let expected = payment_signature(secret, order_reference, payment_id);
    !expected.is_empty() && constant_time_compare(&expected, &signature.to_ascii_lowercase())
}

/// Check an `Authorization` header value against `Bearer <secret>`.
#[must_use]
pub fn bearer_matches(header: Option<&str>, secret: &str) -> bool {
    header
        .and_then(|h| h.strip_prefix("Bearer "))
        .is_some_and(|token| constant_time_compare(token.trim(), secret))
}

/// Constant-time string comparison to prevent timing attacks.
#[must_use]
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(constant_time_compare("", ""));
        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hell"));
    }

    #[test]
    fn test_payment_signature_is_deterministic_hex() {
        let a = payment_signature(b"gateway-key", "MS-20261018-ABC123", "pay_42");
        let b = payment_signature(b"gateway-key", "MS-20261018-ABC123", "pay_42");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_verify_payment_signature() {
        let sig = payment_signature(b"gateway-key", "REF-1", "pay_1");
        assert!(verify_payment_signature(b"gateway-key", "REF-1", "pay_1", &sig));
        assert!(verify_payment_signature(
            b"gateway-key",
            "REF-1",
            "pay_1",
            &sig.to_uppercase()
        ));
        assert!(!verify_payment_signature(b"other-key", "REF-1", "pay_1", &sig));
        assert!(!verify_payment_signature(b"gateway-key", "REF-1", "pay_2", &sig));
    }

    #[test]
    fn test_bearer_matches() {
        assert!(bearer_matches(Some("Bearer s3cr3t"), "s3cr3t"));
        assert!(!bearer_matches(Some("Bearer nope"), "s3cr3t"));
        assert!(!bearer_matches(Some("s3cr3t"), "s3cr3t"));
        assert!(!bearer_matches(None, "s3cr3t"));
    }
}
