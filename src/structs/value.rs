use num_bigint::BigUint;

/// A Value is a field element encoded least-significant-byte-first (little-endian). Trailing zeros may be omitted.
///
/// Example: the element `one` on a 32 bits field is encoded `[1, 0, 0, 0]`.
/// The compact form `[1]` is also valid.
pub type Value = Vec<u8>;

/// Decode a little-endian byte encoding into an unsigned big integer.
pub fn value_to_biguint(value: &[u8]) -> BigUint {
    BigUint::from_bytes_le(value)
}

/// Miller-Rabin primality test on an encoded value.
pub fn is_probably_prime(value: &[u8]) -> bool {
    let int = num_bigint_dig::BigUint::from_bytes_le(value);
    num_bigint_dig::prime::probably_prime(&int, 10)
}

#[test]
fn test_is_probably_prime() {
    assert!(is_probably_prime(&[101]));
    assert!(is_probably_prime(&[101, 0, 0, 0]));
    assert!(!is_probably_prime(&[100]));
    assert!(!is_probably_prime(&[1]));
    // 2^61 - 1, a Mersenne prime.
    assert!(is_probably_prime(
        &[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x1f]
    ));
}
