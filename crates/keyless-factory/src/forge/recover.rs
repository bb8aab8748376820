use alloy_primitives::{keccak256, Address, B256, U256};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

/// Recovers the address of the public key that `(r, s)` over `hash` verifies against, selecting
/// the recovery point with the given y-parity.
///
/// Returns `None` if `r` is not the x-coordinate of a curve point, or if `r`/`s` are out of range.
pub fn recover_address(hash: &B256, r: U256, s: U256, y_parity: bool) -> Option<Address> {
    let mut sig_bytes = [0u8; 64];
    sig_bytes[..32].copy_from_slice(&r.to_be_bytes::<32>());
    sig_bytes[32..].copy_from_slice(&s.to_be_bytes::<32>());

    let signature = Signature::from_slice(&sig_bytes).ok()?;
    let recovery_id = RecoveryId::new(y_parity, false);
    let key = VerifyingKey::recover_from_prehash(hash.as_slice(), &signature, recovery_id).ok()?;

    // The uncompressed point is 65 bytes: 0x04 || x || y. The address is the last 20 bytes of
    // keccak256(x || y).
    let point = key.to_encoded_point(false);
    let pubkey_hash = keccak256(&point.as_bytes()[1..]);
    Some(Address::from_slice(&pubkey_hash[12..]))
}

/// Runs `recover` with the preferred y-parity, then with the other one.
///
/// For a given `(r, hash)` both candidate points normally exist. The second attempt covers
/// constants for which the preferred one does not.
pub(crate) fn recover_with_fallback<F>(preferred: bool, mut recover: F) -> Option<(bool, Address)>
where
    F: FnMut(bool) -> Option<Address>,
{
    [preferred, !preferred]
        .into_iter()
        .find_map(|y_parity| recover(y_parity).map(|signer| (y_parity, signer)))
}
