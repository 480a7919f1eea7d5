use byteorder::{BigEndian, ByteOrder};

pub fn id_key(id: u64) -> [u8; 8] {
    let mut key = [0u8; 8];
    BigEndian::write_u64(&mut key, id);
    key
}

pub fn expiration_key(expiration: i64) -> [u8; 4] {
    // Expirations are small positive epoch-second deltas in practice, but
    // the table schema (spec §6) types the column INT32; store the low 32
    // bits big-endian so the key sorts numerically for cursor sweeps.
    let mut key = [0u8; 4];
    BigEndian::write_i32(&mut key, expiration as i32);
    key
}

/// Encodes the `unconfirmed_transaction` row value: 4-byte expiration
/// followed by the raw `transaction_bytes` (spec §6 schema).
pub fn encode_row(expiration: i64, transaction_bytes: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(4 + transaction_bytes.len());
    buf.extend_from_slice(&expiration_key(expiration));
    buf.extend_from_slice(transaction_bytes);
    buf
}

pub fn decode_row(bytes: &[u8]) -> Option<(i64, &[u8])> {
    if bytes.len() < 4 {
        return None;
    }
    let expiration = BigEndian::read_i32(&bytes[0..4]) as i64;
    Some((expiration, &bytes[4..]))
}
