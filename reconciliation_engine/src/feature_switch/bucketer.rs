use chrono::Utc;

/// Map a sticky identity and a switch name to a rollout bucket in `[0, 100)`.
///
/// The identity is salted with the switch name so one browser lands in different buckets for
/// different switches, then hashed with IEEE CRC-32 over the UTF-8 bytes. The checksum is
/// deterministic across processes and time, which is what makes a percentage rollout sticky:
/// the same identity always gets the same answer for a given switch.
pub fn rollout_bucket(identity: &str, switch_name: &str) -> u8 {
    let salted = format!("{identity}-{switch_name}");
    (crc32fast::hash(salted.as_bytes()) % 100) as u8
}

/// Synthesize a fresh rollout identity. Uniqueness matters less than stickiness; the caller is
/// expected to persist the token through its identity store and reuse it.
pub fn generate_identity() -> String {
    let micros = Utc::now().timestamp_micros();
    format!("BFS{micros:x}{:04x}", rand::random::<u16>())
}
