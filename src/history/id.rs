//! Turn id generation
//!
//! Ids look like `msg_<unix millis>_<seq>_<9 base36 chars>`. The time
//! component keeps ids roughly sortable across sessions, the per-store
//! sequence number separates turns created within the same millisecond, and
//! the random suffix separates stores.

use super::TurnId;
use chrono::Utc;
use rand::Rng;

const ID_PREFIX: &str = "msg";
const SUFFIX_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a candidate id for the current instant
pub(crate) fn generate_turn_id(seq: u64) -> TurnId {
    generate_at(Utc::now().timestamp_millis(), seq, &mut rand::thread_rng())
}

fn generate_at<R: Rng + ?Sized>(millis: i64, seq: u64, rng: &mut R) -> TurnId {
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect();
    TurnId::from(format!("{ID_PREFIX}_{millis}_{seq}_{suffix}"))
}
