use serde::{Deserialize, Serialize};

use carchain_crypto::{CanonicalFields, ChainLinked, FieldHasher};
use carchain_types::{BlockHash, PrevHash, SubjectId, TelemetryRecord, Timestamp};

/// Marker message carried by every genesis block.
pub const GENESIS_MESSAGE: &str = "Genesis Block";

const GENESIS_TAG: u8 = 0;
const TELEMETRY_TAG: u8 = 1;

/// What a block records.
///
/// Serialized untagged, so a genesis payload is `{"message": ...}` and a
/// telemetry payload is `{"car_id": ..., "data": {...}, "recorded_at": ...}`.
/// Keys outside those shapes are rejected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged, deny_unknown_fields)]
pub enum BlockPayload {
    Telemetry {
        car_id: SubjectId,
        data: TelemetryRecord,
        recorded_at: Timestamp,
    },
    Genesis {
        message: String,
    },
}

impl BlockPayload {
    pub fn genesis() -> Self {
        Self::Genesis {
            message: GENESIS_MESSAGE.into(),
        }
    }

    pub fn telemetry(car_id: SubjectId, data: TelemetryRecord, recorded_at: Timestamp) -> Self {
        Self::Telemetry {
            car_id,
            data,
            recorded_at,
        }
    }

    pub fn is_genesis(&self) -> bool {
        matches!(self, Self::Genesis { .. })
    }

    /// The vehicle this payload belongs to; `None` for genesis.
    pub fn subject(&self) -> Option<&SubjectId> {
        match self {
            Self::Telemetry { car_id, .. } => Some(car_id),
            Self::Genesis { .. } => None,
        }
    }

    pub fn record(&self) -> Option<&TelemetryRecord> {
        match self {
            Self::Telemetry { data, .. } => Some(data),
            Self::Genesis { .. } => None,
        }
    }
}

impl CanonicalFields for BlockPayload {
    fn hash_fields(&self, hasher: &mut FieldHasher) {
        match self {
            Self::Genesis { message } => {
                hasher.tag(GENESIS_TAG).str(message);
            }
            Self::Telemetry {
                car_id,
                data,
                recorded_at,
            } => {
                hasher
                    .tag(TELEMETRY_TAG)
                    .fields(car_id)
                    .fields(data)
                    .fields(recorded_at);
            }
        }
    }
}

/// One immutable, hash-linked entry in the ledger.
///
/// The hash is computed once in [`Block::new`]. Deserialization keeps the
/// stored hash as-is; use [`Block::is_self_consistent`] or the chain
/// validator to check it. Deserialization is strict: unknown keys and
/// non-canonical field text are errors, so every accepted record writes back
/// byte-for-byte.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Block {
    index: u64,
    timestamp: Timestamp,
    payload: BlockPayload,
    previous_hash: PrevHash,
    hash: BlockHash,
}

impl Block {
    pub fn new(
        index: u64,
        timestamp: Timestamp,
        payload: BlockPayload,
        previous_hash: PrevHash,
    ) -> Self {
        let hash = digest(index, &timestamp, &payload, &previous_hash);
        Self {
            index,
            timestamp,
            payload,
            previous_hash,
            hash,
        }
    }

    /// The index-0 root block.
    pub fn genesis(timestamp: Timestamp) -> Self {
        Self::new(0, timestamp, BlockPayload::genesis(), PrevHash::Genesis)
    }

    /// Recompute the digest of this block's fields, ignoring the stored hash.
    pub fn compute_digest(&self) -> BlockHash {
        digest(self.index, &self.timestamp, &self.payload, &self.previous_hash)
    }

    /// Returns `true` if the stored hash matches the recomputed digest.
    pub fn is_self_consistent(&self) -> bool {
        self.compute_digest() == self.hash
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn payload(&self) -> &BlockPayload {
        &self.payload
    }

    pub fn previous_hash(&self) -> PrevHash {
        self.previous_hash
    }

    pub fn hash(&self) -> BlockHash {
        self.hash
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }
}

fn digest(
    index: u64,
    timestamp: &Timestamp,
    payload: &BlockPayload,
    previous_hash: &PrevHash,
) -> BlockHash {
    let mut hasher = FieldHasher::block();
    hasher
        .u64(index)
        .fields(timestamp)
        .fields(payload)
        .fields(previous_hash);
    hasher.finalize()
}

impl ChainLinked for Block {
    fn index(&self) -> u64 {
        self.index
    }

    fn stored_hash(&self) -> BlockHash {
        self.hash
    }

    fn prev_hash(&self) -> PrevHash {
        self.previous_hash
    }

    fn computed_hash(&self) -> BlockHash {
        self.compute_digest()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::Value;

    use super::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn record() -> TelemetryRecord {
        TelemetryRecord {
            pressure: 2.3,
            temperature: 88.0,
            engine_on: true,
            battery_status: 95.0,
            oil_level: 0.9,
            brakes_wear: 4.0,
            fuel_level: 61.5,
            mileage: 42_000.0,
            fault: false,
        }
    }

    fn telemetry_block(index: u64, prev: PrevHash) -> Block {
        let at = ts("2024-03-01T10:00:00Z");
        let payload = BlockPayload::telemetry(SubjectId::new("CAR-1").unwrap(), record(), at);
        Block::new(index, at, payload, prev)
    }

    #[test]
    fn genesis_shape() {
        let genesis = Block::genesis(ts("2024-01-01T00:00:00Z"));
        assert_eq!(genesis.index(), 0);
        assert!(genesis.previous_hash().is_genesis());
        assert!(genesis.payload().is_genesis());
        assert!(genesis.is_self_consistent());
    }

    #[test]
    fn construction_computes_hash() {
        let genesis = Block::genesis(ts("2024-01-01T00:00:00Z"));
        let block = telemetry_block(1, PrevHash::Block(genesis.hash()));
        assert_eq!(block.hash(), block.compute_digest());
    }

    #[test]
    fn digest_is_deterministic() {
        let a = telemetry_block(1, PrevHash::Genesis);
        let b = telemetry_block(1, PrevHash::Genesis);
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn each_field_affects_digest() {
        let base = telemetry_block(1, PrevHash::Block(BlockHash::from_hash([1; 32])));

        let other_index = Block::new(
            2,
            base.timestamp(),
            base.payload().clone(),
            base.previous_hash(),
        );
        let other_time = Block::new(
            1,
            ts("2024-03-01T10:00:00.000001Z"),
            base.payload().clone(),
            base.previous_hash(),
        );
        let other_payload = Block::new(
            1,
            base.timestamp(),
            BlockPayload::genesis(),
            base.previous_hash(),
        );
        let other_prev = Block::new(
            1,
            base.timestamp(),
            base.payload().clone(),
            PrevHash::Block(BlockHash::from_hash([2; 32])),
        );

        for other in [other_index, other_time, other_payload, other_prev] {
            assert_ne!(other.hash(), base.hash());
        }
    }

    #[test]
    fn json_has_exactly_five_fields() {
        let block = telemetry_block(1, PrevHash::Genesis);
        let value = serde_json::to_value(&block).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, ["hash", "index", "payload", "previous_hash", "timestamp"]);
        assert_eq!(value["payload"]["car_id"], "CAR-1");
        assert_eq!(value["payload"]["data"]["engineOn"], true);
    }

    #[test]
    fn genesis_payload_json() {
        let genesis = Block::genesis(ts("2024-01-01T00:00:00Z"));
        let value = serde_json::to_value(&genesis).unwrap();
        assert_eq!(value["payload"]["message"], GENESIS_MESSAGE);
        assert_eq!(value["previous_hash"], "0");
    }

    #[test]
    fn deserialization_keeps_stored_hash() {
        let block = telemetry_block(1, PrevHash::Genesis);
        let mut value = serde_json::to_value(&block).unwrap();
        value["hash"] = Value::String("ab".repeat(32));
        let parsed: Block = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.hash().to_hex(), "ab".repeat(32));
        assert!(!parsed.is_self_consistent());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let value = serde_json::to_value(telemetry_block(1, PrevHash::Genesis)).unwrap();

        let mut top = value.clone();
        top["note"] = Value::from("edited");
        assert!(serde_json::from_value::<Block>(top).is_err());

        let mut payload = value.clone();
        payload["payload"]["note"] = Value::from("edited");
        assert!(serde_json::from_value::<Block>(payload).is_err());

        let mut data = value;
        data["payload"]["data"]["injected"] = Value::from(1);
        assert!(serde_json::from_value::<Block>(data).is_err());

        let mut genesis = serde_json::to_value(Block::genesis(ts("2024-01-01T00:00:00Z"))).unwrap();
        genesis["payload"]["car_id"] = Value::from("CAR-1");
        assert!(serde_json::from_value::<Block>(genesis).is_err());
    }

    #[test]
    fn non_canonical_text_is_rejected() {
        let value = serde_json::to_value(telemetry_block(1, PrevHash::Genesis)).unwrap();

        let mut long_fraction = value.clone();
        long_fraction["timestamp"] = Value::from("2024-03-01T10:00:00.000000999Z");
        assert!(serde_json::from_value::<Block>(long_fraction).is_err());

        let mut padded = value;
        padded["payload"]["car_id"] = Value::from("  CAR-1  ");
        assert!(serde_json::from_value::<Block>(padded).is_err());
    }

    #[test]
    fn json_roundtrip_preserves_digest() {
        let block = telemetry_block(3, PrevHash::Block(BlockHash::from_hash([9; 32])));
        let json = serde_json::to_string_pretty(&block).unwrap();
        let parsed: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, block);
        assert!(parsed.is_self_consistent());
    }

    #[test]
    fn payload_accessors() {
        let block = telemetry_block(1, PrevHash::Genesis);
        assert_eq!(block.payload().subject().unwrap().as_str(), "CAR-1");
        assert_eq!(block.payload().record(), Some(&record()));
        assert!(BlockPayload::genesis().subject().is_none());
    }

    proptest! {
        #[test]
        fn digest_changes_with_subject(
            a in "[A-Z]{1,8}-[0-9]{1,4}",
            b in "[A-Z]{1,8}-[0-9]{1,4}",
        ) {
            prop_assume!(a != b);
            let at = ts("2024-03-01T10:00:00Z");
            let block_for = |id: String| {
                let payload = BlockPayload::telemetry(SubjectId::new(id).unwrap(), record(), at);
                Block::new(1, at, payload, PrevHash::Genesis)
            };
            prop_assert_ne!(block_for(a).hash(), block_for(b).hash());
        }
    }
}
