use carchain_types::{BlockHash, PrevHash, SubjectId, TelemetryRecord, Timestamp};

/// Domain tag for block digests.
pub const BLOCK_DOMAIN: &str = "carchain-block-v1";

/// Domain-separated BLAKE3 hasher over a canonical field encoding.
///
/// Fields are fed in a fixed order. Strings are prefixed with their byte
/// length so adjacent fields cannot be re-split into a colliding input.
/// Numbers are little-endian, floats by their IEEE-754 bit pattern.
pub struct FieldHasher {
    inner: blake3::Hasher,
}

impl FieldHasher {
    /// Start a hash with the given domain tag.
    pub fn new(domain: &str) -> Self {
        let mut inner = blake3::Hasher::new();
        inner.update(domain.as_bytes());
        inner.update(b":");
        Self { inner }
    }

    /// Hasher for block digests.
    pub fn block() -> Self {
        Self::new(BLOCK_DOMAIN)
    }

    pub fn tag(&mut self, tag: u8) -> &mut Self {
        self.inner.update(&[tag]);
        self
    }

    pub fn u64(&mut self, value: u64) -> &mut Self {
        self.inner.update(&value.to_le_bytes());
        self
    }

    pub fn f64(&mut self, value: f64) -> &mut Self {
        self.inner.update(&value.to_bits().to_le_bytes());
        self
    }

    pub fn bool(&mut self, value: bool) -> &mut Self {
        self.inner.update(&[u8::from(value)]);
        self
    }

    pub fn str(&mut self, value: &str) -> &mut Self {
        self.u64(value.len() as u64);
        self.inner.update(value.as_bytes());
        self
    }

    /// Feed a value's canonical fields.
    pub fn fields(&mut self, value: &impl CanonicalFields) -> &mut Self {
        value.hash_fields(self);
        self
    }

    pub fn finalize(&self) -> BlockHash {
        BlockHash::from_hash(*self.inner.finalize().as_bytes())
    }

    /// Hash a single value under the given domain.
    pub fn digest(domain: &str, value: &impl CanonicalFields) -> BlockHash {
        let mut hasher = Self::new(domain);
        hasher.fields(value);
        hasher.finalize()
    }
}

/// A value with a fixed, order-stable byte encoding for digests.
pub trait CanonicalFields {
    fn hash_fields(&self, hasher: &mut FieldHasher);
}

impl CanonicalFields for SubjectId {
    fn hash_fields(&self, hasher: &mut FieldHasher) {
        hasher.str(self.as_str());
    }
}

impl CanonicalFields for Timestamp {
    fn hash_fields(&self, hasher: &mut FieldHasher) {
        hasher.str(&self.to_canonical());
    }
}

impl CanonicalFields for PrevHash {
    fn hash_fields(&self, hasher: &mut FieldHasher) {
        hasher.str(&self.to_canonical());
    }
}

impl CanonicalFields for TelemetryRecord {
    fn hash_fields(&self, hasher: &mut FieldHasher) {
        hasher
            .f64(self.pressure)
            .f64(self.temperature)
            .bool(self.engine_on)
            .f64(self.battery_status)
            .f64(self.oil_level)
            .f64(self.brakes_wear)
            .f64(self.fuel_level)
            .f64(self.mileage)
            .bool(self.fault);
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn record() -> TelemetryRecord {
        TelemetryRecord {
            pressure: 2.2,
            temperature: 85.0,
            engine_on: true,
            battery_status: 90.0,
            oil_level: 0.7,
            brakes_wear: 10.0,
            fuel_level: 30.0,
            mileage: 5_000.0,
            fault: false,
        }
    }

    #[test]
    fn digest_is_deterministic() {
        let a = FieldHasher::digest(BLOCK_DOMAIN, &record());
        let b = FieldHasher::digest(BLOCK_DOMAIN, &record());
        assert_eq!(a, b);
    }

    #[test]
    fn different_domains_produce_different_hashes() {
        let a = FieldHasher::digest(BLOCK_DOMAIN, &record());
        let b = FieldHasher::digest("other-v1", &record());
        assert_ne!(a, b);
    }

    #[test]
    fn length_prefix_prevents_resplitting() {
        let mut a = FieldHasher::block();
        a.str("ab").str("c");
        let mut b = FieldHasher::block();
        b.str("a").str("bc");
        assert_ne!(a.finalize(), b.finalize());
    }

    #[test]
    fn flag_change_changes_digest() {
        let mut faulty = record();
        faulty.fault = true;
        assert_ne!(
            FieldHasher::digest(BLOCK_DOMAIN, &record()),
            FieldHasher::digest(BLOCK_DOMAIN, &faulty)
        );
    }

    #[test]
    fn genesis_sentinel_differs_from_block_link() {
        let genesis = FieldHasher::digest(BLOCK_DOMAIN, &PrevHash::Genesis);
        let zero = PrevHash::Block(BlockHash::from_hash([0; 32]));
        let linked = FieldHasher::digest(BLOCK_DOMAIN, &zero);
        assert_ne!(genesis, linked);
    }

    proptest! {
        #[test]
        fn any_numeric_change_changes_digest(a in -1e6f64..1e6, b in -1e6f64..1e6) {
            prop_assume!(a.to_bits() != b.to_bits());
            let left = TelemetryRecord { mileage: a, ..record() };
            let right = TelemetryRecord { mileage: b, ..record() };
            prop_assert_ne!(
                FieldHasher::digest(BLOCK_DOMAIN, &left),
                FieldHasher::digest(BLOCK_DOMAIN, &right)
            );
        }
    }
}
