use keystretch::hasher::{Pbkdf2Hasher, Pbkdf2Params};
use keystretch::policy::SecurityPolicy;
use keystretch::prf::Prf;
use proptest::arbitrary::any;
use proptest::prop_compose;

prop_compose! {
    /// Hashers cheap enough to drive through full key derivation in property
    /// tests. The policy is disabled so that tiny iteration counts are usable.
    #[allow(unused)]
    pub fn arb_cheap_hasher()(
        prf in any::<Prf>(),
        iterations in 1_u32..=16,
        salt_length_in_bytes in 1_usize..=32,
        hash_length_in_bytes in 1_usize..=32,
    ) -> Pbkdf2Hasher {
        Pbkdf2Hasher::new(Pbkdf2Params {
            prf,
            iterations,
            salt_length_in_bytes,
            hash_length_in_bytes,
            policy: SecurityPolicy::Disabled,
        })
    }
}
