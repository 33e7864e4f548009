//! Fuzz target for incremental Chaskey tagging
//!
//! # Invariants
//!
//! - Any split of the message yields the one-shot tag
//! - `verify` accepts exactly the computed tag

#![no_main]

use libfuzzer_sys::fuzz_target;
use xorcipher_crypto::Chaskey;

fuzz_target!(|input: ([u8; 16], Vec<u8>, Vec<u8>)| {
    let (key, message, splits) = input;
    let mac = Chaskey::new(&key);
    let expected = mac.mac(&message);

    let mut hasher = mac.hasher();
    let mut rest = message.as_slice();
    for &split in &splits {
        let take = usize::from(split).min(rest.len());
        let (head, tail) = rest.split_at(take);
        hasher.update(head);
        rest = tail;
    }
    hasher.update(rest);
    assert_eq!(hasher.finalize(), expected);

    assert!(mac.verify(&message, &expected));
    let mut forged = expected;
    forged[0] ^= 1;
    assert!(!mac.verify(&message, &forged));
});
