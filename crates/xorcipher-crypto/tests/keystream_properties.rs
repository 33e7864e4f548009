//! Property-based tests for keystream generation
//!
//! Every PRNG variant must produce the same logical keystream regardless of
//! buffer length, buffer alignment, or how the buffer is split across calls.

use proptest::prelude::*;
use xorcipher_crypto::{Iv, KeystreamEngine, Sfc32, SplitMix32, Xoshiro128};

#[derive(Debug, Clone, Copy)]
enum Kind {
    Sfc32,
    SplitMix32,
    Xoshiro128,
}

fn engine(kind: Kind, key: &[u8], iv: &Iv) -> Box<dyn KeystreamEngine> {
    match kind {
        Kind::Sfc32 => Box::new(Sfc32::new(key, iv)),
        Kind::SplitMix32 => Box::new(SplitMix32::new(key, iv)),
        Kind::Xoshiro128 => Box::new(Xoshiro128::new(key, iv)),
    }
}

fn arbitrary_kind() -> impl Strategy<Value = Kind> {
    prop_oneof![Just(Kind::Sfc32), Just(Kind::SplitMix32), Just(Kind::Xoshiro128)]
}

fn arbitrary_iv() -> impl Strategy<Value = Iv> {
    any::<[u8; 16]>().prop_map(Iv::new)
}

#[test]
fn known_ciphertexts() {
    let key = [0x01u8; 16];
    let iv = Iv::new([0x02; 16]);
    let cases = [
        (Kind::Sfc32, "4a26a4375d676e7605aaa30bfb65941e1537385875"),
        (Kind::SplitMix32, "47cafa8a2ca85703fffc792db103ec4d4122ca61ec"),
        (Kind::Xoshiro128, "f92a4d076f9aae4e12f785ea88cbe2a4ae1e708fe7"),
    ];
    for (kind, expected) in cases {
        let mut buf = b"The quick brown fox!!".to_vec();
        engine(kind, &key, &iv).process(&mut buf);
        assert_eq!(hex::encode(&buf), expected, "{kind:?}");
    }
}

#[test]
fn prop_words_equal_processed_zeros() {
    proptest!(|(
        kind in arbitrary_kind(),
        key in prop::collection::vec(any::<u8>(), 0..64),
        iv in arbitrary_iv(),
        words in 0usize..64,
    )| {
        let mut by_word = engine(kind, &key, &iv);
        let expected: Vec<u8> =
            (0..words).flat_map(|_| by_word.next_word().to_le_bytes()).collect();

        let mut buf = vec![0u8; words * 4];
        engine(kind, &key, &iv).process(&mut buf);

        // PROPERTY: N words packed LE == process() over 4N zero bytes
        prop_assert_eq!(buf, expected);
    });
}

#[test]
fn prop_tail_matches_next_word() {
    proptest!(|(kind in arbitrary_kind(), iv in arbitrary_iv(), len in 0usize..200)| {
        let mut reference = engine(kind, b"tail", &iv);
        let mut expected = Vec::with_capacity(len + 3);
        while expected.len() < len {
            expected.extend_from_slice(&reference.next_word().to_le_bytes());
        }
        expected.truncate(len);

        let mut buf = vec![0u8; len];
        engine(kind, b"tail", &iv).process(&mut buf);

        // PROPERTY: exactly `len` bytes touched, tail is LE of the next word
        prop_assert_eq!(buf, expected);
    });
}

#[test]
fn prop_alignment_does_not_change_keystream() {
    proptest!(|(
        kind in arbitrary_kind(),
        iv in arbitrary_iv(),
        data in prop::collection::vec(any::<u8>(), 0..300),
        offset in 0usize..4,
    )| {
        let mut aligned = data.clone();
        engine(kind, b"align", &iv).process(&mut aligned);

        let mut backing = vec![0u8; offset];
        backing.extend_from_slice(&data);
        engine(kind, b"align", &iv).process(&mut backing[offset..]);

        // PROPERTY: fast and slow lane paths produce the same bytes
        prop_assert_eq!(&backing[offset..], aligned.as_slice());
    });
}

#[test]
fn prop_lane_aligned_splits_are_transparent() {
    proptest!(|(
        kind in arbitrary_kind(),
        iv in arbitrary_iv(),
        data in prop::collection::vec(any::<u8>(), 0..300),
        split_words in 0usize..80,
    )| {
        let mut whole = data.clone();
        engine(kind, b"split", &iv).process(&mut whole);

        let split = (split_words * 4).min(data.len() & !3);
        let mut parts = data.clone();
        let mut live = engine(kind, b"split", &iv);
        let (head, rest) = parts.split_at_mut(split);
        live.process(head);
        live.process(rest);

        // PROPERTY: splitting at word boundaries never changes output
        prop_assert_eq!(parts, whole);
    });
}

#[test]
fn prop_distinct_ivs_give_distinct_keystreams() {
    proptest!(|(kind in arbitrary_kind(), a in arbitrary_iv(), b in arbitrary_iv())| {
        prop_assume!(a != b);
        let mut first = [0u8; 32];
        let mut second = [0u8; 32];
        engine(kind, b"key", &a).fill(&mut first);
        engine(kind, b"key", &b).fill(&mut second);
        prop_assert_ne!(first, second);
    });
}
