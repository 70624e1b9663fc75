use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use keyed_archive_transport::{
    guess_encoding, Decoders, InputDecodingError, InputEncoding, TransportEncoding,
};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// explicit modes
// ---------------------------------------------------------------------------

#[test]
fn explicit_modes_matrix() {
    let cases: Vec<(&[u8], InputEncoding, &[u8])> = vec![
        (b"68656c6c6f", InputEncoding::Hex, b"hello"),
        (b"<68656c6c 6f>", InputEncoding::Hex, b"hello"),
        (b"aGVsbG8=", InputEncoding::Base64, b"hello"),
        (b"aGVs\nbG8=\n", InputEncoding::Base64, b"hello"),
        (b"anything at all", InputEncoding::None, b"anything at all"),
        (b"", InputEncoding::Hex, b""),
        (b"", InputEncoding::Base64, b""),
    ];
    for (input, mode, expected) in cases {
        let decoded = guess_encoding(input, mode).unwrap();
        assert_eq!(decoded.data, expected, "mode {mode} input {input:?}");
    }
}

#[test]
fn explicit_mode_only_runs_the_requested_decoder() {
    // Valid base64 but odd hex: explicit hex must fail rather than switch decoders.
    assert!(matches!(
        guess_encoding(b"abc+", InputEncoding::Hex),
        Err(InputDecodingError::InvalidHex(_))
    ));
    assert!(matches!(
        guess_encoding(b"abcde", InputEncoding::Base64),
        Err(InputDecodingError::InvalidBase64(_))
    ));
}

#[test]
fn input_encoding_parses_from_str() {
    assert_eq!("auto".parse::<InputEncoding>().unwrap(), InputEncoding::Auto);
    assert_eq!("HEX".parse::<InputEncoding>().unwrap(), InputEncoding::Hex);
    assert_eq!("base64".parse::<InputEncoding>().unwrap(), InputEncoding::Base64);
    assert_eq!("none".parse::<InputEncoding>().unwrap(), InputEncoding::None);
    assert_eq!(
        "rot13".parse::<InputEncoding>(),
        Err(InputDecodingError::UnknownEncoding("rot13".into()))
    );
}

// ---------------------------------------------------------------------------
// auto detection
// ---------------------------------------------------------------------------

#[test]
fn auto_detection_matrix() {
    let bplist_hex = b"62706c6973743030";
    let bplist_b64 = STANDARD.encode(b"bplist00 and some more bytes");
    let cases: Vec<(Vec<u8>, TransportEncoding)> = vec![
        (bplist_hex.to_vec(), TransportEncoding::Hex),
        (b"<62706c69 73743030>".to_vec(), TransportEncoding::Hex),
        (bplist_b64.into_bytes(), TransportEncoding::Base64),
        (vec![0x62, 0x70, 0xff, 0x00], TransportEncoding::Identity),
        (b"   \n  ".to_vec(), TransportEncoding::Identity),
    ];
    for (input, expected) in cases {
        let decoded = guess_encoding(&input, InputEncoding::Auto).unwrap();
        assert_eq!(decoded.encoding, expected, "input {input:?}");
    }
}

#[test]
fn auto_falls_back_to_identity_when_nothing_decodes() {
    let input = b"!!!";
    let decoded = guess_encoding(input, InputEncoding::Auto).unwrap();
    assert_eq!(decoded.encoding, TransportEncoding::Identity);
    assert_eq!(decoded.data, input.to_vec());
}

#[test]
fn ranking_orders_by_run_length_then_priority() {
    let ranked = Decoders::new().rank(b"0123abcd");
    let ids: Vec<_> = ranked.iter().map(|(id, _, _)| *id).collect();
    assert_eq!(ids, vec!["hex", "base64"]);
    assert_eq!(ranked[0].1.encoded_len, ranked[1].1.encoded_len);
}

// ---------------------------------------------------------------------------
// round trips
// ---------------------------------------------------------------------------

#[test]
fn round_trip_edge_cases() {
    for bytes in [Vec::new(), vec![0u8; 1], vec![0u8; 64], vec![0xffu8; 3]] {
        let hex_text = hex::encode(&bytes);
        assert_eq!(
            guess_encoding(hex_text.as_bytes(), InputEncoding::Hex).unwrap().data,
            bytes
        );
        let b64_text = STANDARD.encode(&bytes);
        assert_eq!(
            guess_encoding(b64_text.as_bytes(), InputEncoding::Base64).unwrap().data,
            bytes
        );
    }
}

proptest! {
    #[test]
    fn hex_round_trip(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let text = hex::encode(&bytes);
        let decoded = guess_encoding(text.as_bytes(), InputEncoding::Hex).unwrap();
        prop_assert_eq!(decoded.data, bytes);
    }

    #[test]
    fn base64_round_trip(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let text = STANDARD.encode(&bytes);
        let decoded = guess_encoding(text.as_bytes(), InputEncoding::Base64).unwrap();
        prop_assert_eq!(decoded.data, bytes);
    }
}
