use proptest::prelude::*;
use tlock_age::Error;
use tlock_age::armor::{ARMOR_FOOTER, ARMOR_HEADER, ArmorConfig, decode, encode, is_armored};

fn cfg() -> ArmorConfig {
    ArmorConfig::default()
}

proptest! {
    #[test]
    fn decode_inverts_encode(payload in proptest::collection::vec(any::<u8>(), 0..600), width in 1usize..100) {
        let cfg = ArmorConfig { wrap_width: width };
        let armored = encode(&payload, &cfg).unwrap();
        prop_assert!(armored.starts_with(ARMOR_HEADER));
        let footer_line = format!("{ARMOR_FOOTER}\n");
        prop_assert!(armored.ends_with(&footer_line));
        prop_assert_eq!(decode(&armored, &cfg).unwrap(), payload);
    }
}

#[test]
fn full_last_line_gets_a_blank_line() {
    // 48 bytes is exactly one 64 column line.
    let armored = encode(&[0u8; 48], &cfg()).unwrap();
    let lines: Vec<&str> = armored.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1].len(), 64);
    assert_eq!(lines[2], "");
    assert_eq!(decode(&armored, &cfg()).unwrap(), vec![0u8; 48]);

    let without_blank = armored.replacen("\n\n", "\n", 1);
    assert!(matches!(decode(&without_blank, &cfg()), Err(Error::InvalidEncoding(_))));
}

#[test]
fn empty_payload() {
    let armored = encode(b"", &cfg()).unwrap();
    assert_eq!(armored, format!("{ARMOR_HEADER}\n\n{ARMOR_FOOTER}\n"));
    assert_eq!(decode(&armored, &cfg()).unwrap(), b"");
}

#[test]
fn surrounding_whitespace_is_tolerated_up_to_a_limit() {
    let armored = encode(b"hello", &cfg()).unwrap();
    let padded = format!("  \n\t{armored}{}", " ".repeat(1000));
    assert_eq!(decode(&padded, &cfg()).unwrap(), b"hello");

    let too_much = format!("{armored}{}", " ".repeat(1100));
    assert!(matches!(decode(&too_much, &cfg()), Err(Error::InvalidEncoding(_))));
}

#[test]
fn missing_markers_are_rejected() {
    let armored = encode(b"hello", &cfg()).unwrap();
    let no_header = armored.replace(ARMOR_HEADER, "-----BEGIN PGP MESSAGE-----");
    let no_footer = armored.replace(ARMOR_FOOTER, "");
    let glued = armored.replace(&format!("{ARMOR_HEADER}\n"), ARMOR_HEADER);
    for bad in [no_header, no_footer, glued] {
        assert!(matches!(decode(&bad, &cfg()), Err(Error::InvalidEncoding(_))), "{bad:?}");
    }
}

#[test]
fn overlong_lines_are_rejected() {
    let armored = encode(&[1u8; 100], &cfg()).unwrap();
    let lines: Vec<&str> = armored.lines().collect();
    let merged = format!("{}{}", lines[1], lines[2]);
    let joined = [lines[0], merged.as_str(), lines[3], lines[4]].join("\n");
    assert!(matches!(decode(&joined, &cfg()), Err(Error::InvalidEncoding(_))));

    // Valid under a wider configuration only.
    let wide = encode(&[1u8; 100], &ArmorConfig { wrap_width: 200 }).unwrap();
    assert!(decode(&wide, &cfg()).is_err());
    assert_eq!(decode(&wide, &ArmorConfig { wrap_width: 200 }).unwrap(), vec![1u8; 100]);
}

#[test]
fn non_canonical_base64_is_rejected() {
    let body = "aGVsbG9=";
    let armored = format!("{ARMOR_HEADER}\n{body}\n{ARMOR_FOOTER}\n");
    assert!(matches!(decode(&armored, &cfg()), Err(Error::InvalidEncoding(_))));

    let unpadded = format!("{ARMOR_HEADER}\naGVsbG8\n{ARMOR_FOOTER}\n");
    assert!(matches!(decode(&unpadded, &cfg()), Err(Error::InvalidEncoding(_))));
}

#[test]
fn zero_width_is_rejected() {
    let zero = ArmorConfig { wrap_width: 0 };
    assert!(matches!(encode(b"x", &zero), Err(Error::InvalidParams(_))));
    assert!(matches!(decode("", &zero), Err(Error::InvalidParams(_))));
}

#[test]
fn detects_armor() {
    let armored = encode(b"x", &cfg()).unwrap();
    assert!(is_armored(armored.as_bytes()));
    assert!(is_armored(format!("\n  {armored}").as_bytes()));
    assert!(!is_armored(b"age-encryption.org/v1\n"));
}
