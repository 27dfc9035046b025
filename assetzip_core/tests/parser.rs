use assetzip_core::payload::{decode_payload, PayloadError};
use assetzip_core::record::parse_line;
use assetzip_core::{MalformedReason, RecordParser};

fn reason_of(line: &str) -> MalformedReason {
    parse_line(1, line, 50).unwrap_err().reason
}

#[test]
fn skips_malformed_line_and_keeps_order() {
    let text = "A: 0x1234\nnot a record\nB: 0xabcdef\n";
    let items: Vec<_> = RecordParser::new(text).records().collect();
    assert_eq!(items.len(), 3);

    let good: Vec<(&str, Vec<u8>)> = items
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .map(|r| (r.name, decode_payload(r.payload).unwrap()))
        .collect();
    assert_eq!(
        good,
        vec![("A", vec![0x12, 0x34]), ("B", vec![0xab, 0xcd, 0xef])]
    );

    let bad = items[1].as_ref().unwrap_err();
    assert_eq!(bad.line, 2);
    assert_eq!(bad.excerpt, "not a record");
    assert_eq!(bad.reason, MalformedReason::MissingSeparator);
}

#[test]
fn records_can_be_restarted() {
    let text = "A: 0x00\nB: 0x01\nC: 0x02";
    let parser = RecordParser::new(text);

    let first: Vec<_> = parser.records().map(|r| r.unwrap().name).collect();
    let second: Vec<_> = parser.records().map(|r| r.unwrap().name).collect();
    assert_eq!(first, vec!["A", "B", "C"]);
    assert_eq!(first, second);

    let mut iter = parser.records();
    iter.next();
    let rest: Vec<_> = iter.clone().map(|r| r.unwrap().name).collect();
    assert_eq!(rest, vec!["B", "C"]);
    assert_eq!(iter.count(), 2);
}

#[test]
fn blank_lines_and_crlf_are_ignored() {
    let text = "\r\n  \nA: 0x00\r\n\r\n\tB:0xFF  \r\n\n";
    let records: Vec<_> = RecordParser::new(text)
        .records()
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(records.len(), 2);
    assert_eq!((records[0].name, records[0].line), ("A", 3));
    assert_eq!((records[1].name, records[1].payload, records[1].line), ("B", "0xFF", 5));
}

#[test]
fn duplicate_names_are_all_preserved() {
    let text = "Eyes: 0x01\nEyes: 0x02\n";
    let payloads: Vec<_> = RecordParser::new(text)
        .records()
        .map(|r| r.unwrap().payload)
        .collect();
    assert_eq!(payloads, vec!["0x01", "0x02"]);
}

#[test]
fn payload_shorter_than_a_byte_is_rejected() {
    assert_eq!(reason_of("Head: 0x1"), MalformedReason::Payload(PayloadError::OddLength(1)));
    assert_eq!(reason_of("Head: 0xabc"), MalformedReason::Payload(PayloadError::OddLength(3)));
}

#[test]
fn each_malformation_has_its_own_reason() {
    assert_eq!(reason_of("   : 0x00"), MalformedReason::EmptyName);
    assert_eq!(reason_of("Head 0x00"), MalformedReason::MissingSeparator);
    assert_eq!(reason_of("Head: 1234"), MalformedReason::Payload(PayloadError::MissingPrefix));
    assert_eq!(reason_of("Head: 0x"), MalformedReason::Payload(PayloadError::Empty));
    assert_eq!(
        reason_of("Head: 0x12 34"),
        MalformedReason::Payload(PayloadError::InvalidDigit { ch: ' ', offset: 2 })
    );
}

#[test]
fn long_malformed_lines_are_previewed() {
    let line = format!("garbage {}", "x".repeat(200));
    let err = RecordParser::new(&line)
        .with_preview_len(10)
        .records()
        .next()
        .unwrap()
        .unwrap_err();
    assert_eq!(err.excerpt, "garbage xx...");
}

#[test]
fn record_count_is_not_fixed() {
    let text: String = (0..500).map(|i| format!("T{i}: 0x{:02x}\n", i % 256)).collect();
    assert_eq!(RecordParser::new(&text).records().filter(Result::is_ok).count(), 500);
}
