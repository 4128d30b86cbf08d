//! # Relay Codec Integration Tests
//!
//! Exercises the public codec API the way the relay sessions use it:
//! - encode → decode → validate for arbitrary well-formed reports
//! - single-bit corruption of the checksummed body is always rejected
//! - golden report and ack vectors
//! - stream reads over scripted byte sources

use codec::{
    classify, decode_inbox, decode_outbox, encode_inbox, encode_outbox, read_inbox,
    render_field_lines, validate_inbox, InboxError, InboxRead, ProtocolError, ReportBuilder,
};
use proptest::prelude::*;
use types::{Field, InboxMessage, OutboxMessage, ReportedStatus, SourceStatus};

const GOLDEN_REPORT: [u8; 26] = [
    0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x01, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

fn status_strategy() -> impl Strategy<Value = SourceStatus> {
    prop_oneof![
        Just(SourceStatus::Idle),
        Just(SourceStatus::Active),
        Just(SourceStatus::Recharge),
    ]
}

fn report_strategy() -> impl Strategy<Value = InboxMessage> {
    (
        any::<u16>(),
        "[A-Za-z0-9_]{0,8}",
        status_strategy(),
        prop::collection::vec(("[a-z0-9]{0,8}", any::<u32>()), 0..16),
    )
        .prop_map(|(number, name, status, fields)| {
            let fields = fields
                .into_iter()
                .map(|(key, value)| Field::new(key, value))
                .collect();
            InboxMessage::report(number, name, status, fields)
        })
}

proptest! {
    #[test]
    fn test_encoded_reports_decode_and_validate(message in report_strategy()) {
        let wire = encode_inbox(&message).unwrap();
        prop_assert_eq!(wire.len(), 13 + 12 * message.fields.len() + 1);

        let frame = decode_inbox(&wire).unwrap();
        prop_assert_eq!(&frame.message, &message);
        prop_assert_eq!(validate_inbox(&frame), Ok(()));
    }

    #[test]
    fn test_bit_flip_in_body_is_rejected(
        message in report_strategy(),
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let mut wire = encode_inbox(&message).unwrap().to_vec();
        let body_len = wire.len() - 1;
        let index = position.index(body_len);
        wire[index] ^= 1 << bit;

        // A flip may break parsing (count or text byte) or fail validation,
        // but it is never accepted
        prop_assert!(classify(decode_inbox(&wire)).is_err());
    }
}

#[test]
fn test_golden_report_accepted() {
    let verdict = classify(decode_inbox(&GOLDEN_REPORT)).unwrap();

    assert_eq!(verdict.message.message_number, 1);
    assert_eq!(verdict.message.source_name, "");
    assert_eq!(verdict.message.status(), Some(SourceStatus::Idle));
    assert_eq!(verdict.message.fields, vec![Field::new("", 0)]);
}

#[test]
fn test_golden_acks() {
    assert_eq!(
        &encode_outbox(&OutboxMessage::success(29))[..],
        &[0x11, 0x00, 0x1d, 0x0c]
    );
    assert_eq!(
        &encode_outbox(&OutboxMessage::fail())[..],
        &[0x12, 0x00, 0x00, 0x12]
    );
    assert_eq!(
        decode_outbox(&[0x12, 0x00, 0x00, 0x12]).unwrap(),
        OutboxMessage::fail()
    );
}

#[test]
fn test_short_input_is_broken() {
    let verdict = classify(decode_inbox(&GOLDEN_REPORT[..5]));
    assert!(matches!(
        verdict,
        Err(InboxError::BrokenMessage(ProtocolError::MessageTooSmall { got: 5, .. }))
    ));
}

#[test]
fn test_status_domain() {
    for code in 0u8..=255 {
        let mut wire = GOLDEN_REPORT;
        wire[11] = code;
        wire[25] = code ^ 0x01;
        let verdict = classify(decode_inbox(&wire));

        match code {
            1..=3 => assert!(verdict.is_ok(), "code {code} should be accepted"),
            _ => assert_eq!(verdict.unwrap_err(), InboxError::WrongStatus(code)),
        }
    }
}

#[test]
fn test_unknown_status_survives_decode() {
    let mut wire = GOLDEN_REPORT;
    wire[11] = 0x04;
    let frame = decode_inbox(&wire).unwrap();
    assert_eq!(frame.message.source_status, ReportedStatus::Unknown(0x04));
}

#[tokio::test]
async fn test_back_to_back_reports_on_one_stream() {
    let first = ReportBuilder::new("ALPHA", SourceStatus::Active)
        .message_number(1)
        .field("temp", 21)
        .build()
        .unwrap();
    let second = ReportBuilder::new("BETA", SourceStatus::Recharge)
        .message_number(2)
        .build()
        .unwrap();

    let mut stream = tokio_test::io::Builder::new()
        .read(&first[..7])
        .read(&first[7..])
        .read(&second)
        .build();

    let InboxRead::Frame(frame) = read_inbox(&mut stream).await.unwrap() else {
        panic!("expected first frame");
    };
    assert_eq!(frame.message.source_name, "ALPHA");
    let lines = render_field_lines(&frame.message);
    assert_eq!(&lines[0][..], b"[ALPHA] temp | 21\r\n");

    let InboxRead::Frame(frame) = read_inbox(&mut stream).await.unwrap() else {
        panic!("expected second frame");
    };
    assert_eq!(frame.message.source_name, "BETA");
    assert!(frame.message.fields.is_empty());

    assert!(matches!(
        read_inbox(&mut stream).await.unwrap(),
        InboxRead::Closed
    ));
}
