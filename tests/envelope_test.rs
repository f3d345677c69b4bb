mod common;

use chrono::{TimeZone, Utc};
use common::{crlf, envelope, journal_body, message_with_forward, plain_message};
use journal_envelope::*;

#[test]
fn test_parse_simple_envelope() {
    let raw = envelope(&journal_body(), &[&plain_message()]);
    let message = parse_envelope(&raw).unwrap();
    let metadata = &message.metadata;

    assert_eq!(metadata.sender.as_deref(), Some("alice@example.com"));
    assert_eq!(metadata.subject.as_deref(), Some("Quarterly numbers"));
    assert_eq!(metadata.message_id.as_deref(), Some("abc123@mail"));
    assert_eq!(metadata.to, vec!["bob@example.com"]);
    assert_eq!(metadata.cc, vec!["carol@example.com", "dave@example.com"]);
    assert_eq!(metadata.bcc, vec!["eve@example.com"]);
    assert_eq!(
        metadata.journal_timestamp,
        Utc.with_ymd_and_hms(2025, 1, 2, 8, 30, 0).unwrap()
    );

    assert_eq!(message.parts.len(), 1);
    assert_eq!(message.parts[0].content_type, "text/plain");
    assert_eq!(message.message_hash.len(), CONTENT_HASH_LEN);
    assert!(message.diagnostics.is_empty());
}

#[test]
fn test_parse_envelope_with_forward() {
    let raw = envelope(&journal_body(), &[&message_with_forward()]);
    let message = parse_envelope(&raw).unwrap();

    assert_eq!(message.parts.len(), 3);
    for part in &message.parts {
        assert!(!part.content_hash.is_empty());
        assert_ne!(part.content_hash, message.message_hash);
    }
    assert_eq!(message.parts[2].file_name, "report.pdf");
    assert!(message.find_part(&content_hash(b"%PDF-1.4")).is_some());
}

#[test]
fn test_message_hash_is_stable() {
    let first = parse_envelope(&envelope(&journal_body(), &[&plain_message()])).unwrap();
    let second = parse_envelope(&envelope("Sender: other@x.com\r\n", &[&plain_message()])).unwrap();
    let forwarded = parse_envelope(&envelope(&journal_body(), &[&message_with_forward()])).unwrap();

    assert_eq!(first.message_hash, second.message_hash);
    assert_ne!(first.message_hash, forwarded.message_hash);
}

#[test]
fn test_body_from_first_text_part() {
    let raw = envelope(&journal_body(), &[&message_with_forward()]);
    let message = parse_envelope(&raw).unwrap();

    let body = message.body.unwrap();
    assert!(body.contains("Forwarding this along."));
}

#[test]
fn test_body_extraction_disabled() {
    let raw = envelope(&journal_body(), &[&plain_message()]);
    let options = ParseOptions {
        extract_body: false,
        ..ParseOptions::default()
    };
    let message = parse_envelope_with(&raw, &options).unwrap();

    assert!(message.body.is_none());
    assert_eq!(message.parts.len(), 1);
}

#[test]
fn test_unhandled_headers_reported() {
    let body = "Sender: a@x.com\r\nX-MS-Exchange-Organization: yes\r\n";
    let raw = envelope(body, &[&plain_message()]);
    let message = parse_envelope(&raw).unwrap();

    assert_eq!(
        message.diagnostics,
        vec![Diagnostic::UnhandledMetadataHeader {
            key: "X-MS-Exchange-Organization".into()
        }]
    );
    assert_eq!(message.metadata.sender.as_deref(), Some("a@x.com"));
}

#[test]
fn test_no_wrapped_message() {
    let raw = envelope(&journal_body(), &[]);
    let err = parse_envelope(&raw).unwrap_err();

    assert!(matches!(err, EnvelopeError::UnexpectedAttachmentCount { count: 0 }));
    assert_eq!(err.stage(), Some(Stage::LocateWrappedMessage));
    assert!(err.to_string().contains("got 0"));
}

#[test]
fn test_two_wrapped_messages() {
    let raw = envelope(&journal_body(), &[&plain_message(), &plain_message()]);
    let err = parse_envelope(&raw).unwrap_err();

    assert!(matches!(err, EnvelopeError::UnexpectedAttachmentCount { count: 2 }));
    assert!(err.to_string().contains("got 2"));
}

#[test]
fn test_missing_date_is_fatal() {
    let raw = crlf(&[
        "From: journal@example.com",
        "Subject: Journal report",
        "",
        "Sender: a@x.com",
    ]);
    let err = parse_envelope(raw.as_bytes()).unwrap_err();

    assert!(matches!(
        err,
        EnvelopeError::MalformedOuterMessage {
            stage: Stage::ReadTimestamp,
            ..
        }
    ));
}

#[test]
fn test_unparsable_date_is_fatal() {
    let raw = crlf(&[
        "From: journal@example.com",
        "Date: sometime last week",
        "",
        "Sender: a@x.com",
    ]);
    let err = parse_envelope(raw.as_bytes()).unwrap_err();

    assert_eq!(err.stage(), Some(Stage::ReadTimestamp));
    assert!(err.to_string().contains("sometime last week"));
}

#[test]
fn test_free_text_input_is_fatal() {
    let inputs: [&[u8]; 2] = [b"not an email at all", b"\x00\xff\xfe binary"];
    for raw in inputs {
        let err = parse_envelope(raw).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::ReadOuter), "input {raw:?}");
    }
}

#[test]
fn test_metadata_from_html_report() {
    let mut raw = crlf(&[
        "From: journal@example.com",
        "Date: Thu, 02 Jan 2025 08:30:00 +0000",
        "Content-Type: multipart/mixed; boundary=\"ENVELOPE\"",
        "",
        "--ENVELOPE",
        "Content-Type: text/html; charset=us-ascii",
        "",
        "<html><body><p>Sender: A@x.com</p><p>To: b@x.com, Expanded: c@x.com</p></body></html>",
        "--ENVELOPE",
        "Content-Type: message/rfc822",
        "",
    ]);
    raw.push_str(&plain_message());
    raw.push_str("--ENVELOPE--\r\n");
    let message = parse_envelope(raw.as_bytes()).unwrap();

    assert_eq!(message.metadata.sender.as_deref(), Some("a@x.com"));
    assert_eq!(message.metadata.to, vec!["b@x.com", "c@x.com"]);
}

#[test]
fn test_empty_input_is_fatal() {
    let err = parse_envelope(b"").unwrap_err();

    assert!(matches!(
        err,
        EnvelopeError::MalformedOuterMessage {
            stage: Stage::ReadOuter,
            ..
        }
    ));
}

#[test]
fn test_empty_wrapped_message_is_fatal() {
    let raw = envelope(&journal_body(), &[""]);
    let err = parse_envelope(&raw).unwrap_err();

    assert!(matches!(
        err,
        EnvelopeError::WrappedMessageDecodeFailure { depth: 0, .. }
    ));
}

#[test]
fn test_pipelined_envelope_parse() {
    let raw = envelope(&journal_body(), &[&message_with_forward()]);
    let sequential = parse_envelope(&raw).unwrap();
    let pipelined = parse_envelope_with(&raw, &ParseOptions::default().pipelined(1)).unwrap();

    assert_eq!(pipelined.parts, sequential.parts);
    assert_eq!(pipelined.message_hash, sequential.message_hash);
    assert_eq!(pipelined.metadata, sequential.metadata);
}

#[test]
fn test_serialized_shape() {
    let raw = envelope("Sender: a@x.com\r\nTo: b@x.com\r\n", &[&plain_message()]);
    let message = parse_envelope(&raw).unwrap();
    let json = serde_json::to_value(&message).unwrap();

    assert_eq!(json["sender"], "a@x.com");
    assert_eq!(json["to"][0], "b@x.com");
    assert!(json.get("cc").is_none());
    assert!(json.get("subject").is_none());
    assert!(json.get("diagnostics").is_none());
    assert!(json["parts"][0].get("content").is_none());
    assert_eq!(json["parts"][0]["size"], message.parts[0].size);
}
