#![allow(dead_code)]

/// Join lines with CRLF, ending with a CRLF
pub fn crlf(lines: &[&str]) -> String {
    let mut out = lines.join("\r\n");
    out.push_str("\r\n");
    out
}

/// A single-part plain-text message
pub fn plain_message() -> String {
    crlf(&[
        "From: Alice <alice@example.com>",
        "To: bob@example.com",
        "Subject: Quarterly numbers",
        "Date: Wed, 01 Jan 2025 12:00:00 +0000",
        "Message-ID: <abc123@mail>",
        "Content-Type: text/plain; charset=utf-8",
        "",
        "Numbers attached.",
    ])
}

/// A forwarded message holding a text part and a PDF attachment
pub fn forwarded_message() -> String {
    crlf(&[
        "From: Carol <carol@example.com>",
        "To: alice@example.com",
        "Subject: Original report",
        "Date: Wed, 01 Jan 2025 09:00:00 +0000",
        "MIME-Version: 1.0",
        "Content-Type: multipart/mixed; boundary=\"NESTED\"",
        "",
        "--NESTED",
        "Content-Type: text/plain; charset=utf-8",
        "",
        "See the report.",
        "--NESTED",
        "Content-Type: application/pdf; name=\"report.pdf\"",
        "Content-Disposition: attachment; filename=\"report.pdf\"",
        "Content-Transfer-Encoding: base64",
        "",
        "JVBERi0xLjQ=",
        "--NESTED--",
    ])
}

/// A message with a text part and `forwarded_message` attached
pub fn message_with_forward() -> String {
    let mut out = crlf(&[
        "From: Alice <alice@example.com>",
        "To: bob@example.com",
        "Subject: Fwd: Original report",
        "Date: Wed, 01 Jan 2025 12:00:00 +0000",
        "Message-ID: <fwd-1@mail>",
        "MIME-Version: 1.0",
        "Content-Type: multipart/mixed; boundary=\"WRAPPED\"",
        "",
        "--WRAPPED",
        "Content-Type: text/plain; charset=utf-8",
        "",
        "Forwarding this along.",
        "--WRAPPED",
        "Content-Type: message/rfc822",
        "",
    ]);
    out.push_str(&forwarded_message());
    out.push_str("--WRAPPED--\r\n");
    out
}

/// A journal envelope with the given body text and one part per wrapped message
pub fn envelope(body_text: &str, wrapped: &[&str]) -> Vec<u8> {
    let mut out = crlf(&[
        "From: journal@example.com",
        "To: archive@example.com",
        "Subject: Journal report",
        "Date: Thu, 02 Jan 2025 08:30:00 +0000",
        "MIME-Version: 1.0",
        "Content-Type: multipart/mixed; boundary=\"ENVELOPE\"",
        "",
        "--ENVELOPE",
        "Content-Type: text/plain; charset=us-ascii",
        "",
    ]);
    out.push_str(body_text);
    for message in wrapped {
        out.push_str("\r\n--ENVELOPE\r\nContent-Type: message/rfc822\r\n\r\n");
        out.push_str(message);
    }
    out.push_str("\r\n--ENVELOPE--\r\n");
    out.into_bytes()
}

/// Envelope body text as written by a journaling server
pub fn journal_body() -> String {
    crlf(&[
        "Sender: Alice@Example.com",
        "Subject: Quarterly numbers",
        "Message-Id: <abc123@mail>",
        "To: bob@example.com",
        "Cc: carol@example.com, Expanded: dave@example.com",
        "Bcc: eve@example.com, Forwarded: Eve@Example.com",
    ])
}
