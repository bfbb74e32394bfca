//! Canonical string-to-sign.

use crate::types::NotificationMessage;

/// Build the exact byte sequence the notification service signed.
///
/// Each field contributes `Name\nvalue\n`, in this order:
/// `Message`, `MessageId`, `Subject` (only when present), `Timestamp`,
/// `TopicArn`, `Type`. The timestamp is the string from the wire, not a
/// re-rendered date.
pub fn string_to_sign(message: &NotificationMessage) -> String {
    let mut fields: Vec<(&str, &str)> = Vec::with_capacity(6);
    fields.push(("Message", message.message_body()));
    fields.push(("MessageId", message.message_id()));
    if let Some(subject) = message.subject() {
        fields.push(("Subject", subject));
    }
    fields.push(("Timestamp", message.timestamp_str()));
    fields.push(("TopicArn", message.topic_arn()));
    fields.push(("Type", message.message_type().as_str()));

    let mut out = String::new();
    for (name, value) in fields {
        out.push_str(name);
        out.push('\n');
        out.push_str(value);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_message;
    use serde_json::json;

    fn message(subject: Option<&str>) -> NotificationMessage {
        let mut value = json!({
            "Type": "Notification",
            "MessageId": "m-1",
            "TopicArn": "arn:aws:sns:us-east-1:123456789012:t",
            "Message": "hello",
            "Timestamp": "2024-01-01T00:00:00.000Z",
            "SignatureVersion": "1",
            "Signature": "c2ln",
            "SigningCertURL": "https://sns.us-east-1.amazonaws.com/c.pem"
        });
        if let Some(subject) = subject {
            value["Subject"] = json!(subject);
        }
        decode_message(&value.to_string()).unwrap()
    }

    #[test]
    fn test_without_subject() {
        assert_eq!(
            string_to_sign(&message(None)),
            "Message\nhello\nMessageId\nm-1\nTimestamp\n2024-01-01T00:00:00.000Z\n\
             TopicArn\narn:aws:sns:us-east-1:123456789012:t\nType\nNotification\n"
        );
    }

    #[test]
    fn test_with_subject() {
        assert_eq!(
            string_to_sign(&message(Some("greeting"))),
            "Message\nhello\nMessageId\nm-1\nSubject\ngreeting\n\
             Timestamp\n2024-01-01T00:00:00.000Z\n\
             TopicArn\narn:aws:sns:us-east-1:123456789012:t\nType\nNotification\n"
        );
    }

    #[test]
    fn test_empty_subject_is_present() {
        let canonical = string_to_sign(&message(Some("")));
        let expected = "MessageId\nm-1\nSubject\n\nTimestamp\n";
        assert!(canonical.contains(expected));
    }

    #[test]
    fn test_timestamp_uses_wire_text() {
        let value = json!({
            "Type": "Notification",
            "MessageId": "m-1",
            "TopicArn": "arn:aws:sns:us-east-1:123456789012:t",
            "Message": "hello",
            "Timestamp": "2024-01-01T00:00:00+00:00",
            "SignatureVersion": "2",
            "Signature": "c2ln",
            "SigningCertURL": "https://sns.us-east-1.amazonaws.com/c.pem"
        });
        let msg = decode_message(&value.to_string()).unwrap();

        let canonical = string_to_sign(&msg);
        assert!(canonical.contains("Timestamp\n2024-01-01T00:00:00+00:00\n"));
    }
}
