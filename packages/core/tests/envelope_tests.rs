//! End-to-end tests for the envelope pipeline
//!
//! sign → encrypt → transport → decrypt → verify, plus tampering

mod common;

use common::{key_pair, other_key_pair, reassemble, through_transport, Suite};
use mailseal_core::envelope::decryptor::{decrypt, open, verify};
use mailseal_core::envelope::encryptor::encrypt;
use mailseal_core::envelope::signer::sign;
use mailseal_core::envelope::{Attachment, Envelope, EnvelopeState};
use mailseal_core::MailError;

fn hello() -> Envelope {
    Envelope::new("alice@example.com", "bob@example.com", "Greetings").with_body("hello")
}

fn report() -> Envelope {
    hello().with_attachment(Attachment::new("report.txt", b"data".to_vec()))
}

fn replace_attachment(envelope: &Envelope, name: &str, content: &[u8]) -> Vec<Attachment> {
    envelope
        .attachments()
        .iter()
        .map(|a| {
            if a.file_name == name {
                Attachment::new(name, content.to_vec())
            } else {
                a.clone()
            }
        })
        .collect()
}

#[test]
fn test_encrypted_only_scenario() {
    let keys = key_pair();
    let encrypted = encrypt::<Suite>(hello(), keys.public_key()).unwrap();

    assert_ne!(encrypted.body(), Some("hello"), "body must be ciphertext");
    assert_eq!(encrypted.state(), EnvelopeState::Encrypted);
    let reserved: Vec<_> = encrypted.attachments().iter().filter(|a| a.is_reserved()).collect();
    assert_eq!(reserved.len(), 2, "exactly key and IV are added");

    let received = through_transport(&encrypted);
    assert!(received.is_encrypted(), "flag recovered from the subject tag");

    let decrypted = decrypt::<Suite>(received, keys.private_key()).unwrap();
    assert_eq!(decrypted.body(), Some("hello"));
    assert_eq!(decrypted.subject(), "Greetings");
    assert!(decrypted.attachments().is_empty());
    assert_eq!(verify::<Suite>(&decrypted, keys.public_key()).unwrap(), None);
}

#[test]
fn test_signed_only_scenario() {
    let keys = key_pair();
    let signed = sign::<Suite>(report(), keys.private_key()).unwrap();

    let reserved: Vec<_> = signed.attachments().iter().filter(|a| a.is_reserved()).collect();
    assert_eq!(reserved.len(), 1, "exactly one signature attachment");
    assert_eq!(signed.state(), EnvelopeState::Signed);

    let received = through_transport(&signed);
    assert_eq!(verify::<Suite>(&received, keys.public_key()).unwrap(), Some(true));

    let tampered = reassemble(
        &signed,
        signed.body(),
        replace_attachment(&signed, "report.txt", b"datas"),
    );
    assert_eq!(
        verify::<Suite>(&tampered, keys.public_key()).unwrap(),
        Some(false),
        "modified attachment must fail verification"
    );
}

#[test]
fn test_encrypted_and_signed_scenario() {
    let keys = key_pair();
    let signed = sign::<Suite>(report(), keys.private_key()).unwrap();
    let sealed = encrypt::<Suite>(signed, keys.public_key()).unwrap();

    assert_eq!(sealed.state(), EnvelopeState::EncryptedAndSigned);
    assert_eq!(sealed.attachments().len(), 4);
    assert_eq!(
        sealed.attachments()[1].file_name, "message.sign",
        "signature stays ahead of the key attachments"
    );

    let received = through_transport(&sealed);
    let decrypted = decrypt::<Suite>(received, keys.private_key()).unwrap();
    assert_eq!(decrypted.state(), EnvelopeState::Signed);
    assert_eq!(decrypted.body(), Some("hello"));
    assert_eq!(decrypted.user_attachments().next().unwrap().content, b"data".to_vec());

    assert_eq!(
        verify::<Suite>(&decrypted, keys.public_key()).unwrap(),
        Some(true),
        "digest over decrypted plaintext must match the signer's"
    );
}

#[test]
fn test_tampered_body_fails_verification() {
    let keys = key_pair();
    let signed = sign::<Suite>(report(), keys.private_key()).unwrap();
    let tampered = reassemble(&signed, Some("hellp"), signed.attachments().to_vec());

    assert_eq!(verify::<Suite>(&tampered, keys.public_key()).unwrap(), Some(false));
}

#[test]
fn test_tampered_signature_fails_verification() {
    let keys = key_pair();
    let signed = sign::<Suite>(report(), keys.private_key()).unwrap();

    let mut signature = signed.attachments()[1].content.clone();
    signature[100] ^= 0x01;
    let tampered = reassemble(
        &signed,
        signed.body(),
        replace_attachment(&signed, "message.sign", &signature),
    );

    assert_eq!(verify::<Suite>(&tampered, keys.public_key()).unwrap(), Some(false));
}

#[test]
fn test_file_names_are_not_covered_by_signature() {
    let keys = key_pair();
    let signed = sign::<Suite>(report(), keys.private_key()).unwrap();

    let mut renamed = signed.attachments().to_vec();
    renamed[0].file_name = "renamed.txt".to_string();
    let received = reassemble(&signed, signed.body(), renamed);

    assert_eq!(
        verify::<Suite>(&received, keys.public_key()).unwrap(),
        Some(true),
        "file names are outside the aggregate digest"
    );
}

#[test]
fn test_fresh_ciphertext_per_envelope() {
    let keys = key_pair();
    let first = encrypt::<Suite>(report(), keys.public_key()).unwrap();
    let second = encrypt::<Suite>(report(), keys.public_key()).unwrap();

    assert_ne!(first.body(), second.body(), "session key must be fresh");
    assert_ne!(first.attachments()[0].content, second.attachments()[0].content);

    let first = decrypt::<Suite>(first, keys.private_key()).unwrap();
    let second = decrypt::<Suite>(second, keys.private_key()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, report());
}

#[test]
fn test_round_trip_attachments_only() {
    let keys = key_pair();
    let binary: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
    let original = Envelope::new("alice@example.com", "bob@example.com", "Files")
        .with_attachment(Attachment::new("image.bin", binary))
        .with_attachment(Attachment::new("one.txt", b"1".to_vec()))
        .with_attachment(Attachment::new("block.txt", b"12345678".to_vec()));

    let signed = sign::<Suite>(original.clone(), keys.private_key()).unwrap();
    let sealed = encrypt::<Suite>(signed, keys.public_key()).unwrap();
    assert!(sealed.body().is_none());

    let opened = open::<Suite>(through_transport(&sealed), keys).unwrap();
    assert_eq!(opened.authenticity, Some(true));
    assert_eq!(opened.envelope.attachments(), original.attachments());
}

#[test]
fn test_decrypt_with_foreign_key_fails() {
    let sealed = encrypt::<Suite>(hello(), key_pair().public_key()).unwrap();
    let result = decrypt::<Suite>(sealed, other_key_pair().private_key());
    assert!(result.is_err(), "foreign key must not decrypt");
}

#[test]
fn test_verify_with_foreign_key_is_false() {
    let signed = sign::<Suite>(report(), key_pair().private_key()).unwrap();
    let verdict = verify::<Suite>(&signed, other_key_pair().public_key()).unwrap();
    assert_eq!(verdict, Some(false));
}

#[test]
fn test_missing_key_attachment_is_metadata_missing() {
    let keys = key_pair();
    let sealed = encrypt::<Suite>(hello(), keys.public_key()).unwrap();
    let stripped: Vec<Attachment> = sealed
        .attachments()
        .iter()
        .filter(|a| a.file_name != "session.key")
        .cloned()
        .collect();
    let received = reassemble(&sealed, sealed.body(), stripped);

    let result = open::<Suite>(received, keys);
    assert!(matches!(result, Err(MailError::ProtocolMetadataMissing(_))));
}

#[test]
fn test_plain_envelope_passes_through() {
    let keys = key_pair();
    let opened = open::<Suite>(through_transport(&report()), keys).unwrap();
    assert_eq!(opened.authenticity, None);
    assert_eq!(opened.envelope, report());
}
