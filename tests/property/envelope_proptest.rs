//! Property-based tests for the wire envelope and the handshake parser
//!
//! Uses proptest to generate random inputs and verify properties

use proptest::prelude::*;
use threadline::backend::gateway::handshake::{parse_setup, Topic};
use threadline::shared::{ChatRequest, Envelope, EnvelopeKind};

proptest! {
    #[test]
    fn test_decode_never_panics(raw in ".*") {
        let _ = Envelope::decode(&raw);
    }

    #[test]
    fn test_setup_frame_selects_topic(thread in ".*") {
        let frame = Envelope::setup(thread.clone()).encode().unwrap();
        let topic = parse_setup(&frame).unwrap();
        if thread.is_empty() {
            prop_assert_eq!(topic, Topic::Global);
        } else {
            prop_assert_eq!(topic, Topic::Thread(thread));
        }
    }

    #[test]
    fn test_non_setup_frames_fail_the_handshake(text in ".*", grade in any::<i32>()) {
        let notice = Envelope::notice(text.clone()).encode().unwrap();
        prop_assert!(parse_setup(&notice).unwrap_err().is_protocol());

        let chat = Envelope::chat(&ChatRequest::new(text, grade)).unwrap().encode().unwrap();
        prop_assert!(parse_setup(&chat).unwrap_err().is_protocol());
    }

    #[test]
    fn test_chat_payload_survives_the_envelope(text in ".*", grade in any::<i32>()) {
        let frame = Envelope::chat(&ChatRequest::new(text.clone(), grade)).unwrap().encode().unwrap();
        let envelope = Envelope::decode(&frame).unwrap();
        prop_assert!(envelope.is(EnvelopeKind::Message));
        prop_assert_eq!(envelope.chat_request().unwrap(), ChatRequest::new(text, grade));
    }
}
