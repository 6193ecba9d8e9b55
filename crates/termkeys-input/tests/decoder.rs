use pretty_assertions::assert_eq;
use proptest::prelude::*;
use termkeys_input::{
    Classification, DispatchOutcome, Handlers, InputBuffer, KeyTable, KeyboardConfig,
    MouseProtocol, SequenceClassifier,
};
use termkeys_keymap::{Key, Modifiers};
use termkeys_test_utils::fixtures;
use termkeys_test_utils::{init_test_logging, Event, TestKeyboard};
use test_case::test_case;

fn mouse_config() -> KeyboardConfig {
    KeyboardConfig {
        mouse_support: true,
        ..KeyboardConfig::default()
    }
}

#[test]
fn test_every_generic_sequence_decodes_to_its_key() {
    init_test_logging();
    let table = KeyTable::generic();

    for entry in table.iter() {
        let pattern = entry.pattern();
        let expected = table.lookup(pattern).map(|first| first.key().normalize());

        let mut harness = TestKeyboard::default();
        harness.type_bytes(pattern);
        if matches!(pattern, [0x1b, b'O' | b'[' | b']']) {
            harness.settle();
        }

        assert_eq!(
            harness.recorder.pressed().first().copied(),
            expected,
            "sequence {:?}",
            pattern
        );
        assert_eq!(harness.recorder.pressed().len(), 1, "sequence {:?}", pattern);
        assert!(harness.keyboard.key_buffer().is_empty(), "sequence {:?}", pattern);
    }
}

#[test]
fn test_up_arrow_with_mouse_disabled() {
    let mut harness = TestKeyboard::default();
    harness.type_bytes(&[0x1b, 0x5b, 0x41]);

    assert_eq!(
        harness.recorder.events(),
        vec![Event::Pressed(Key::UP), Event::Released(Key::UP)]
    );
    assert!(harness.keyboard.key_buffer().is_empty());
    assert!(!harness.keyboard.has_unprocessed_input());
}

#[test]
fn test_x11_mouse_report_with_mouse_enabled() {
    let mut harness = TestKeyboard::new(mouse_config());
    harness.type_bytes(&[0x1b, 0x5b, 0x4d, 0x20, 0x21, 0x21]);

    assert_eq!(
        harness.recorder.mouse_reports(),
        vec![(MouseProtocol::X11, fixtures::X11_MOUSE_CLICK.to_vec())]
    );
    assert!(harness.recorder.pressed().is_empty());
    assert_eq!(harness.keyboard.queued_keys(), 0);
    assert!(harness.keyboard.key_buffer().is_empty());
}

#[test_case(fixtures::SGR_MOUSE_PRESS, MouseProtocol::Sgr ; "sgr press")]
#[test_case(fixtures::SGR_MOUSE_RELEASE, MouseProtocol::Sgr ; "sgr release")]
#[test_case(fixtures::URXVT_MOUSE_CLICK, MouseProtocol::Urxvt ; "urxvt")]
fn test_extended_mouse_reports(bytes: &[u8], protocol: MouseProtocol) {
    let mut harness = TestKeyboard::new(mouse_config());
    harness.type_bytes(bytes);

    assert_eq!(harness.recorder.mouse_reports(), vec![(protocol, bytes.to_vec())]);
    assert!(harness.keyboard.key_buffer().is_empty());
}

#[test]
fn test_key_after_mouse_report_is_not_lost() {
    let mut harness = TestKeyboard::new(mouse_config());
    let mut input = fixtures::SGR_MOUSE_PRESS.to_vec();
    input.extend_from_slice(b"x");
    harness.type_bytes(&input);

    assert_eq!(harness.recorder.mouse_reports().len(), 1);
    assert_eq!(harness.recorder.pressed(), vec![Key::from_char('x')]);
    assert!(harness.keyboard.key_buffer().is_empty());
}

#[test]
fn test_lone_escape_after_timeout() {
    let mut harness = TestKeyboard::default();
    harness.type_bytes(b"\x1b");
    assert_eq!(harness.recorder.escapes(), 0);

    harness.settle();
    harness.settle();
    assert_eq!(harness.recorder.events(), vec![Event::Escape]);
    assert!(harness.keyboard.key_buffer().is_empty());
}

#[test]
fn test_escape_then_bracket_after_timeout_is_meta_bracket() {
    let mut harness = TestKeyboard::default();
    harness.type_bytes(b"\x1b[");
    assert!(harness.recorder.events().is_empty());

    harness.settle();
    assert_eq!(harness.recorder.pressed(), vec![Key::META_LEFT_BRACKET]);
    assert_eq!(harness.recorder.escapes(), 0);
}

#[test]
fn test_escape_bracket_d_before_timeout_is_left_arrow() {
    let mut harness = TestKeyboard::default();
    harness.type_bytes(b"\x1b[");
    harness.clock.advance_millis(50);
    harness.type_bytes(b"D");
    harness.settle();

    assert_eq!(harness.recorder.pressed(), vec![Key::LEFT]);
}

#[test]
fn test_sequence_split_across_reads() {
    let mut harness = TestKeyboard::default();
    for byte in fixtures::SHIFT_F5 {
        harness.type_bytes(&[*byte]);
        harness.clock.advance_millis(10);
    }

    assert_eq!(
        harness.recorder.pressed(),
        vec![Key::F5.with_modifiers(Modifiers::SHIFT)]
    );
}

#[test_case(&[0x00], Key::CTRL_SPACE ; "nul")]
#[test_case(&[0x7f], Key::BACKSPACE ; "del")]
#[test_case(b"\x1b\x7f", Key::BACKSPACE.with_modifiers(Modifiers::META) ; "meta backspace")]
fn test_control_values_are_normalized(bytes: &[u8], expected: Key) {
    let mut harness = TestKeyboard::default();
    harness.type_bytes(bytes);
    assert_eq!(harness.recorder.pressed(), vec![expected]);
}

#[test]
fn test_mixed_input_keeps_order() {
    let mut harness = TestKeyboard::default();
    let mut input = b"ab".to_vec();
    input.extend_from_slice(fixtures::CURSOR_UP);
    input.extend_from_slice(fixtures::UNICODE_TEXT.as_bytes());
    input.extend_from_slice(fixtures::DELETE);
    harness.type_bytes(&input);

    let mut expected = vec![Key::from_char('a'), Key::from_char('b'), Key::UP];
    expected.extend(fixtures::UNICODE_TEXT.chars().map(Key::from_char));
    expected.push(Key::DELETE);
    assert_eq!(harness.recorder.pressed(), expected);
}

#[test]
fn test_queue_capacity_suspends_reading() {
    let config = KeyboardConfig {
        queue_capacity: 3,
        ..KeyboardConfig::default()
    };
    let mut harness = TestKeyboard::new(config);
    harness.source.feed(b"abcdefghij");

    harness.keyboard.fetch_key_code();
    assert_eq!(harness.keyboard.queued_keys(), 3);
    assert_eq!(harness.source.remaining(), 7);

    let reads = harness.source.reads();
    harness.keyboard.fetch_key_code();
    assert_eq!(harness.source.reads(), reads);
    assert_eq!(harness.keyboard.queued_keys(), 3);

    while harness.source.remaining() > 0 {
        harness.poll();
        assert!(harness.keyboard.queued_keys() <= 3);
    }
    harness.poll();

    let expected: Vec<Key> = "abcdefghij".chars().map(Key::from_char).collect();
    assert_eq!(harness.recorder.pressed(), expected);
}

#[test]
fn test_stop_predicate_ends_dispatch_early() {
    let mut harness = TestKeyboard::default();
    let recorder = harness.recorder.clone();
    let watcher = recorder.clone();
    harness = harness.with_handlers(
        recorder
            .handlers()
            .stop_when(move || watcher.pressed().contains(&Key::from_char('q'))),
    );

    assert_eq!(harness.type_bytes(b"aqz"), DispatchOutcome::Stopped);
    assert_eq!(
        harness.recorder.pressed(),
        vec![Key::from_char('a'), Key::from_char('q')]
    );

    assert_eq!(harness.keyboard.queued_keys(), 1);
}

#[test]
fn test_platform_table_overrides_generic() {
    let mut harness = TestKeyboard::default();
    let platform = KeyTable::new([termkeys_input::KeyEntry::from_capability("\\E[A", Key::F9)
        .expect("valid capability")]);
    harness.keyboard.set_platform_table(Some(platform));

    harness.type_bytes(fixtures::CURSOR_UP);
    harness.type_bytes(fixtures::CURSOR_LEFT);
    assert_eq!(harness.recorder.pressed(), vec![Key::F9, Key::LEFT]);
}

#[test]
fn test_default_handlers_discard_events() {
    let mut harness = TestKeyboard::default().with_handlers(Handlers::default());
    assert_eq!(harness.type_bytes(b"abc"), DispatchOutcome::Drained);
    assert!(harness.recorder.events().is_empty());
}

#[test]
fn test_truncated_utf8_is_incomplete_until_timeout() {
    let classifier = SequenceClassifier::new(KeyTable::generic());
    let mut buffer = InputBuffer::new();
    for &byte in &"€".as_bytes()[..2] {
        buffer.push(byte);
    }

    assert_eq!(classifier.classify(&mut buffer, false), Classification::Incomplete);
    assert_eq!(buffer.len(), 2);
    assert_eq!(
        classifier.classify(&mut buffer, true),
        Classification::Resolved(Key::from_code(0x82))
    );
    assert!(buffer.is_empty());
}

#[test]
fn test_utf8_beyond_unicode_range_yields_raw_bytes() {
    let mut harness = TestKeyboard::new(mouse_config());
    harness.type_bytes(&[0xf4, 0x90, 0x80, 0x80]);
    harness.type_bytes(&[0xf4, 0x90, 0x81, 0x80]);

    let expected: Vec<Key> = [0xf4, 0x90, 0x80, 0x80, 0xf4, 0x90, 0x81, 0x80]
        .into_iter()
        .map(Key::from_code)
        .collect();
    assert_eq!(harness.recorder.pressed(), expected);
    assert!(harness.recorder.mouse_reports().is_empty());
}

#[test]
fn test_closed_input_settles_prefix_and_stops_polling() {
    let mut harness = TestKeyboard::default();
    harness.source.feed(b"a\x1b[");
    harness.source.close();

    assert_eq!(harness.poll(), DispatchOutcome::Closed);
    assert_eq!(
        harness.recorder.pressed(),
        vec![Key::from_char('a'), Key::META_LEFT_BRACKET]
    );
    assert!(harness.keyboard.key_buffer().is_empty());

    let polls = harness.source.polls().len();
    for _ in 0..20 {
        assert_eq!(harness.poll(), DispatchOutcome::Closed);
    }
    assert_eq!(harness.source.polls().len(), polls);
}

#[test]
fn test_closed_input_degrades_partial_sequence() {
    let mut harness = TestKeyboard::default();
    harness.source.feed(b"\x1b[1;");
    harness.source.close();

    assert_eq!(harness.poll(), DispatchOutcome::Closed);
    assert_eq!(
        harness.recorder.pressed(),
        vec![
            Key::ESCAPE,
            Key::from_char('['),
            Key::from_char('1'),
            Key::from_char(';'),
        ]
    );
}

proptest! {
    #[test]
    fn prop_utf8_characters_decode(c in any::<char>().prop_filter("non-ascii", |c| !c.is_ascii())) {
        let mut harness = TestKeyboard::default();
        let mut encoded = [0u8; 4];
        harness.type_bytes(c.encode_utf8(&mut encoded).as_bytes());

        prop_assert_eq!(harness.recorder.pressed(), vec![Key::from_char(c)]);
        prop_assert!(harness.keyboard.key_buffer().is_empty());
    }

    #[test]
    fn prop_truncated_utf8_waits(c in any::<char>().prop_filter("non-ascii", |c| !c.is_ascii())) {
        let mut harness = TestKeyboard::default();
        let mut encoded = [0u8; 4];
        let bytes = c.encode_utf8(&mut encoded).as_bytes();
        let truncated = &bytes[..bytes.len() - 1];
        harness.type_bytes(truncated);

        prop_assert!(harness.recorder.pressed().is_empty());
        prop_assert_eq!(harness.keyboard.key_buffer(), truncated);
    }

    #[test]
    fn prop_consume_shifts_remainder(
        bytes in proptest::collection::vec(any::<u8>(), 1..64),
        split in 0usize..64,
    ) {
        let mut buffer = InputBuffer::new();
        for &byte in &bytes {
            buffer.push(byte);
        }
        let split = split.min(bytes.len());
        buffer.consume_front(split);

        prop_assert_eq!(buffer.as_slice(), &bytes[split..]);
        prop_assert_eq!(buffer.has_unprocessed_data(), split < bytes.len());
        prop_assert!(buffer.raw()[buffer.len()..].iter().all(|&b| b == 0));

        buffer.clear();
        prop_assert!(!buffer.has_unprocessed_data());
    }

    #[test]
    fn prop_queue_never_exceeds_capacity(
        input in proptest::collection::vec(0x20u8..0x7f, 0..200),
        capacity in 1usize..16,
    ) {
        let mut harness = TestKeyboard::new(KeyboardConfig {
            queue_capacity: capacity,
            ..KeyboardConfig::default()
        });
        harness.source.feed(&input);

        harness.keyboard.fetch_key_code();
        prop_assert!(harness.keyboard.queued_keys() <= capacity);
        prop_assert_eq!(harness.source.remaining() + harness.keyboard.queued_keys(), input.len());
    }
}
