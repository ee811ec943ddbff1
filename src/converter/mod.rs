//! Raw runner output in, ordered test signals out.

pub mod emitter;
pub mod tree;

use crate::converter::emitter::SignalEmitter;
use crate::protocol::{Decoder, Protocol};
use crate::reader::{Line, LineReader, OutputKind};
use crate::signal::Signaller;

/// Pipeline of [`LineReader`], [`Decoder`] and [`SignalEmitter`] for one test
/// session.
///
/// ```
/// use dart_test_events::{EventsConverter, OutputKind, Signal};
///
/// let mut converter = EventsConverter::new(Vec::<Signal>::new());
/// converter.process_text("{\"type\":\"start\",\"name\":\"adds\"}\n", OutputKind::Stdout);
/// converter.process_text("{\"type\":\"pass\",\"name\":\"adds\"}\n", OutputKind::Stdout);
/// let signals: Vec<String> = converter.into_signaller().iter().map(ToString::to_string).collect();
/// assert_eq!(signals, vec!["attached", "start adds", "pass adds"]);
/// ```
#[derive(Debug)]
pub struct EventsConverter<S: Signaller> {
    reader: LineReader,
    decoder: Decoder,
    emitter: SignalEmitter,
    signaller: S,
    finished: bool,
}

impl<S: Signaller> EventsConverter<S> {
    pub fn new(signaller: S) -> Self {
        Self {
            reader: LineReader::default(),
            decoder: Decoder::default(),
            emitter: SignalEmitter::default(),
            signaller,
            finished: false,
        }
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.decoder = Decoder::new(protocol);
        self
    }

    /// Reports virtual tests (loading, setUpAll, tearDownAll) even when they pass.
    pub fn reveal_hidden(mut self, reveal_hidden: bool) -> Self {
        self.emitter.set_reveal_hidden(reveal_hidden);
        self
    }

    pub fn protocol(&self) -> Protocol {
        self.decoder.protocol()
    }

    /// Feeds one chunk of process output; complete lines are handled right away.
    pub fn process(&mut self, chunk: &[u8], kind: OutputKind) {
        if self.finished {
            warn!("Ignoring {} bytes of {} received after end of output", chunk.len(), kind);
            return;
        }
        for line in self.reader.push(chunk, kind) {
            self.line(&line);
        }
    }

    pub fn process_text(&mut self, text: &str, kind: OutputKind) {
        self.process(text.as_bytes(), kind)
    }

    /// Flushes unterminated lines and any outcome still pending in the decoder.
    pub fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        for line in self.reader.finish() {
            self.line(&line);
        }
        for event in self.decoder.finish() {
            self.emitter.emit(event, &mut self.signaller);
        }
    }

    pub fn signaller(&self) -> &S {
        &self.signaller
    }

    pub fn signaller_mut(&mut self) -> &mut S {
        &mut self.signaller
    }

    pub fn into_signaller(mut self) -> S {
        self.finish();
        self.signaller
    }

    fn line(&mut self, line: &Line) {
        for event in self.decoder.decode(line) {
            self.emitter.emit(event, &mut self.signaller);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{Signal, TestFailed};

    fn convert(lines: &[&str]) -> Vec<Signal> {
        let mut converter = EventsConverter::new(Vec::<Signal>::new());
        for line in lines {
            converter.process_text(line, OutputKind::Stdout);
        }
        converter.into_signaller()
    }

    fn render(signals: &[Signal]) -> Vec<String> {
        signals.iter().map(ToString::to_string).collect()
    }

    fn failures(signals: &[Signal]) -> Vec<&TestFailed> {
        signals
            .iter()
            .filter_map(|signal| match signal {
                Signal::TestFailed(failed) => Some(failed),
                _ => None,
            })
            .collect()
    }

    const GROUPS_DONE: &[&str] = &[
        "{\"protocolVersion\":\"0.1.0\",\"runnerVersion\":\"0.12.13+1\",\"type\":\"start\",\"time\":0}\n",
        "{\"count\":1,\"type\":\"allSuites\",\"time\":0}\n",
        "{\"test\":{\"id\":0,\"name\":\"loading C:\\\\projects\\\\test\\\\foo_test.dart\",\"suiteID\":0,\"groupIDs\":[],\"metadata\":{\"skip\":false,\"skipReason\":null}},\"type\":\"testStart\",\"time\":0}\n",
        "{\"suite\":{\"id\":0,\"platform\":\"vm\",\"path\":\"C:\\\\projects\\\\test\\\\foo_test.dart\"},\"type\":\"suite\",\"time\":0}\n",
        "{\"testID\":0,\"result\":\"success\",\"hidden\":true,\"type\":\"testDone\",\"time\":1180}\n",
        "{\"group\":{\"id\":2,\"suiteID\":0,\"parentID\":null,\"name\":null,\"metadata\":{\"skip\":false,\"skipReason\":null},\"testCount\":6},\"type\":\"group\",\"time\":1185}\n",
        "{\"group\":{\"id\":3,\"suiteID\":0,\"parentID\":2,\"name\":\"some group\",\"metadata\":{\"skip\":false,\"skipReason\":null},\"testCount\":5},\"type\":\"group\",\"time\":1188}\n",
        "{\"group\":{\"id\":4,\"suiteID\":0,\"parentID\":3,\"name\":\"some group sub group 1\",\"metadata\":{\"skip\":false,\"skipReason\":null},\"testCount\":1},\"type\":\"group\",\"time\":1189}\n",
        "{\"test\":{\"id\":30,\"name\":\"some group sub group 1 (setUpAll)\",\"suiteID\":0,\"groupIDs\":[2,3,4],\"metadata\":{\"skip\":false,\"skipReason\":null}},\"type\":\"testStart\",\"time\":1189}\n",
        "{\"testID\":30,\"message\":\"foo\",\"type\":\"print\",\"time\":1189}\n",
        "{\"testID\":30,\"result\":\"success\",\"hidden\":true,\"type\":\"testDone\",\"time\":1190}\n",
        "{\"test\":{\"id\":5,\"name\":\"some group sub group 1 passing test1\",\"suiteID\":0,\"groupIDs\":[2,3,4],\"metadata\":{\"skip\":false,\"skipReason\":null}},\"type\":\"testStart\",\"time\":1190}\n",
        "{\"testID\":5,\"result\":\"success\",\"hidden\":false,\"type\":\"testDone\",\"time\":1222}\n",
        "{\"group\":{\"id\":6,\"suiteID\":0,\"parentID\":3,\"name\":\"some group sub group 2\",\"metadata\":{\"skip\":false,\"skipReason\":null},\"testCount\":3},\"type\":\"group\",\"time\":1223}\n",
        "{\"test\":{\"id\":7,\"name\":\"some group sub group 2 passing test 2\",\"suiteID\":0,\"groupIDs\":[2,3,6],\"metadata\":{\"skip\":false,\"skipReason\":null}},\"type\":\"testStart\",\"time\":1224}\n",
        "{\"testID\":7,\"result\":\"success\",\"hidden\":false,\"type\":\"testDone\",\"time\":1229}\n",
        "{\"test\":{\"id\":8,\"name\":\"some group sub group 2 skipped test\",\"suiteID\":0,\"groupIDs\":[2,3,6],\"metadata\":{\"skip\":true,\"skipReason\":\"skip reason\"}},\"type\":\"testStart\",\"time\":1230}\n",
        "{\"testID\":8,\"result\":\"success\",\"hidden\":false,\"type\":\"testDone\",\"time\":1231}\n",
        "{\"test\":{\"id\":9,\"name\":\"some group sub group 2 standard TestFailure\",\"suiteID\":0,\"groupIDs\":[2,3,6],\"metadata\":{\"skip\":false,\"skipReason\":null}},\"type\":\"testStart\",\"time\":1232}\n",
        "{\"testID\":9,\"message\":\"in standard TestFailure test\",\"type\":\"print\",\"time\":1239}\n",
        "{\"testID\":9,\"error\":\"Expected: <false>\n",
        "  Actual: <true>\n",
        "\",\"stackTrace\":\"package:test expect\\n\",\"isFailure\":true,\"type\":\"error\",\"time\":1291}\n",
        "{\"testID\":9,\"result\":\"failure\",\"hidden\":false,\"type\":\"testDone\",\"time\":1294}\n",
        "{\"test\":{\"id\":10,\"name\":\"some group unexpected error\",\"suiteID\":0,\"groupIDs\":[2,3],\"metadata\":{\"skip\":false,\"skipReason\":null}},\"type\":\"testStart\",\"time\":1295}\n",
        "{\"testID\":10,\"message\":\"in unexpected error test\",\"type\":\"print\",\"time\":1296}\n",
        "{\"testID\":10,\"error\":\"error message\n",
        "\",\"stackTrace\":\"\",\"isFailure\":false,\"type\":\"error\",\"time\":1299}\n",
        "{\"testID\":10,\"result\":\"error\",\"hidden\":false,\"type\":\"testDone\",\"time\":1300}\n",
        "{\"test\":{\"id\":11,\"name\":\"passing test 3\",\"suiteID\":0,\"groupIDs\":[2],\"metadata\":{\"skip\":false,\"skipReason\":null}},\"type\":\"testStart\",\"time\":1301}\n",
        "{\"testID\":11,\"message\":\"in passing test\",\"type\":\"print\",\"time\":1302}\n",
        "{\"testID\":11,\"result\":\"success\",\"hidden\":false,\"type\":\"testDone\",\"time\":1303}\n",
        "{\"test\":{\"id\":50,\"name\":\"(tearDownAll)\",\"suiteID\":0,\"groupIDs\":[2],\"metadata\":{\"skip\":false,\"skipReason\":null}},\"type\":\"testStart\",\"time\":1303}\n",
        "{\"testID\":50,\"message\":\"tda\",\"type\":\"print\",\"time\":1303}\n",
        "{\"testID\":50,\"result\":\"success\",\"hidden\":true,\"type\":\"testDone\",\"time\":1304}\n",
        "{\"success\":false,\"type\":\"done\",\"time\":1304}\n",
    ];

    #[test]
    fn test_groups_finish_when_their_tests_are_done() {
        let signals = convert(GROUPS_DONE);
        assert_eq!(
            render(&signals),
            vec![
                "attached",
                "count 6",
                "suite started foo_test.dart",
                "suite started some group",
                "suite started sub group 1",
                "start passing test1",
                "pass passing test1",
                "suite finished sub group 1",
                "suite started sub group 2",
                "start passing test 2",
                "pass passing test 2",
                "start skipped test",
                "skip skipped test skip reason",
                "start standard TestFailure",
                "print standard TestFailure in standard TestFailure test\n",
                "fail standard TestFailure false",
                "suite finished sub group 2",
                "start unexpected error",
                "print unexpected error in unexpected error test\n",
                "fail unexpected error false",
                "suite finished some group",
                "start passing test 3",
                "print passing test 3 in passing test\n",
                "pass passing test 3",
                "suite finished foo_test.dart",
                "done false",
            ]
        );
    }

    #[test]
    fn test_tree_shape_and_location_hints() {
        let signals = convert(GROUPS_DONE);
        let started: Vec<_> = signals
            .iter()
            .filter_map(|signal| match signal {
                Signal::TestStarted(started) => Some(started),
                _ => None,
            })
            .collect();
        let root = started[0];
        assert_eq!((root.id, root.parent_id), (2, None));
        assert_eq!(root.node_type, crate::signal::NodeKind::Suite);
        assert_eq!(
            root.location_hint.as_deref(),
            Some("dart_location://C:\\projects\\test\\foo_test.dart,[]")
        );
        let sub_group = started[2];
        assert_eq!((sub_group.id, sub_group.parent_id), (4, Some(3)));
        let test = started[3];
        assert_eq!((test.id, test.parent_id), (5, Some(4)));
        assert_eq!(
            test.location_hint.as_deref(),
            Some("dart_location://C:\\projects\\test\\foo_test.dart,[\"some group\",\"sub group 1\",\"passing test1\"]")
        );
        let finished = signals.iter().find_map(|signal| match signal {
            Signal::TestFinished(finished) => Some(finished),
            _ => None,
        });
        assert_eq!(finished.and_then(|finished| finished.duration_ms), Some(32));
    }

    #[test]
    fn test_load_failure_reveals_loading_test() {
        let signals = convert(&[
            "{\"protocolVersion\":\"0.1.0\",\"runnerVersion\":\"0.12.9\",\"type\":\"start\",\"time\":0}\n",
            "{\"test\":{\"id\":0,\"name\":\"loading test/formatter_test.dart\",\"suiteID\":0,\"groupIDs\":[],\"metadata\":{\"skip\":false,\"skipReason\":null}},\"type\":\"testStart\",\"time\":0}\n",
            "{\"testID\":0,\"error\":\"Failed to load \\\"test/formatter_test.dart\\\"\",\"stackTrace\":\"dart:async Future.then\\n\",\"isFailure\":false,\"type\":\"error\",\"time\":1240}\n",
            "{\"testID\":0,\"error\":\"2nd failure message\",\"stackTrace\":\"\",\"isFailure\":false,\"type\":\"error\",\"time\":1242}\n",
            "{\"testID\":0,\"error\":\"3rd failure message\",\"stackTrace\":\"3rd stack trace\",\"isFailure\":false,\"type\":\"error\",\"time\":1243}\n",
            "{\"testID\":0,\"result\":\"error\",\"hidden\":false,\"type\":\"testDone\",\"time\":1245}\n",
            "{\"test\":{\"id\":1,\"name\":\"loading test/another_bad_test.dart\",\"suiteID\":1,\"groupIDs\":[],\"metadata\":{\"skip\":false,\"skipReason\":null}},\"type\":\"testStart\",\"time\":1246}\n",
            "{\"testID\":1,\"message\":\"some output\",\"type\":\"print\",\"time\":1300}\n",
            "{\"testID\":1,\"error\":\"Failed to load\",\"stackTrace\":\"some stack\",\"isFailure\":false,\"type\":\"error\",\"time\":1301}\n",
            "{\"testID\":1,\"result\":\"error\",\"hidden\":false,\"type\":\"testDone\",\"time\":1302}\n",
            "{\"success\":false,\"type\":\"done\",\"time\":1303}\n",
        ]);
        assert_eq!(
            render(&signals),
            vec![
                "attached",
                "start loading formatter_test.dart",
                "fail loading formatter_test.dart false",
                "print loading formatter_test.dart dart:async Future.then\n",
                "print loading formatter_test.dart 2nd failure message\n",
                "print loading formatter_test.dart 3rd failure message\n",
                "print loading formatter_test.dart 3rd stack trace\n",
                "start loading another_bad_test.dart",
                "print loading another_bad_test.dart some output\n",
                "fail loading another_bad_test.dart false",
                "print loading another_bad_test.dart some stack\n",
                "done false",
            ]
        );
        let failed = failures(&signals);
        assert_eq!(failed[0].message, "Failed to load \"test/formatter_test.dart\"");
        assert_eq!(failed[0].stack_trace, None);
        assert_eq!(failed[0].duration_ms, Some(1240));
        match &signals[3] {
            Signal::TestOutput(output) => assert_eq!(output.stream, OutputKind::Stderr),
            other => panic!("unexpected signal {:?}", other),
        }
    }

    #[test]
    fn test_set_up_all_failure() {
        let signals = convert(&[
            "{\"protocolVersion\":\"0.1.0\",\"runnerVersion\":\"0.12.13\",\"type\":\"start\",\"time\":0}\n",
            "{\"suite\":{\"id\":0,\"platform\":\"vm\",\"path\":\"test/next_test.dart\"},\"type\":\"suite\",\"time\":0}\n",
            "{\"test\":{\"id\":1,\"name\":\"loading test/next_test.dart\",\"suiteID\":0,\"groupIDs\":[],\"metadata\":{\"skip\":false,\"skipReason\":null}},\"type\":\"testStart\",\"time\":1}\n",
            "{\"testID\":1,\"result\":\"success\",\"hidden\":true,\"type\":\"testDone\",\"time\":900}\n",
            "{\"group\":{\"id\":2,\"suiteID\":0,\"parentID\":null,\"name\":null,\"metadata\":{\"skip\":false,\"skipReason\":null},\"testCount\":5},\"type\":\"group\",\"time\":905}\n",
            "{\"test\":{\"id\":3,\"name\":\"(setUpAll)\",\"suiteID\":0,\"groupIDs\":[2],\"metadata\":{\"skip\":false,\"skipReason\":null}},\"type\":\"testStart\",\"time\":906}\n",
            "{\"testID\":3,\"message\":\"sa2\",\"type\":\"print\",\"time\":910}\n",
            "{\"testID\":3,\"error\":\"oops\",\"stackTrace\":\"test/next_test.dart 5:3  main.<fn>\\n\",\"isFailure\":false,\"type\":\"error\",\"time\":920}\n",
            "{\"testID\":3,\"result\":\"error\",\"hidden\":false,\"type\":\"testDone\",\"time\":921}\n",
            "{\"success\":false,\"type\":\"done\",\"time\":930}\n",
        ]);
        assert_eq!(
            render(&signals),
            vec![
                "attached",
                "count 5",
                "suite started next_test.dart",
                "start (setUpAll)",
                "fail (setUpAll) false",
                "print (setUpAll) test/next_test.dart 5:3  main.<fn>\n",
                "suite finished next_test.dart",
                "done false",
            ]
        );
    }

    #[test]
    fn test_sample_run_across_suites() {
        let signals = convert(&[
            "{\"suite\":{\"id\":0,\"platform\":\"vm\",\"path\":\"test/async/countdown_timer_test.dart\"},\"type\":\"suite\",\"time\":10}\n",
            "{\"suite\":{\"id\":4,\"platform\":\"vm\",\"path\":\"test/collection/collect_test.dart\"},\"type\":\"suite\",\"time\":11}\n",
            "{\"group\":{\"id\":16,\"suiteID\":0,\"parentID\":null,\"name\":null,\"metadata\":{\"skip\":false,\"skipReason\":null},\"testCount\":1,\"line\":null,\"column\":null,\"url\":null},\"type\":\"group\",\"time\":730}\n",
            "{\"group\":{\"id\":17,\"suiteID\":0,\"parentID\":16,\"name\":\"CountdownTimer\",\"metadata\":{\"skip\":false,\"skipReason\":null},\"testCount\":1,\"line\":21,\"column\":3,\"url\":\"file:///quiver/test/async/countdown_timer_test.dart\"},\"type\":\"group\",\"time\":731}\n",
            "{\"test\":{\"id\":18,\"name\":\"CountdownTimer should countdown\",\"suiteID\":0,\"groupIDs\":[16,17],\"metadata\":{\"skip\":false,\"skipReason\":null},\"line\":22,\"column\":5,\"url\":\"file:///quiver/test/async/countdown_timer_test.dart\"},\"type\":\"testStart\",\"time\":732}\n",
            "{\"group\":{\"id\":19,\"suiteID\":4,\"parentID\":null,\"name\":null,\"metadata\":{\"skip\":false,\"skipReason\":null},\"testCount\":2},\"type\":\"group\",\"time\":740}\n",
            "{\"group\":{\"id\":20,\"suiteID\":4,\"parentID\":19,\"name\":\"collect\",\"metadata\":{\"skip\":false,\"skipReason\":null},\"testCount\":2},\"type\":\"group\",\"time\":741}\n",
            "{\"test\":{\"id\":21,\"name\":\"collect should produce no events for no futures\",\"suiteID\":4,\"groupIDs\":[19,20],\"metadata\":{\"skip\":false,\"skipReason\":null}},\"type\":\"testStart\",\"time\":742}\n",
            "{\"testID\":21,\"result\":\"success\",\"hidden\":false,\"type\":\"testDone\",\"time\":760}\n",
            "{\"testID\":18,\"result\":\"success\",\"hidden\":false,\"type\":\"testDone\",\"time\":773}\n",
            "{\"test\":{\"id\":30,\"name\":\"collect should produce events for future completions\",\"suiteID\":4,\"groupIDs\":[19,20],\"metadata\":{\"skip\":false,\"skipReason\":null}},\"type\":\"testStart\",\"time\":774}\n",
            "{\"success\":true,\"type\":\"done\",\"time\":800}\n",
        ]);
        assert_eq!(
            render(&signals),
            vec![
                "attached",
                "count 1",
                "suite started countdown_timer_test.dart",
                "suite started CountdownTimer",
                "start should countdown",
                "count 2",
                "suite started collect_test.dart",
                "suite started collect",
                "start should produce no events for no futures",
                "pass should produce no events for no futures",
                "pass should countdown",
                "suite finished CountdownTimer",
                "suite finished countdown_timer_test.dart",
                "start should produce events for future completions",
                "suite finished collect",
                "suite finished collect_test.dart",
                "done true",
            ]
        );
        let started = signals.iter().find_map(|signal| match signal {
            Signal::TestStarted(started) if started.id == 18 => Some(started),
            _ => None,
        });
        let started = started.expect("test 18 started");
        assert_eq!(started.parent_id, Some(17));
        assert_eq!(started.node_args.as_deref(), Some("22,5"));
        let passed = signals.iter().find_map(|signal| match signal {
            Signal::TestFinished(finished) if finished.id == 18 => finished.duration_ms,
            _ => None,
        });
        assert_eq!(passed, Some(41));
    }

    #[test]
    fn test_compact_start_and_pass() {
        let signals = convert(&[
            "{\"type\":\"start\",\"name\":\"loading test/formatter_test.dart\"}\n",
            "{\"type\":\"pass\",\"name\":\"loading test/formatter_test.dart\"}\n",
        ]);
        assert_eq!(
            render(&signals),
            vec![
                "attached",
                "start loading test/formatter_test.dart",
                "pass loading test/formatter_test.dart",
            ]
        );
    }

    #[test]
    fn test_compact_fail_carries_message_and_stack() {
        let signals = convert(&[
            "{\"type\":\"start\",\"name\":\"line endings fails once\"}\n",
            "{\"type\":\"fail\",\"name\":\"line endings fails once\",\"failMessage\":\"Expected: 'a'\\n  Actual: 'b'\",\"stackTrace\":\"package:test  expect\"}\n",
        ]);
        let failed = failures(&signals);
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].name, "line endings fails once");
        assert_eq!(failed[0].message, "Comparison failed");
        assert_eq!(failed[0].expected.as_deref(), Some("'a'"));
        assert_eq!(failed[0].actual.as_deref(), Some("'b'"));
        assert_eq!(failed[0].stack_trace.as_deref(), Some("package:test  expect"));
    }

    #[test]
    fn test_legacy_output_matches_compact_json() {
        let mut converter = EventsConverter::new(Vec::<Signal>::new());
        for chunk in &[
            "\u{1b}[32m+1\u{1b}[0m",
            ": line endings fails once\n",
            "\u{1b}[32m+1\u{1b}[0m \u{1b}[31m-1\u{1b}[0m: line endings fails once [E]\n",
            "  Expected: 'a'\n    Actual: 'b'\n",
            "  package:test  expect\n",
            "\u{1b}[32m+1\u{1b}[0m \u{1b}[31m-1\u{1b}[0m: Some tests failed.\n",
        ] {
            converter.process_text(chunk, OutputKind::Stdout);
        }
        assert_eq!(converter.protocol(), Protocol::Legacy);
        let legacy = converter.into_signaller();

        let mut json = convert(&[
            "{\"type\":\"start\",\"name\":\"line endings fails once\"}\n",
            "{\"type\":\"fail\",\"name\":\"line endings fails once\",\"failMessage\":\"Expected: 'a'\\n  Actual: 'b'\",\"stackTrace\":\"package:test  expect\"}\n",
        ]);
        json.push(Signal::SessionFinished { success: Some(false) });

        assert_eq!(render(&legacy), render(&json));
        assert_eq!(failures(&legacy)[0].expected, failures(&json)[0].expected);
        assert_eq!(failures(&legacy)[0].stack_trace, failures(&json)[0].stack_trace);
    }

    #[test]
    fn test_huge_legacy_stamps_do_not_overflow() {
        let signals = convert(&["99999999999999999:00 +0: a\n", "99999999999999999:01 +1: b\n"]);
        assert_eq!(render(&signals), vec!["attached", "start a", "pass a", "start b"]);
        let passed = signals.iter().find_map(|signal| match signal {
            Signal::TestFinished(finished) => Some(finished.duration_ms),
            _ => None,
        });
        assert_eq!(passed, Some(Some(0)));
    }

    #[test]
    fn test_malformed_lines_produce_no_signals() {
        let signals = convert(&[
            "{\"testID\":9,\"error\":\"Expected: <false>\n",
            "{\"type\":\"allSuites\",\"count\":1}{\"type\":\"allSuites\",\"count\":1}\n",
            "{\"type\":\"testDone\",\"testID\":77,\"result\":\"success\"}\n",
            "\u{0}\u{1}garbage\n",
        ]);
        assert_eq!(render(&signals), vec!["attached"]);
    }

    #[test]
    fn test_replay_is_deterministic() {
        assert_eq!(convert(GROUPS_DONE), convert(GROUPS_DONE));
    }

    #[test]
    fn test_chunks_split_anywhere() {
        let whole: String = GROUPS_DONE.concat();
        let mut converter = EventsConverter::new(Vec::<Signal>::new());
        for chunk in whole.as_bytes().chunks(7) {
            converter.process(chunk, OutputKind::Stdout);
        }
        assert_eq!(converter.into_signaller(), convert(GROUPS_DONE));
    }

    #[test]
    fn test_input_after_finish_is_ignored() {
        let mut converter = EventsConverter::new(Vec::<Signal>::new());
        converter.process_text("{\"type\":\"start\",\"name\":\"a\"}", OutputKind::Stdout);
        converter.finish();
        converter.process_text("{\"type\":\"pass\",\"name\":\"a\"}\n", OutputKind::Stdout);
        assert_eq!(render(converter.signaller()), vec!["attached", "start a"]);
    }
}
