//! Message history and live-filtered view.
//!
//! [`MessagesModel`] ingests the bidirectional protocol message stream,
//! suppresses noise, and maintains two collections: the authoritative
//! unfiltered history and a filtered view derived from the active
//! [`MessageFilter`]. Ingestion (`process`) is the high-frequency path;
//! re-filtering is user-triggered and recomputes the view from scratch so
//! it is always fully consistent with the most recent criterion.
//!
//! `process`, `re_filter`, and `clear` serialize on one internal mutex.
//! Readers receive cloned snapshots and never hold the lock across their
//! own work, so they cannot stall ingestion.

use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use sdrlink_core::{MessageFilter, Result};

use crate::message::{Direction, TcpMessage};

/// Reply status code meaning "no error".
const NO_ERROR: &str = "0";

/// Default marker identifying keep-alive messages.
const PING_MARKER: &str = "ping";

struct Inner {
    messages: Vec<TcpMessage>,
    filtered: Vec<TcpMessage>,
    filter: MessageFilter,
    filter_text: String,
    show_pings: bool,
    ping_marker: String,
}

/// The authoritative message history and its live-filtered view.
pub struct MessagesModel {
    inner: Mutex<Inner>,
    start: Mutex<Instant>,
}

impl Default for MessagesModel {
    fn default() -> Self {
        Self::new()
    }
}

impl MessagesModel {
    /// Create an empty model with the `All` filter active.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                messages: Vec::new(),
                filtered: Vec::new(),
                filter: MessageFilter::All,
                filter_text: String::new(),
                show_pings: false,
                ping_marker: PING_MARKER.to_string(),
            }),
            start: Mutex::new(Instant::now()),
        }
    }

    /// Reset the session start time; subsequent messages are stamped
    /// relative to now. Called at the top of every connect cycle.
    pub fn reset_start_time(&self) {
        let mut start = self.start.lock().unwrap();
        *start = Instant::now();
    }

    /// Stamp a line with the current session offset and process it.
    pub fn record(&self, direction: Direction, text: &str) {
        let interval = self.start.lock().unwrap().elapsed().as_secs_f64();
        self.process(TcpMessage::new(direction, text, interval));
    }

    /// Classify one message: apply the noise rules, append to the
    /// history, and append to the filtered view when the active
    /// criterion matches.
    pub fn process(&self, msg: TcpMessage) {
        let mut inner = self.inner.lock().unwrap();

        // Acknowledgement-only replies add no diagnostic value.
        if msg.direction == Direction::Received && is_routine_reply(&msg.text) {
            return;
        }
        // Sent keep-alives are dropped unless the user asked for them.
        if msg.direction == Direction::Sent
            && !inner.show_pings
            && msg.text.contains(&inner.ping_marker)
        {
            return;
        }

        if inner.filter.matches(&inner.filter_text, &msg.text) {
            inner.filtered.push(msg.clone());
        }
        inner.messages.push(msg);
    }

    /// Replace the active criterion and rebuild the filtered view from
    /// the full history.
    ///
    /// The rebuild is deterministic and side-effect-free: calling this
    /// twice with the same criterion yields the same view as calling it
    /// once.
    pub fn re_filter(&self, filter: MessageFilter, filter_text: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.filter = filter;
        inner.filter_text = filter_text.to_string();
        inner.filtered = inner
            .messages
            .iter()
            .filter(|m| filter.matches(filter_text, &m.text))
            .cloned()
            .collect();
        tracing::debug!(
            filter = ?filter,
            filter_text = filter_text,
            retained = inner.filtered.len(),
            total = inner.messages.len(),
            "Re-filtered message history"
        );
    }

    /// Empty both the history and the filtered view.
    ///
    /// Atomic from the perspective of any reader: a snapshot taken after
    /// this call sees neither collection partially cleared.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.messages.clear();
        inner.filtered.clear();
    }

    /// Retain or suppress sent keep-alive messages from now on.
    pub fn set_show_pings(&self, show: bool) {
        self.inner.lock().unwrap().show_pings = show;
    }

    /// Change the substring that identifies keep-alive messages.
    pub fn set_ping_marker(&self, marker: &str) {
        self.inner.lock().unwrap().ping_marker = marker.to_string();
    }

    /// Snapshot of the filtered view, oldest first.
    pub fn filtered(&self) -> Vec<TcpMessage> {
        self.inner.lock().unwrap().filtered.clone()
    }

    /// Snapshot of the unfiltered history, oldest first.
    pub fn history(&self) -> Vec<TcpMessage> {
        self.inner.lock().unwrap().messages.clone()
    }

    /// Serialize the current filtered view to a file, oldest first, one
    /// message per line as `" * <seconds> <text>"` with a six-digit
    /// fractional seconds field.
    pub fn save(&self, path: &Path) -> Result<()> {
        let lines: Vec<String> = self
            .filtered()
            .iter()
            .map(|m| format!(" * {:.6} {}", m.interval, m.text))
            .collect();
        std::fs::write(path, lines.join("\n"))?;
        Ok(())
    }
}

/// A reply carrying a "no error" status and no supplementary payload.
///
/// These are acknowledgements of commands that succeeded; they are
/// dropped before reaching the history.
fn is_routine_reply(text: &str) -> bool {
    if !text.starts_with('R') {
        return false;
    }
    let parts: Vec<&str> = text.split('|').collect();
    if parts.len() < 3 {
        return false;
    }
    if parts[1] != NO_ERROR {
        return false;
    }
    parts[2].is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn received(text: &str, interval: f64) -> TcpMessage {
        TcpMessage::new(Direction::Received, text, interval)
    }

    fn sent(text: &str, interval: f64) -> TcpMessage {
        TcpMessage::new(Direction::Sent, text, interval)
    }

    #[test]
    fn routine_reply_detection() {
        assert!(is_routine_reply("R1|0|"));
        assert!(!is_routine_reply("R1|0|somevalue"));
        assert!(!is_routine_reply("R1|5|"));
        assert!(!is_routine_reply("R1|0"));
        assert!(!is_routine_reply("S0|freq=14000000"));
    }

    #[test]
    fn noise_rule_drops_ack_only_replies() {
        let model = MessagesModel::new();
        model.process(received("R1|0|", 0.1));
        model.process(received("R1|0|somevalue", 0.2));
        model.process(received("R1|5|", 0.3));

        let history = model.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].text, "R1|0|somevalue");
        assert_eq!(history[1].text, "R1|5|");
    }

    #[test]
    fn noise_rule_applies_only_to_received() {
        // A sent line with the routine-reply shape is retained.
        let model = MessagesModel::new();
        model.process(sent("R1|0|", 0.1));
        assert_eq!(model.history().len(), 1);
    }

    #[test]
    fn sent_pings_suppressed_by_default() {
        let model = MessagesModel::new();
        model.process(sent("C3|ping", 0.1));
        assert!(model.history().is_empty());

        model.set_show_pings(true);
        model.process(sent("C4|ping", 0.2));
        assert_eq!(model.history().len(), 1);
    }

    #[test]
    fn received_pings_are_retained() {
        let model = MessagesModel::new();
        model.process(received("S0|ping status", 0.1));
        assert_eq!(model.history().len(), 1);
    }

    #[test]
    fn process_with_no_criterion_equals_all() {
        let model = MessagesModel::new();
        model.process(received("S0|freq=14000000", 0.1));
        model.process(sent("C1|info", 0.2));
        model.process(received("R1|0|version=3.5", 0.3));

        // Before any criterion is set, the filtered view IS the history.
        assert_eq!(model.filtered(), model.history());
    }

    #[test]
    fn process_appends_to_filtered_only_on_match() {
        let model = MessagesModel::new();
        model.re_filter(MessageFilter::Command, "");
        model.process(sent("C1|info", 0.1));
        model.process(received("S0|freq=14000000", 0.2));

        assert_eq!(model.history().len(), 2);
        let filtered = model.filtered();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].text, "C1|info");
    }

    #[test]
    fn re_filter_rebuilds_from_full_history() {
        let model = MessagesModel::new();
        model.process(sent("C1|slice tune 0 14.250000", 0.1));
        model.process(received("S0|freq=14000000", 0.2));
        model.process(received("SABCD1234|slice 0 mode=USB", 0.3));
        model.process(received("R1|5|", 0.4));

        model.re_filter(MessageFilter::S0, "");
        assert_eq!(model.filtered().len(), 1);

        model.re_filter(MessageFilter::Status, "");
        assert_eq!(model.filtered().len(), 1);
        assert_eq!(model.filtered()[0].text, "SABCD1234|slice 0 mode=USB");

        model.re_filter(MessageFilter::All, "");
        assert_eq!(model.filtered().len(), 4);
    }

    #[test]
    fn re_filter_is_idempotent() {
        let model = MessagesModel::new();
        model.process(sent("C1|info", 0.1));
        model.process(received("S0|freq=14000000", 0.2));

        model.re_filter(MessageFilter::Prefix, "freq");
        let once = model.filtered();
        model.re_filter(MessageFilter::Prefix, "freq");
        let twice = model.filtered();
        assert_eq!(once, twice);
        assert_eq!(once.len(), 1);
        assert_eq!(once[0].text, "S0|freq=14000000");
    }

    #[test]
    fn prefix_filter_anchors_on_separator() {
        let model = MessagesModel::new();
        model.process(received("S0|freq=14000000", 0.1));
        model.process(received("S0|mode=USB", 0.2));

        model.re_filter(MessageFilter::Prefix, "freq");
        let filtered = model.filtered();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].text, "S0|freq=14000000");
    }

    #[test]
    fn clear_empties_both_collections() {
        let model = MessagesModel::new();
        model.process(sent("C1|info", 0.1));
        model.process(received("S0|freq=14000000", 0.2));
        assert!(!model.history().is_empty());

        model.clear();
        assert!(model.history().is_empty());
        assert!(model.filtered().is_empty());
    }

    #[test]
    fn record_stamps_monotonic_intervals() {
        let model = MessagesModel::new();
        model.reset_start_time();
        model.record(Direction::Received, "S0|first");
        model.record(Direction::Received, "S0|second");

        let history = model.history();
        assert_eq!(history.len(), 2);
        assert!(history[0].interval <= history[1].interval);
    }

    #[test]
    fn save_formats_six_fraction_digits_oldest_first() {
        let model = MessagesModel::new();
        model.process(sent("C1|freq", 0.000_1));
        // Ack-only reply: dropped by the noise rule, never reaches the view.
        model.process(received("R1|0|", 0.000_25));

        let path = std::env::temp_dir().join("sdrlink-messages-save-test.txt");
        model.save(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, " * 0.000100 C1|freq");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn save_multiple_lines_chronological() {
        let model = MessagesModel::new();
        model.process(sent("C1|info", 0.5));
        model.process(received("S0|freq=14000000", 1.25));

        let path = std::env::temp_dir().join("sdrlink-messages-save-multi.txt");
        model.save(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            " * 0.500000 C1|info\n * 1.250000 S0|freq=14000000"
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn process_concurrent_with_re_filter() {
        use std::sync::Arc;

        let model = Arc::new(MessagesModel::new());
        let writer = {
            let model = Arc::clone(&model);
            std::thread::spawn(move || {
                for i in 0..500 {
                    model.process(TcpMessage::new(
                        Direction::Received,
                        format!("S0|seq={i}"),
                        i as f64,
                    ));
                }
            })
        };
        let filterer = {
            let model = Arc::clone(&model);
            std::thread::spawn(move || {
                for _ in 0..50 {
                    model.re_filter(MessageFilter::S0, "");
                    model.re_filter(MessageFilter::All, "");
                }
            })
        };
        writer.join().unwrap();
        filterer.join().unwrap();

        // Final re-filter: view must be consistent with the criterion.
        model.re_filter(MessageFilter::All, "");
        assert_eq!(model.filtered().len(), 500);
        assert_eq!(model.history().len(), 500);
    }
}
