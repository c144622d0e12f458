//! Property-based tests for queue grouping and ordering
//!
//! Random push sequences over a small pool of files and items are checked against the order a
//! reader of the queue expects: first-seen order for groups, push order within a group.

use jsdoctest_core::{QueueVisitor, TestCase, TestQueue};
use proptest::prelude::*;

const FILES: [&str; 3] = ["a.js", "b.js", "lib/c.js"];
const ITEMS: [&str; 3] = ["foo", "bar", "Baz#qux"];

/// (file index, item index, line)
fn pushes_strategy() -> impl Strategy<Value = Vec<(usize, usize, u32)>> {
    prop::collection::vec((0..FILES.len(), 0..ITEMS.len(), 1u32..500), 0..40)
}

fn build(pushes: &[(usize, usize, u32)]) -> TestQueue {
    let mut queue = TestQueue::new();
    for (n, &(f, i, line)) in pushes.iter().enumerate() {
        let test = TestCase::builder(FILES[f], ITEMS[i], line, format!("// {n}")).build().unwrap();
        queue.push(test);
    }
    queue
}

#[derive(Default)]
struct Recorder {
    files: Vec<String>,
    items: Vec<(String, String, u32)>,
    tests: Vec<(String, usize)>,
}

impl QueueVisitor for Recorder {
    type Error = ();

    fn on_file(&mut self, file: &str) -> Result<(), ()> {
        self.files.push(file.to_string());
        Ok(())
    }

    fn on_item(&mut self, item: &str, line: u32, file: &str) -> Result<(), ()> {
        self.items.push((file.to_string(), item.to_string(), line));
        Ok(())
    }

    fn on_test(&mut self, test: &TestCase, index: usize) -> Result<(), ()> {
        self.tests.push((test.code().to_string(), index));
        Ok(())
    }
}

fn first_seen<T: PartialEq + Clone>(values: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = Vec::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

proptest! {
    /// Property: every pushed test is visited exactly once
    #[test]
    fn every_test_is_visited_once(pushes in pushes_strategy()) {
        let queue = build(&pushes);
        let mut recorder = Recorder::default();
        queue.visit(&mut recorder).unwrap();

        prop_assert_eq!(queue.len(), pushes.len());
        prop_assert_eq!(recorder.tests.len(), pushes.len());
        let mut codes: Vec<_> = recorder.tests.iter().map(|(code, _)| code.clone()).collect();
        codes.sort();
        codes.dedup();
        prop_assert_eq!(codes.len(), pushes.len());
    }

    /// Property: files are visited in first-seen order
    #[test]
    fn files_follow_first_seen_order(pushes in pushes_strategy()) {
        let queue = build(&pushes);
        let mut recorder = Recorder::default();
        queue.visit(&mut recorder).unwrap();

        let expected: Vec<String> = first_seen(pushes.iter().map(|&(f, _, _)| FILES[f].to_string()));
        prop_assert_eq!(recorder.files, expected);
    }

    /// Property: an item group carries the line of its first pushed test
    #[test]
    fn item_line_is_first_pushed_line(pushes in pushes_strategy()) {
        let queue = build(&pushes);
        let mut recorder = Recorder::default();
        queue.visit(&mut recorder).unwrap();

        for (file, item, line) in &recorder.items {
            let first = pushes
                .iter()
                .find(|&&(f, i, _)| FILES[f] == file && ITEMS[i] == item)
                .map(|&(_, _, line)| line);
            prop_assert_eq!(Some(*line), first);
        }
    }

    /// Property: within a group, tests keep push order and indices count from zero
    #[test]
    fn tests_keep_push_order_within_group(pushes in pushes_strategy()) {
        let queue = build(&pushes);

        for (f, file) in FILES.iter().enumerate() {
            for (i, item) in ITEMS.iter().enumerate() {
                let expected: Vec<String> = pushes
                    .iter()
                    .enumerate()
                    .filter(|&(_, &(pf, pi, _))| pf == f && pi == i)
                    .map(|(n, _)| format!("// {n}"))
                    .collect();
                let actual: Vec<String> = queue
                    .group(file, item)
                    .map(|group| group.tests.iter().map(|t| t.code().to_string()).collect())
                    .unwrap_or_default();
                prop_assert_eq!(actual, expected);
            }
        }

        let mut recorder = Recorder::default();
        queue.visit(&mut recorder).unwrap();
        let mut expected_index = 0;
        let mut previous = None;
        for (code, index) in &recorder.tests {
            let n: usize = code.trim_start_matches("// ").parse().unwrap();
            let (f, i, _) = pushes[n];
            if previous != Some((f, i)) {
                expected_index = 0;
            }
            prop_assert_eq!(*index, expected_index);
            expected_index += 1;
            previous = Some((f, i));
        }
    }
}
