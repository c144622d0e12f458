//! Grouped, ordered queue of test cases.
//!
//! Tests are grouped by file, then by documented item. Groups keep the order in which their keys
//! were first seen, tests keep push order, and an item group remembers the line of its first test.

use std::convert::Infallible;

use indexmap::IndexMap;

use crate::case::TestCase;

/// All tests attached to one documented item
#[derive(Debug, Clone)]
pub struct ItemGroup {
    /// Line of the first test pushed into this group
    pub line: u32,
    pub tests: Vec<TestCase>,
}

/// Visitor driven by [`TestQueue::visit`].
///
/// The first error returned by a callback stops the traversal and is handed back to the caller.
pub trait QueueVisitor {
    type Error;

    /// Called once per file, before any of its items
    fn on_file(&mut self, file: &str) -> Result<(), Self::Error>;

    /// Called once per item group, before any of its tests
    fn on_item(&mut self, item: &str, line: u32, file: &str) -> Result<(), Self::Error>;

    /// Called once per test; `index` is the position within the item group
    fn on_test(&mut self, test: &TestCase, index: usize) -> Result<(), Self::Error>;
}

/// Ordered collection of every test found during extraction
#[derive(Debug, Default)]
pub struct TestQueue {
    files: IndexMap<String, IndexMap<String, ItemGroup>>,
    len: usize,
}

impl TestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a test into its `(file, item)` group, creating the group on first sight.
    pub fn push(&mut self, test: TestCase) -> &mut Self {
        tracing::debug!(file = test.file(), item = test.item(), line = test.line(), "queued sample");

        let items = self.files.entry(test.file().to_string()).or_default();
        let group = items.entry(test.item().to_string()).or_insert_with(|| ItemGroup {
            line: test.line(),
            tests: Vec::new(),
        });
        group.tests.push(test);
        self.len += 1;
        self
    }

    /// Walk files, items and tests in insertion order.
    pub fn run<F, I, T>(&self, on_file: F, on_item: I, on_test: T)
    where
        F: FnMut(&str),
        I: FnMut(&str, u32, &str),
        T: FnMut(&TestCase, usize),
    {
        let mut visitor = Callbacks {
            on_file,
            on_item,
            on_test,
        };
        let Ok(()) = self.visit(&mut visitor);
    }

    /// Same traversal as [`TestQueue::run`], with fallible callbacks.
    pub fn visit<V: QueueVisitor>(&self, visitor: &mut V) -> Result<(), V::Error> {
        for (file, items) in &self.files {
            visitor.on_file(file)?;

            for (item, group) in items {
                visitor.on_item(item, group.line, file)?;

                for (index, test) in group.tests.iter().enumerate() {
                    visitor.on_test(test, index)?;
                }
            }
        }
        Ok(())
    }

    /// Number of tests in the queue
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct files
    pub fn files(&self) -> usize {
        self.files.len()
    }

    /// Look up an item group
    pub fn group(&self, file: &str, item: &str) -> Option<&ItemGroup> {
        self.files.get(file)?.get(item)
    }
}

struct Callbacks<F, I, T> {
    on_file: F,
    on_item: I,
    on_test: T,
}

impl<F, I, T> QueueVisitor for Callbacks<F, I, T>
where
    F: FnMut(&str),
    I: FnMut(&str, u32, &str),
    T: FnMut(&TestCase, usize),
{
    type Error = Infallible;

    fn on_file(&mut self, file: &str) -> Result<(), Infallible> {
        (self.on_file)(file);
        Ok(())
    }

    fn on_item(&mut self, item: &str, line: u32, file: &str) -> Result<(), Infallible> {
        (self.on_item)(item, line, file);
        Ok(())
    }

    fn on_test(&mut self, test: &TestCase, index: usize) -> Result<(), Infallible> {
        (self.on_test)(test, index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(file: &str, item: &str, line: u32, code: &str) -> TestCase {
        TestCase::builder(file, item, line, code).build().unwrap()
    }

    fn trace(queue: &TestQueue) -> Vec<String> {
        let events = std::cell::RefCell::new(Vec::new());
        queue.run(
            |file| events.borrow_mut().push(format!("file {file}")),
            |item, line, file| events.borrow_mut().push(format!("item {item} {file}:{line}")),
            |test, index| events.borrow_mut().push(format!("test #{index} {}", test.code())),
        );
        events.into_inner()
    }

    #[test]
    fn test_push_returns_queue_for_chaining() {
        let mut queue = TestQueue::new();
        queue
            .push(case("a.js", "foo", 1, "1"))
            .push(case("a.js", "foo", 2, "2"));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.files(), 1);
    }

    #[test]
    fn test_run_visits_in_insertion_order() {
        let mut queue = TestQueue::new();
        queue
            .push(case("b.js", "x", 10, "b1"))
            .push(case("a.js", "foo", 3, "a1"))
            .push(case("b.js", "y", 20, "b2"))
            .push(case("a.js", "foo", 7, "a2"))
            .push(case("b.js", "x", 11, "b3"));

        assert_eq!(
            trace(&queue),
            vec![
                "file b.js",
                "item x b.js:10",
                "test #0 b1",
                "test #1 b3",
                "item y b.js:20",
                "test #0 b2",
                "file a.js",
                "item foo a.js:3",
                "test #0 a1",
                "test #1 a2",
            ]
        );
    }

    #[test]
    fn test_group_keeps_first_line() {
        let mut queue = TestQueue::new();
        queue
            .push(case("a.js", "foo", 42, "first"))
            .push(case("a.js", "foo", 7, "second"));
        let group = queue.group("a.js", "foo").unwrap();
        assert_eq!(group.line, 42);
        assert_eq!(group.tests.len(), 2);
    }

    #[test]
    fn test_same_item_in_different_files_is_separate() {
        let mut queue = TestQueue::new();
        queue
            .push(case("a.js", "foo", 1, "a"))
            .push(case("b.js", "foo", 2, "b"));
        assert_eq!(queue.group("a.js", "foo").unwrap().tests.len(), 1);
        assert_eq!(queue.group("b.js", "foo").unwrap().tests.len(), 1);
    }

    #[test]
    fn test_empty_queue_runs_nothing() {
        let queue = TestQueue::new();
        assert!(queue.is_empty());
        assert!(trace(&queue).is_empty());
    }

    struct StopAtSecondTest {
        seen: usize,
    }

    impl QueueVisitor for StopAtSecondTest {
        type Error = String;

        fn on_file(&mut self, _file: &str) -> Result<(), String> {
            Ok(())
        }

        fn on_item(&mut self, _item: &str, _line: u32, _file: &str) -> Result<(), String> {
            Ok(())
        }

        fn on_test(&mut self, test: &TestCase, _index: usize) -> Result<(), String> {
            self.seen += 1;
            if self.seen == 2 {
                return Err(format!("stopped at {}", test.code()));
            }
            Ok(())
        }
    }

    #[test]
    fn test_visit_propagates_callback_error() {
        let mut queue = TestQueue::new();
        queue
            .push(case("a.js", "foo", 1, "one"))
            .push(case("a.js", "foo", 2, "two"))
            .push(case("a.js", "foo", 3, "three"));

        let mut visitor = StopAtSecondTest { seen: 0 };
        let err = queue.visit(&mut visitor).unwrap_err();
        assert_eq!(err, "stopped at two");
        assert_eq!(visitor.seen, 2);
    }
}
