use crate::scrape::Item;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Destination for scraped items.
///
/// Sinks receive items from multiple concurrent dispatch calls in no
/// particular order and must be safe to share across workers.
pub trait ItemSink: Send + Sync {
    /// Accepts one item produced by `scraper`.
    fn accept(&self, scraper: &str, item: Item);
}

/// Collects items in memory. Useful for tests and small one-shot crawls.
#[derive(Default)]
pub struct MemorySink {
    items: Mutex<Vec<(String, Item)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains and returns everything collected so far.
    pub fn take(&self) -> Vec<(String, Item)> {
        std::mem::take(&mut *self.items.lock().unwrap())
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().unwrap().is_empty()
    }
}

impl ItemSink for MemorySink {
    fn accept(&self, scraper: &str, item: Item) {
        self.items.lock().unwrap().push((scraper.to_string(), item));
    }
}

/// Discards every item. The default for crawls run purely for link mapping.
pub struct NullSink;

impl ItemSink for NullSink {
    fn accept(&self, _scraper: &str, _item: Item) {}
}

/// Appends items to a file as JSON lines, one object per item:
/// `{"scraper": "...", "item": ...}`.
pub struct JsonLinesSink {
    file: Mutex<File>,
}

impl JsonLinesSink {
    pub fn create(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl ItemSink for JsonLinesSink {
    fn accept(&self, scraper: &str, item: Item) {
        let line = serde_json::json!({ "scraper": scraper, "item": item });
        let mut file = self.file.lock().unwrap();
        if let Err(e) = writeln!(file, "{}", line) {
            tracing::error!("Failed to write item from `{}`: {}", scraper, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_sink_collects() {
        let sink = MemorySink::new();
        sink.accept("a", json!({"x": 1}));
        sink.accept("b", json!({"y": 2}));
        assert_eq!(sink.len(), 2);

        let items = sink.take();
        assert_eq!(items[0].0, "a");
        assert_eq!(items[1].1, json!({"y": 2}));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_null_sink_discards() {
        let sink = NullSink;
        sink.accept("a", json!(1));
    }

    #[test]
    fn test_json_lines_sink_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.jsonl");

        let sink = JsonLinesSink::create(&path).unwrap();
        sink.accept("news", json!({"title": "hello"}));
        sink.accept("news", json!({"title": "world"}));
        drop(sink);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["scraper"], "news");
        assert_eq!(first["item"]["title"], "hello");
    }

    #[test]
    fn test_memory_sink_concurrent_accept() {
        use std::sync::Arc;
        let sink = Arc::new(MemorySink::new());
        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let sink = Arc::clone(&sink);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        sink.accept("w", json!({"worker": worker, "i": i}));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(sink.len(), 400);
    }
}
