//! Logger behavior under producer contention.

use std::sync::Arc;
use std::thread;

use touchline::AsyncLogger;

#[test]
fn ten_contending_producers_lose_no_lines() {
    let dir = tempfile::tempdir().unwrap();
    let logger = Arc::new(AsyncLogger::new(dir.path()));

    let mut producers = Vec::new();
    for producer in 0..10u32 {
        let logger = Arc::clone(&logger);
        producers.push(thread::spawn(move || {
            for line in 0..1_000u32 {
                match line % 3 {
                    0 => logger.info(format!("p{producer} line {line}")),
                    1 => logger.warn(format!("p{producer} line {line}")),
                    _ => logger.error(format!("p{producer} line {line}")),
                }
            }
        }));
    }
    for producer in producers {
        producer.join().unwrap();
    }

    // Dropping the logger drains the queue and joins the writer.
    drop(logger);

    let mut files: Vec<_> =
        std::fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap().path()).collect();
    assert_eq!(files.len(), 1, "one run, one log file");
    let content = std::fs::read_to_string(files.pop().unwrap()).unwrap();
    let lines: Vec<&str> = content.lines().collect();

    assert_eq!(lines.len(), 10_000);
    for line in &lines {
        // "[YYYY-MM-DD HH:MM:SS] " then a known severity prefix.
        let (stamp, rest) = line.split_at(22);
        assert!(stamp.starts_with('[') && stamp.ends_with("] "), "bad stamp in {line:?}");
        assert!(
            rest.starts_with("[INFO]  ")
                || rest.starts_with("[WARN]  ")
                || rest.starts_with("[ERROR] "),
            "bad severity in {line:?}"
        );
    }

    // Each producer's lines appear in its own program order.
    for producer in 0..10u32 {
        let marker = format!("p{producer} line ");
        let mut expected = 0u32;
        for line in &lines {
            if let Some(at) = line.find(&marker) {
                let number: u32 = line[at + marker.len()..].parse().unwrap();
                assert_eq!(number, expected, "producer {producer} lines out of order");
                expected += 1;
            }
        }
        assert_eq!(expected, 1_000);
    }
}
