// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Integration tests for the log engine public API.

use super::tests::SlowSink;
use mintboy::logging::{
    Level, LogError, LoggerConfig, LoggerRegistry, MemorySink, StreamSink, WorkerState,
};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_file_sinks_per_logger() {
    let dir = tempfile::tempdir().unwrap();
    let registry = LoggerRegistry::new();

    for (name, level) in [("cpu", Level::Debug), ("ppu", Level::Warn)] {
        let sink = StreamSink::file(dir.path().join(format!("{}.log", name))).unwrap();
        let config = LoggerConfig {
            level,
            line_prefix: format!("<{}>", name),
            ..Default::default()
        };
        registry
            .create_logger(name, Some(config), Some(Box::new(sink)))
            .unwrap();
    }

    registry.log("cpu", Level::Debug, "fetch 0x100");
    registry.log("ppu", Level::Info, "mode 2");
    registry.log("ppu", Level::Error, "OAM corrupted");
    registry.delete_loggers();

    let cpu = std::fs::read_to_string(dir.path().join("cpu.log")).unwrap();
    let ppu = std::fs::read_to_string(dir.path().join("ppu.log")).unwrap();

    assert!(cpu.starts_with("<cpu>["));
    assert!(cpu.ends_with("] DEBUG fetch 0x100\n"));
    assert_eq!(ppu.lines().count(), 1);
    assert!(ppu.contains("ERROR OAM corrupted"));
}

#[test]
fn test_backpressure_loses_nothing() {
    let registry = Arc::new(LoggerRegistry::new());
    let sink = SlowSink::new(Duration::from_micros(200));
    let config = LoggerConfig {
        queue_capacity: 1,
        ..Default::default()
    };
    registry
        .create_logger("bus", Some(config), Some(Box::new(sink.clone())))
        .unwrap();

    let producers: Vec<_> = (0..3)
        .map(|p| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for i in 0..30 {
                    registry
                        .try_log("bus", Level::Info, format!("p{} #{}", p, i))
                        .unwrap();
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }
    registry.delete_logger("bus");

    let lines = sink.lines();
    assert_eq!(lines.len(), 90);
    for p in 0..3 {
        let tag = format!("p{} #", p);
        let seq: Vec<usize> = lines
            .iter()
            .filter_map(|line| line.split_once(&tag))
            .map(|(_, n)| n.trim_end().parse().unwrap())
            .collect();
        assert_eq!(seq, (0..30).collect::<Vec<_>>());
    }
}

#[test]
fn test_delete_while_producers_blocked() {
    let registry = LoggerRegistry::new();
    let sink = SlowSink::new(Duration::from_millis(2));
    let config = LoggerConfig {
        queue_capacity: 1,
        ..Default::default()
    };
    registry
        .create_logger("apu", Some(config), Some(Box::new(sink.clone())))
        .unwrap();
    let handle = registry.find("apu").unwrap();

    let producers: Vec<_> = (0..4)
        .map(|p| {
            let handle = handle.clone();
            thread::spawn(move || {
                (0..20)
                    .map(|i| handle.info(format!("{}:{}", p, i)))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    thread::sleep(Duration::from_millis(10));
    registry.delete_logger("apu");
    assert!(registry.find("apu").is_none());

    let mut accepted = 0;
    for producer in producers {
        let results = producer.join().unwrap();
        // Once a producer sees the queue closed, it stays closed
        let first_closed = results.iter().position(|r| r.is_err());
        if let Some(start) = first_closed {
            assert!(results[start..]
                .iter()
                .all(|r| matches!(r, Err(LogError::QueueClosed(_)))));
        }
        accepted += results.iter().filter(|r| r.is_ok()).count();
    }

    assert_eq!(handle.state(), WorkerState::Terminated);
    // Accepted messages all sit ahead of the shutdown sentinel
    assert_eq!(sink.lines().len(), accepted);
}

#[test]
fn test_replace_logger_under_load() {
    let registry = Arc::new(LoggerRegistry::new());
    let first = MemorySink::new();
    registry
        .create_logger("timer", None, Some(Box::new(first.clone())))
        .unwrap();

    let producer = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            let mut rejected = 0;
            for i in 0..200 {
                match registry.try_log("timer", Level::Debug, format!("tick {}", i)) {
                    Ok(()) => {}
                    Err(LogError::QueueClosed(_)) => rejected += 1,
                    Err(err) => panic!("unexpected error: {}", err),
                }
            }
            rejected
        })
    };

    thread::sleep(Duration::from_millis(1));
    let second = MemorySink::new();
    registry
        .create_logger("timer", None, Some(Box::new(second.clone())))
        .unwrap();
    let rejected = producer.join().unwrap();
    registry.delete_loggers();

    // The replaced logger was drained and closed; every accepted message
    // reached exactly one sink
    assert_eq!(first.close_count(), 1);
    assert_eq!(second.close_count(), 1);
    assert_eq!(first.lines().len() + second.lines().len() + rejected, 200);
    assert!(second.lines().iter().all(|line| line.contains("DEBUG tick")));
}

#[test]
fn test_delete_loggers_writes_everything_queued() {
    let registry = LoggerRegistry::new();
    let sinks: Vec<(String, SlowSink)> = (0..3)
        .map(|n| {
            let name = format!("unit{}", n);
            let sink = SlowSink::new(Duration::from_micros(100));
            let config = LoggerConfig {
                queue_capacity: 64,
                level: Level::Info,
                ..Default::default()
            };
            registry
                .create_logger(&name, Some(config), Some(Box::new(sink.clone())))
                .unwrap();
            (name, sink)
        })
        .collect();

    for i in 0..40 {
        for (name, _) in &sinks {
            let level = if i % 4 == 0 { Level::Debug } else { Level::Info };
            registry.log(name, level, format!("{} {}", name, i));
        }
    }
    registry.delete_loggers();

    for (_, sink) in &sinks {
        // Every fourth message is below the level and filtered
        assert_eq!(sink.lines().len(), 30);
    }
    assert!(registry.is_empty());
}

#[test]
fn test_colored_lines() {
    let registry = LoggerRegistry::new();
    let sink = MemorySink::new();
    let config = LoggerConfig {
        colors: true,
        flush: true,
        ..Default::default()
    };
    registry
        .create_logger("mintboy", Some(config), Some(Box::new(sink.clone())))
        .unwrap();

    registry.log("mintboy", Level::Error, "boom");
    registry.delete_loggers();

    let contents = sink.contents();
    assert!(contents.starts_with("\x1B[31m["));
    assert!(contents.ends_with("ERROR boom\n\x1B[0m"));
    assert_eq!(sink.flush_count(), 1);
}

#[cfg(unix)]
#[test]
fn test_owned_descriptor_sink() {
    use mintboy::logging::DescriptorSink;
    use std::os::unix::io::IntoRawFd;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("raw.log");
    let fd = std::fs::File::create(&path).unwrap().into_raw_fd();

    let registry = LoggerRegistry::new();
    registry
        .create_logger(
            "raw",
            Some(LoggerConfig::default()),
            Some(Box::new(DescriptorSink::owned(fd).unwrap())),
        )
        .unwrap();
    registry.log("raw", Level::Warn, "unbuffered");
    registry.delete_logger("raw");

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.ends_with("WARN unbuffered\n"));
}

#[test]
fn test_ids_are_table_slots() {
    let registry = LoggerRegistry::new();
    let a = registry.create_logger("a", None, Some(Box::new(MemorySink::new()))).unwrap();
    let b = registry.create_logger("b", None, Some(Box::new(MemorySink::new()))).unwrap();

    assert_ne!(a, b);
    assert!(a.0 < registry.capacity());
    assert_eq!(registry.find("b").unwrap().id(), b);
}
