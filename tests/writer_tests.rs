use cablestat::core::{FieldValue, MetricPoint};
use cablestat::engine::{BatchWriter, WriterConfig};
use cablestat::sink::RecordingSink;
use std::sync::Arc;
use std::task::Poll;
use std::time::{Duration, SystemTime};
use tokio::time::{sleep, timeout};
use tokio_test::assert_pending;

fn point(n: i64) -> MetricPoint {
    MetricPoint::new("test", SystemTime::UNIX_EPOCH).field("n", n)
}

fn config(queue_capacity: usize) -> WriterConfig {
    WriterConfig {
        queue_capacity,
        flush_interval: Duration::from_secs(1),
    }
}

fn numbers(points: &[MetricPoint]) -> Vec<i64> {
    points
        .iter()
        .map(|p| match p.fields["n"] {
            FieldValue::Integer(n) => n,
            ref other => panic!("unexpected field {:?}", other),
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_idle_writer_never_calls_backend() {
    let sink = Arc::new(RecordingSink::new());
    let (sender, writer) = BatchWriter::new(sink.clone(), &config(16));
    let _handle = writer.spawn();

    sleep(Duration::from_secs(30)).await;
    assert_eq!(sink.calls(), 0);

    sender.send(point(1)).await.unwrap();
    sleep(Duration::from_millis(1500)).await;
    assert_eq!(sink.calls(), 1);

    // Back to idle: further ticks must not write
    sleep(Duration::from_secs(10)).await;
    assert_eq!(sink.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_points_flushed_as_one_batch_per_tick() {
    let sink = Arc::new(RecordingSink::new());
    let (sender, writer) = BatchWriter::new(sink.clone(), &config(16));
    let metrics = writer.metrics();
    let _handle = writer.spawn();

    sender.send_all((0..5).map(point)).await.unwrap();
    sleep(Duration::from_millis(1500)).await;

    let batches = sink.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(numbers(&batches[0]), vec![0, 1, 2, 3, 4]);
    assert_eq!(metrics.points_ingested(), 5);
    assert_eq!(metrics.batches_written(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_batch_is_discarded() {
    let sink = Arc::new(RecordingSink::new());
    sink.fail_next(1);

    let (sender, writer) = BatchWriter::new(sink.clone(), &config(16));
    let metrics = writer.metrics();
    let _handle = writer.spawn();

    sender.send_all(vec![point(1), point(2)]).await.unwrap();
    sleep(Duration::from_millis(1500)).await;
    assert_eq!(sink.calls(), 1);
    assert!(sink.points().is_empty());

    // Nothing pending after the failure: the next tick is a no-op
    sleep(Duration::from_secs(1)).await;
    assert_eq!(sink.calls(), 1);

    sender.send(point(3)).await.unwrap();
    sleep(Duration::from_secs(1)).await;
    assert_eq!(sink.calls(), 2);
    assert_eq!(numbers(&sink.points()), vec![3]);

    assert_eq!(metrics.batches_failed(), 1);
    assert_eq!(metrics.points_discarded(), 2);
}

#[tokio::test]
async fn test_full_queue_blocks_producer() {
    let sink = Arc::new(RecordingSink::new());
    let (sender, writer) = BatchWriter::new(sink.clone(), &config(2));

    sender.send(point(1)).await.unwrap();
    sender.send(point(2)).await.unwrap();
    assert_eq!(sender.available(), 0);

    // No consumer yet: the third send must wait, not drop
    let mut blocked = tokio_test::task::spawn(sender.send(point(3)));
    assert_pending!(blocked.poll());

    let handle = writer.spawn();

    let mut attempts = 0;
    let sent = loop {
        if let Poll::Ready(result) = blocked.poll() {
            break result;
        }
        attempts += 1;
        assert!(attempts < 10_000, "producer never unblocked");
        tokio::task::yield_now().await;
    };
    assert!(sent.is_ok());

    drop(blocked);
    drop(sender);
    timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();

    assert_eq!(numbers(&sink.points()), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_many_producers_lose_nothing() {
    let sink = Arc::new(RecordingSink::new());
    let (sender, writer) = BatchWriter::new(sink.clone(), &config(8));
    let handle = writer.spawn();

    let mut producers = Vec::new();
    for producer in 0..4i64 {
        let sender = sender.clone();
        producers.push(tokio::spawn(async move {
            for n in 0..250 {
                sender.send(point(producer * 1000 + n)).await.unwrap();
            }
        }));
    }
    drop(sender);

    for producer in producers {
        producer.await.unwrap();
    }
    timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();

    let written = numbers(&sink.points());
    assert_eq!(written.len(), 1000);

    // Each producer's points keep their relative order
    for producer in 0..4i64 {
        let own: Vec<i64> = written
            .iter()
            .copied()
            .filter(|n| n / 1000 == producer)
            .collect();
        let expected: Vec<i64> = (0..250).map(|n| producer * 1000 + n).collect();
        assert_eq!(own, expected);
    }
}

#[tokio::test]
async fn test_send_after_writer_stops_fails() {
    let sink = Arc::new(RecordingSink::new());
    let (sender, writer) = BatchWriter::new(sink, &config(4));
    drop(writer);

    assert!(sender.is_closed());
    assert!(sender.send(point(1)).await.is_err());
}
