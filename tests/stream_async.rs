mod common;

use weft::stream::{concat, Source};
use weft::Channel;

#[tokio::test]
async fn map_transforms_every_value() {
  let source = Channel::rendezvous();
  let (mapped, driver) = source.map(|n: i32| n * 10);
  tokio::spawn(driver);

  tokio::spawn({
    let source = source.clone();
    async move {
      for n in 1..=4 {
        source.send(n).await.unwrap();
      }
      source.close().unwrap();
    }
  });

  let mut out = Vec::new();
  while let Some(value) = mapped.recv().await {
    out.push(value);
  }
  assert_eq!(out, vec![10, 20, 30, 40]);
}

#[tokio::test]
async fn filter_discards_without_forwarding() {
  let source = Channel::rendezvous();
  let (evens, driver) = source.filter(|n: &i32| n % 2 == 0);
  tokio::spawn(driver);

  tokio::spawn({
    let source = source.clone();
    async move {
      for n in 1..=6 {
        source.send(n).await.unwrap();
      }
      source.close().unwrap();
    }
  });

  let mut out = Vec::new();
  while let Some(value) = evens.recv().await {
    out.push(value);
  }
  assert_eq!(out, vec![2, 4, 6]);
}

#[tokio::test]
async fn reduce_folds_until_end_of_stream() {
  let source = Channel::bounded(4);
  for n in [1, 2, 3, 4] {
    source.send(n).await.unwrap();
  }
  source.close().unwrap();

  let total = source.reduce(0, |acc, n| acc + n).await;
  assert_eq!(total, 10);
}

#[tokio::test]
async fn chained_map_reduce() {
  let source = Channel::bounded(8);
  let (squares, driver) = source.map(|n: i32| n * n);
  tokio::spawn(driver);
  let sum = tokio::spawn(squares.reduce(0, |acc, n| acc + n));

  for n in 1..=4 {
    source.send(n).await.unwrap();
  }
  source.close().unwrap();
  assert_eq!(sum.await.unwrap(), 30);
}

#[tokio::test]
async fn concat_preserves_list_order() {
  let a = Channel::bounded(2);
  let b = Channel::bounded(2);
  a.send(1).await.unwrap();
  a.send(2).await.unwrap();
  a.close().unwrap();
  b.send(4).await.unwrap();
  b.close().unwrap();

  let (out, driver) = concat(vec![Source::Channel(a), Source::Item(3), Source::Channel(b)]);
  tokio::spawn(driver);

  let collected = out
    .reduce(Vec::new(), |mut acc, value| {
      acc.push(value);
      acc
    })
    .await;
  assert_eq!(collected, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn map_stops_silently_when_output_closes() {
  let source = Channel::rendezvous();
  let (mapped, driver) = source.map(|n: i32| n + 1);
  let driver = tokio::spawn(driver);

  mapped.close().unwrap();
  // The driver is parked on its first receive; feed it one value so it hits
  // the closed output and stops without surfacing anything.
  source.send(1).await.unwrap();
  driver.await.unwrap();

  assert_eq!(mapped.recv().await, None);
  // The source is left open; only forwarding stopped.
  assert!(!source.is_closed());
}

#[tokio::test]
async fn map_closes_output_after_source_ends() {
  let source = Channel::bounded(2);
  source.send(1).await.unwrap();
  source.close().unwrap();

  let (mapped, driver) = source.map(|n: i32| n);
  tokio::spawn(driver);

  assert_eq!(mapped.recv().await, Some(1));
  assert_eq!(mapped.recv().await, None);
  assert!(mapped.is_closed());
}
