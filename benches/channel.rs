use criterion::{criterion_group, criterion_main, Criterion};
use weft::Channel;

const PINGPONG_ITEMS: u32 = 100;
const BURST_ITEMS: u32 = 1024;
const BURST_CAPACITY: usize = 64;

fn rt() -> tokio::runtime::Runtime {
  tokio::runtime::Builder::new_multi_thread()
    .worker_threads(2)
    .build()
    .expect("failed to build runtime")
}

fn bench_rendezvous_pingpong(c: &mut Criterion) {
  let rt = rt();
  c.bench_function("rendezvous_pingpong", |b| {
    b.iter(|| {
      rt.block_on(async {
        let chan = Channel::rendezvous();
        let consumer = {
          let chan = chan.clone();
          tokio::spawn(async move { while chan.recv().await.is_some() {} })
        };
        for i in 0..PINGPONG_ITEMS {
          chan.send(i).await.unwrap();
        }
        chan.close().unwrap();
        consumer.await.unwrap();
      })
    })
  });
}

fn bench_buffered_burst(c: &mut Criterion) {
  let rt = rt();
  c.bench_function("buffered_burst_cap64", |b| {
    b.iter(|| {
      rt.block_on(async {
        let chan = Channel::bounded(BURST_CAPACITY);
        let consumer = {
          let chan = chan.clone();
          tokio::spawn(async move { while chan.recv().await.is_some() {} })
        };
        for i in 0..BURST_ITEMS {
          chan.send(i).await.unwrap();
        }
        chan.close().unwrap();
        consumer.await.unwrap();
      })
    })
  });
}

criterion_group!(benches, bench_rendezvous_pingpong, bench_buffered_burst);
criterion_main!(benches);
