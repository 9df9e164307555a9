mod common;
use common::*;

use weft::{select, try_select, Channel};

// --- Non-blocking scan ---

#[tokio::test]
async fn try_select_picks_first_ready_in_order() {
  let c1 = Channel::bounded(1);
  let c2 = Channel::bounded(1);
  assert!(try_select(&[c1.clone(), c2.clone()]).is_none());

  c2.send(20).await.unwrap();
  assert_eq!(try_select(&[c1.clone(), c2.clone()]), Some((20, 1)));
  // The value was consumed by the scan.
  assert!(try_select(&[c1.clone(), c2.clone()]).is_none());

  c1.send(10).await.unwrap();
  c2.send(20).await.unwrap();
  // Fixed scan order: the first ready channel wins.
  assert_eq!(try_select(&[c1.clone(), c2.clone()]), Some((10, 0)));
  // The losing channel was left untouched.
  assert_eq!(c2.recv().await, Some(20));
}

#[tokio::test]
async fn try_select_takes_parked_rendezvous_senders() {
  let c1 = Channel::rendezvous();
  let parked = c1.send(7);
  assert!(parked.is_pending());

  assert_eq!(try_select(&[c1.clone()]), Some((7, 0)));
  assert!(parked.is_fulfilled());
}

// --- Ready-up-front select ---

#[tokio::test]
async fn select_completes_immediately_when_ready() {
  let c1 = Channel::bounded(1);
  let c2 = Channel::bounded(1);
  c2.send(9).await.unwrap();

  let sel = select(&[c1.clone(), c2.clone()]);
  assert!(sel.is_settled());
  assert_eq!(sel.await, (Some(9), 1));
}

// --- Parked select ---

#[tokio::test]
async fn select_resolves_with_winning_channel_index() {
  let c1 = Channel::rendezvous();
  let c2 = Channel::rendezvous();

  let sel = select(&[c1.clone(), c2.clone()]);
  assert!(!sel.is_settled());

  let send = c1.send(5);
  // The send paired with the registration on the spot.
  assert!(send.is_fulfilled());
  assert_eq!(sel.await, (Some(5), 0));
  assert_eq!(send.await, Ok(()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn select_across_tasks() {
  let c1 = Channel::rendezvous();
  let c2 = Channel::rendezvous();

  let sender = {
    let c2 = c2.clone();
    tokio::spawn(async move {
      tokio::time::sleep(SHORT_TIMEOUT).await;
      c2.send(100).await.unwrap();
    })
  };

  assert_eq!(select(&[c1.clone(), c2.clone()]).await, (Some(100), 1));
  sender.await.unwrap();
}

// --- Registration Hygiene ---

#[tokio::test]
async fn losing_registrations_do_not_consume_later_sends() {
  let c1 = Channel::rendezvous();
  let c2 = Channel::rendezvous();

  let sel = select(&[c1.clone(), c2.clone()]);
  let first = c1.send(1);
  assert!(first.is_fulfilled());
  assert_eq!(sel.await, (Some(1), 0));

  // c2's registration lost and was removed; a later send on c2 must park
  // (nobody is receiving), not vanish into the settled select.
  let second = c2.send(2);
  assert!(second.is_pending());
  assert_eq!(c2.recv().await, Some(2));
  assert_eq!(second.await, Ok(()));
}

#[tokio::test]
async fn dropping_an_unsettled_select_deregisters() {
  let c1 = Channel::rendezvous();
  let c2 = Channel::rendezvous();

  let sel = select(&[c1.clone(), c2.clone()]);
  drop(sel);

  // No receivers remain, so a send parks instead of pairing.
  let send = c1.send(1);
  assert!(send.is_pending());
  assert_eq!(c1.recv().await, Some(1));
  assert_eq!(send.await, Ok(()));
}

// --- Close Interactions ---

#[tokio::test]
async fn closed_channel_ends_a_parked_select() {
  let c1 = Channel::<i32>::rendezvous();
  let c2 = Channel::<i32>::rendezvous();

  let sel = select(&[c1.clone(), c2.clone()]);
  c2.close().unwrap();
  assert_eq!(sel.await, (None, 1));
}

#[tokio::test]
async fn select_on_already_closed_channel_resolves_end_of_stream() {
  let c1 = Channel::<i32>::rendezvous();
  let c2 = Channel::<i32>::rendezvous();
  c1.close().unwrap();

  let sel = select(&[c1.clone(), c2.clone()]);
  assert!(sel.is_settled());
  assert_eq!(sel.await, (None, 0));
}

#[tokio::test]
async fn select_prefers_buffered_value_over_closed_peer() {
  let c1 = Channel::<i32>::bounded(1);
  let c2 = Channel::<i32>::bounded(1);
  c1.send(11).await.unwrap();
  c2.close().unwrap();

  // The ready-scan runs before any registration sees the closed peer.
  assert_eq!(select(&[c1.clone(), c2.clone()]).await, (Some(11), 0));
}
