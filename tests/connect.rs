//! Tests for the subscription connect flow.
use flowboard::connect;
use flowboard::error::ConnectError;
use flowboard::prelude::*;
use std::time::Duration;

#[tokio::test]
async fn test_completed_flow_yields_service() {
    let (handle, pending) = connect::begin(ServiceRef::new("calendar"), Duration::from_secs(5));
    assert_eq!(handle.service(), pending.service());

    tokio::spawn(async move { handle.complete() });
    assert_eq!(pending.wait().await.unwrap(), ServiceRef::new("calendar"));
}

#[tokio::test]
async fn test_cancelled_flow() {
    let (handle, pending) = connect::begin(ServiceRef::new("mail"), Duration::from_secs(5));
    handle.cancel();
    assert!(matches!(
        pending.wait().await,
        Err(ConnectError::Cancelled { service }) if service == "mail"
    ));
}

#[tokio::test]
async fn test_dropped_handle_is_abandoned() {
    let (handle, pending) = connect::begin(ServiceRef::new("mail"), Duration::from_secs(5));
    drop(handle);
    assert!(matches!(
        pending.wait().await,
        Err(ConnectError::Abandoned { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_flow_times_out() {
    let (_handle, pending) = connect::begin(ServiceRef::new("chat"), Duration::from_secs(120));
    let err = pending.wait().await.unwrap_err();
    assert!(matches!(
        err,
        ConnectError::TimedOut { after, .. } if after == Duration::from_secs(120)
    ));
}
