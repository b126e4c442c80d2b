//! The process-wide login slot, reached without any façade instance.
//!
//! Kept in its own test binary: it is the only test that touches the global slot.

mod common;

use common::*;
use futures::StreamExt;
use rxgraph::{HostContext, LoginBridge, ResultPayload, RxGraph, SessionState};

#[tokio::test]
async fn forward_login_result_reaches_global_session() {
    assert!(!RxGraph::forward_login_result(
        LOGIN_REQUEST_CODE,
        RESULT_OK,
        &ResultPayload::new(LoginActivityResult::Cancel),
    ));

    let platform = Platform::new();
    let graph = RxGraph::new(platform.config(None, None));

    let mut login = graph.login_with_read_permissions(HostContext::new("activity"), Vec::new());
    assert!(futures::poll!(login.next()).is_pending());
    assert!(LoginBridge::global().is_active());

    // Dropping the façade does not affect the pending login
    drop(graph);

    assert!(RxGraph::forward_login_result(
        LOGIN_REQUEST_CODE,
        RESULT_OK,
        &ResultPayload::new(LoginActivityResult::Error("USER_DENIED".to_string())),
    ));
    assert_eq!(LoginBridge::global().state(), SessionState::Idle);

    assert!(matches!(login.next().await, Some(Err(_))));
    assert!(login.next().await.is_none());

    // A second forward finds nothing
    assert!(!RxGraph::forward_login_result(
        LOGIN_REQUEST_CODE,
        RESULT_OK,
        &ResultPayload::new(LoginActivityResult::Cancel),
    ));
}
