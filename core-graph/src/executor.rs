//! # Request Executor
//!
//! Adapts the transport's single completion callback into a stream that
//! yields exactly one item and then ends.
//!
//! Nothing happens until the returned stream is polled. On the first poll the
//! builder settings are merged into the request, the request is handed to the
//! [`GraphTransport`], and the stream resolves once the callback has fired.
//! The polling task is the one that waits on the transport, so the caller
//! chooses where that cost lands by choosing where to poll.

use crate::builder::RequestConfig;
use crate::error::{GraphError, Result};
use bridge_traits::{GraphCallback, GraphRequest, GraphResponse, GraphTransport};
use core_runtime::events::{emit_to, BridgeEvent, EventBus, RequestEvent};
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, instrument, warn};

/// Stream of exactly one response or stream-level failure.
pub type ResponseStream = BoxStream<'static, Result<GraphResponse>>;

/// Submits requests to a [`GraphTransport`].
#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn GraphTransport>,
    event_bus: Option<EventBus>,
}

impl RequestExecutor {
    pub fn new(transport: Arc<dyn GraphTransport>) -> Self {
        Self {
            transport,
            event_bus: None,
        }
    }

    /// Publish request lifecycle events on `bus`.
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Build the stream for `request`, merged with `config` when first polled.
    pub fn submit(&self, request: GraphRequest, config: RequestConfig) -> ResponseStream {
        let transport = Arc::clone(&self.transport);
        let event_bus = self.event_bus.clone();

        stream::once(async move {
            let request = config.apply_to(request);
            execute(transport, event_bus, request).await
        })
        .boxed()
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("transport", &"GraphTransport { ... }")
            .field("event_bus", &self.event_bus)
            .finish()
    }
}

#[instrument(
    skip_all,
    fields(
        graph_path = request.graph_path.as_deref().unwrap_or(""),
        method = request.http_method.map(|m| m.as_str()).unwrap_or("")
    )
)]
async fn execute(
    transport: Arc<dyn GraphTransport>,
    event_bus: Option<EventBus>,
    request: GraphRequest,
) -> Result<GraphResponse> {
    let graph_path = request.graph_path.clone();
    emit_to(
        event_bus.as_ref(),
        BridgeEvent::Request(RequestEvent::Submitted {
            graph_path: graph_path.clone(),
            method: request.http_method.map(|m| m.as_str().to_string()),
        }),
    );
    debug!("Submitting graph request");

    let (tx, mut rx) = oneshot::channel();
    let callback: GraphCallback = Box::new(move |response| {
        // The receiver is gone only if the stream was dropped mid-flight.
        let _ = tx.send(response);
    });

    let outcome = match transport.execute_and_wait(request, callback).await {
        Ok(()) => rx.await.map_err(|_| GraphError::NoResponse),
        Err(err) => match rx.try_recv() {
            Ok(response) => {
                warn!(error = %err, "Transport reported an error after delivering a response");
                Ok(response)
            }
            Err(_) => Err(GraphError::Transport(err)),
        },
    };

    match &outcome {
        Ok(response) => {
            debug!(has_error = !response.is_success(), "Graph response delivered");
            emit_to(
                event_bus.as_ref(),
                BridgeEvent::Request(RequestEvent::Completed {
                    graph_path,
                    has_error: !response.is_success(),
                }),
            );
        }
        Err(err) => {
            warn!(error = %err, "Graph request failed");
            emit_to(
                event_bus.as_ref(),
                BridgeEvent::Request(RequestEvent::Failed {
                    graph_path,
                    message: err.to_string(),
                }),
            );
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{BridgeError, HttpMethod};
    use mockall::mock;

    mock! {
        Transport {}

        #[async_trait]
        impl GraphTransport for Transport {
            async fn execute_and_wait(
                &self,
                request: GraphRequest,
                callback: GraphCallback,
            ) -> BridgeResult<()>;
        }
    }

    fn answering(raw: &'static str) -> MockTransport {
        let mut transport = MockTransport::new();
        transport
            .expect_execute_and_wait()
            .times(1)
            .returning(move |request, callback| {
                callback(GraphResponse::success(request, raw));
                Ok(())
            });
        transport
    }

    #[tokio::test]
    async fn test_single_response_then_end() {
        let executor = RequestExecutor::new(Arc::new(answering(r#"{"id":"1"}"#)));
        let mut stream =
            executor.submit(GraphRequest::new().graph_path("me"), RequestConfig::default());

        let response = stream.next().await.unwrap().unwrap();
        assert_eq!(response.body.unwrap()["id"], "1");
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_nothing_submitted_before_poll() {
        let mut transport = MockTransport::new();
        transport.expect_execute_and_wait().times(0);

        let executor = RequestExecutor::new(Arc::new(transport));
        let stream = executor.submit(GraphRequest::new(), RequestConfig::default());
        drop(stream);
    }

    #[tokio::test]
    async fn test_config_merged_before_submission() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute_and_wait()
            .withf(|request, _| {
                request.http_method == Some(HttpMethod::Get)
                    && request.graph_path.as_deref() == Some("/2900")
                    && request.version.as_deref() == Some("2.9")
                    && request.skip_client_token
            })
            .times(1)
            .returning(|request, callback| {
                callback(GraphResponse::success(request, "{}"));
                Ok(())
            });

        let config = RequestConfig {
            http_method: Some(HttpMethod::Get),
            graph_path: Some("/2900".to_string()),
            version: Some("2.9".to_string()),
            skip_client_token: true,
            ..RequestConfig::default()
        };

        let executor = RequestExecutor::new(Arc::new(transport));
        let items: Vec<_> = executor.submit(GraphRequest::new(), config).collect().await;
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_request_error_is_data() {
        let mut transport = MockTransport::new();
        transport.expect_execute_and_wait().returning(|request, callback| {
            callback(GraphResponse::failure(
                request,
                bridge_traits::GraphRequestError {
                    status: 400,
                    code: 190,
                    error_type: Some("OAuthException".to_string()),
                    message: "Invalid OAuth access token".to_string(),
                },
            ));
            Ok(())
        });

        let executor = RequestExecutor::new(Arc::new(transport));
        let items: Vec<_> = executor
            .submit(GraphRequest::new(), RequestConfig::default())
            .collect()
            .await;

        assert_eq!(items.len(), 1);
        let response = items.into_iter().next().unwrap().unwrap();
        assert_eq!(response.error.unwrap().code, 190);
    }

    #[tokio::test]
    async fn test_transport_failure_fails_stream() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute_and_wait()
            .returning(|_, _| Err(BridgeError::OperationFailed("socket closed".to_string())));

        let executor = RequestExecutor::new(Arc::new(transport));
        let items: Vec<_> = executor
            .submit(GraphRequest::new(), RequestConfig::default())
            .collect()
            .await;

        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(GraphError::Transport(_))));
    }

    #[tokio::test]
    async fn test_delivered_response_wins_over_transport_error() {
        let mut transport = MockTransport::new();
        transport.expect_execute_and_wait().returning(|request, callback| {
            callback(GraphResponse::success(request, "true"));
            Err(BridgeError::OperationFailed("late failure".to_string()))
        });

        let executor = RequestExecutor::new(Arc::new(transport));
        let mut stream = executor.submit(GraphRequest::new(), RequestConfig::default());

        assert!(stream.next().await.unwrap().is_ok());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_dropped_callback_is_no_response() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute_and_wait()
            .returning(|_, callback| {
                drop(callback);
                Ok(())
            });

        let executor = RequestExecutor::new(Arc::new(transport));
        let mut stream = executor.submit(GraphRequest::new(), RequestConfig::default());

        assert!(matches!(
            stream.next().await,
            Some(Err(GraphError::NoResponse))
        ));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_events_emitted() {
        let bus = EventBus::new(8);
        let mut events = bus.subscribe();

        let executor = RequestExecutor::new(Arc::new(answering("{}"))).with_event_bus(bus);
        let _: Vec<_> = executor
            .submit(GraphRequest::new().graph_path("me"), RequestConfig::default())
            .collect()
            .await;

        assert_eq!(
            events.recv().await.unwrap(),
            BridgeEvent::Request(RequestEvent::Submitted {
                graph_path: Some("me".to_string()),
                method: None,
            })
        );
        assert_eq!(
            events.recv().await.unwrap(),
            BridgeEvent::Request(RequestEvent::Completed {
                graph_path: Some("me".to_string()),
                has_error: false,
            })
        );
    }
}
