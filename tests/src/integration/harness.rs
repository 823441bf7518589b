//! Shared pipeline harness: all three contexts wired over real transports,
//! with the network swapped for scripted fetchers.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use courier_agent::RelayAgent;
use courier_client::PageClient;
use courier_executor::{
    AllowAll, AllowListPolicy, BackgroundExecutor, DiagnosticsHub, FetchFailure, FetchedResponse,
    HttpFetch, PreparedRequest,
};
use courier_transport::{message_port, DocumentBoard, PortClient};

/// One scripted network outcome.
pub(crate) struct ScriptedReply {
    pub delay: Duration,
    pub outcome: Result<FetchedResponse, FetchFailure>,
}

impl ScriptedReply {
    pub fn immediate(outcome: Result<FetchedResponse, FetchFailure>) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome,
        }
    }
}

/// Fetcher driven by a per-request script; records everything it sees.
pub(crate) struct ScriptedFetcher {
    script: Box<dyn Fn(&PreparedRequest) -> ScriptedReply + Send + Sync>,
    seen: Arc<Mutex<Vec<PreparedRequest>>>,
}

impl ScriptedFetcher {
    pub fn new(
        script: impl Fn(&PreparedRequest) -> ScriptedReply + Send + Sync + 'static,
    ) -> (Self, Arc<Mutex<Vec<PreparedRequest>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                script: Box::new(script),
                seen: Arc::clone(&seen),
            },
            seen,
        )
    }
}

#[async_trait]
impl HttpFetch for ScriptedFetcher {
    async fn fetch(
        &self,
        request: PreparedRequest,
        cancel: CancellationToken,
    ) -> Result<FetchedResponse, FetchFailure> {
        let reply = (self.script)(&request);
        self.seen.lock().push(request);

        if !reply.delay.is_zero() {
            tokio::select! {
                () = cancel.cancelled() => return Err(FetchFailure::Cancelled),
                () = tokio::time::sleep(reply.delay) => {}
            }
        }
        reply.outcome
    }
}

/// A 200 response with a JSON content type.
pub(crate) fn json_ok(body: &str) -> FetchedResponse {
    let mut headers = BTreeMap::new();
    headers.insert("content-type".to_string(), "application/json".to_string());
    FetchedResponse {
        status: 200,
        status_text: Some("OK".to_string()),
        headers,
        body: body.to_string(),
    }
}

/// A fully wired relay pipeline.
pub(crate) struct Pipeline {
    pub board: Arc<DocumentBoard>,
    pub client: PageClient,
    /// Second handle to the agent's port, for suspension tests.
    pub port: PortClient,
    pub diagnostics: Arc<DiagnosticsHub>,
}

/// Wire page client, relay agent, and executor over real transports.
pub(crate) fn pipeline(
    fetcher: impl HttpFetch + 'static,
    policy: Arc<dyn AllowListPolicy>,
) -> Pipeline {
    let board = Arc::new(DocumentBoard::new());
    let (port, server) = message_port();

    let executor = BackgroundExecutor::new(fetcher, policy);
    let diagnostics = executor.diagnostics();
    tokio::spawn(async move { executor.serve(server).await });

    let agent = RelayAgent::new(Arc::clone(&board), port.clone());
    tokio::spawn(async move { agent.run().await });

    let client = PageClient::new(Arc::clone(&board));

    Pipeline {
        board,
        client,
        port,
        diagnostics,
    }
}

/// Pipeline variant whose executor never answers: the port server is held
/// open but no exchange is ever responded to.
pub(crate) fn pipeline_with_silent_executor() -> Pipeline {
    let board = Arc::new(DocumentBoard::new());
    let (port, mut server) = message_port();

    tokio::spawn(async move {
        // Accept exchanges and hold them forever.
        let mut parked = Vec::new();
        while let Some(exchange) = server.next().await {
            parked.push(exchange);
        }
    });

    let agent = RelayAgent::new(Arc::clone(&board), port.clone());
    tokio::spawn(async move { agent.run().await });

    let client = PageClient::new(Arc::clone(&board));
    let diagnostics = Arc::new(DiagnosticsHub::new());

    Pipeline {
        board,
        client,
        port,
        diagnostics,
    }
}

/// Pipeline with an executor that answers everything `200 OK` JSON.
pub(crate) fn echo_pipeline() -> (Pipeline, Arc<Mutex<Vec<PreparedRequest>>>) {
    let (fetcher, seen) =
        ScriptedFetcher::new(|_| ScriptedReply::immediate(Ok(json_ok(r#"{"ok":true}"#))));
    (pipeline(fetcher, Arc::new(AllowAll)), seen)
}
