//! # End-to-End Relay Flows
//!
//! The full path: PageClient publishes a carrier node, RelayAgent forwards
//! it over the message port, BackgroundExecutor reconstructs and "fetches"
//! via a scripted network, and the reply event settles the original call.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;
    use tokio::time::timeout;

    use courier_client::RequestOptions;
    use courier_codec::{FormPayload, FormValue};
    use courier_executor::{AllowAll, DomainAllowList, FetchFailure, PreparedPayload};

    use crate::integration::harness::{
        echo_pipeline, json_ok, pipeline, ScriptedFetcher, ScriptedReply,
    };

    #[tokio::test]
    async fn get_with_json_response_parses_body() {
        let (pipeline, _) = echo_pipeline();

        let response = pipeline
            .client
            .request(RequestOptions::get("https://api.test/status"))
            .await
            .expect("response");

        assert_eq!(response.status, 200);
        assert!(response.ok);
        assert_eq!(response.body, r#"{"ok":true}"#);
        assert_eq!(response.body_parsed, Some(json!({"ok": true})));

        // The carrier node was consumed and removed.
        assert_eq!(pipeline.board.node_count(), 0);
        assert_eq!(pipeline.client.pending_count(), 0);
    }

    #[tokio::test]
    async fn multipart_post_reconstructs_bytes_and_strips_header() {
        let (pipeline, seen) = echo_pipeline();

        let mut payload = FormPayload::new();
        payload.push_text("title", "greeting");
        payload.push_blob("f", "hello.txt", "text/plain", b"hello".to_vec());

        let response = pipeline
            .client
            .request(
                RequestOptions::post("https://upload.test/files")
                    .header("content-type", "multipart/form-data; boundary=stale")
                    .form_body(&payload),
            )
            .await
            .expect("response");
        assert!(response.ok);

        let seen = seen.lock();
        let prepared = &seen[0];
        assert!(
            prepared.headers.is_empty(),
            "caller multipart content-type must not reach the network"
        );
        match &prepared.payload {
            PreparedPayload::Multipart(form) => {
                assert_eq!(form.entries.len(), 2);
                match &form.entries[1].1 {
                    FormValue::Blob(blob) => {
                        assert_eq!(blob.bytes, b"hello");
                        assert_eq!(blob.name, "hello.txt");
                    }
                    FormValue::Text(_) => panic!("expected blob entry"),
                }
            }
            other => panic!("expected multipart payload, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn out_of_order_replies_settle_their_own_callers() {
        // The first URL is answered slowly, the second instantly, so the
        // executor's replies arrive in reverse order of publication.
        let (fetcher, _) = ScriptedFetcher::new(|request| {
            let delay = if request.url.contains("slow") {
                Duration::from_millis(150)
            } else {
                Duration::ZERO
            };
            let body = format!(r#"{{"for":"{}"}}"#, request.url);
            ScriptedReply {
                delay,
                outcome: Ok(json_ok(&body)),
            }
        });
        let pipeline = pipeline(fetcher, Arc::new(AllowAll));
        let client = Arc::new(pipeline.client);

        let slow = {
            let client = Arc::clone(&client);
            tokio::spawn(
                async move { client.request(RequestOptions::get("https://slow.test/")).await },
            )
        };
        let fast = {
            let client = Arc::clone(&client);
            tokio::spawn(
                async move { client.request(RequestOptions::get("https://fast.test/")).await },
            )
        };

        let fast_response = fast.await.unwrap().expect("fast settles");
        let slow_response = slow.await.unwrap().expect("slow settles");

        assert_eq!(
            fast_response.body_parsed.unwrap()["for"],
            "https://fast.test/"
        );
        assert_eq!(
            slow_response.body_parsed.unwrap()["for"],
            "https://slow.test/"
        );
        assert_eq!(client.pending_count(), 0);
    }

    #[tokio::test]
    async fn connection_refused_reaches_the_caller_classified() {
        let (fetcher, _) = ScriptedFetcher::new(|_| {
            ScriptedReply::immediate(Err(FetchFailure::Transport(
                "error trying to connect: Connection refused (os error 111)".to_string(),
            )))
        });
        let pipeline = pipeline(fetcher, Arc::new(AllowAll));

        let error = pipeline
            .client
            .request(RequestOptions::get("https://down.test/api"))
            .await
            .expect_err("rejection");

        let message = error.to_string();
        assert!(message.contains("https://down.test/api"));
        assert!(message.contains("cannot connect"));
    }

    #[tokio::test]
    async fn allow_list_denial_reaches_the_caller() {
        let (fetcher, seen) =
            ScriptedFetcher::new(|_| ScriptedReply::immediate(Ok(json_ok("{}"))));
        let pipeline = pipeline(fetcher, Arc::new(DomainAllowList::new(["allowed.test"])));

        let error = pipeline
            .client
            .request(RequestOptions::get("https://denied.test/"))
            .await
            .expect_err("rejection");

        assert!(error.to_string().contains("domain not allowed"));
        assert!(seen.lock().is_empty(), "denied requests never hit the network");
    }

    #[tokio::test]
    async fn diagnostics_summaries_flow_for_relayed_requests() {
        let (pipeline, _) = echo_pipeline();
        let mut summaries = pipeline.diagnostics.subscribe();

        pipeline
            .client
            .request(RequestOptions::get("https://api.test/one"))
            .await
            .expect("response");

        let summary = timeout(Duration::from_secs(1), summaries.recv())
            .await
            .expect("timeout")
            .expect("summary");
        assert_eq!(summary.url, "https://api.test/one");
        assert_eq!(summary.status, Some(200));
    }

    #[tokio::test]
    async fn many_concurrent_requests_all_settle_independently() {
        let (pipeline, _) = echo_pipeline();
        let client = Arc::new(pipeline.client);

        let calls: Vec<_> = (0..20)
            .map(|i| {
                let client = Arc::clone(&client);
                tokio::spawn(async move {
                    client
                        .request(RequestOptions::get(format!("https://api.test/{i}")))
                        .await
                })
            })
            .collect();

        for call in calls {
            let response = call.await.unwrap().expect("settles");
            assert_eq!(response.status, 200);
        }
        assert_eq!(client.pending_count(), 0);
    }
}
