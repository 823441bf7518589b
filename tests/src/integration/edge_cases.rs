//! # Relay Edge Cases
//!
//! Timeouts, late replies, malformed carriers, and page suspension —
//! every failure must settle exactly one pending entry and leave the rest
//! of the system operable.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::time::{timeout, Instant};

    use courier_client::RequestOptions;
    use courier_codec::carrier_node_id;
    use courier_executor::AllowAll;
    use courier_transport::CarrierNode;

    use crate::integration::harness::{
        echo_pipeline, json_ok, pipeline, pipeline_with_silent_executor, ScriptedFetcher,
        ScriptedReply,
    };

    #[tokio::test]
    async fn silent_executor_resolves_with_synthetic_timeout() {
        let pipeline = pipeline_with_silent_executor();
        let started = Instant::now();

        let response = pipeline
            .client
            .request(RequestOptions::get("https://never.test/").timeout_ms(100))
            .await
            .expect("resolution, never a rejection");

        assert_eq!(response.status, 0);
        assert_eq!(response.status_text, "timeout");
        assert!(!response.ok);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_secs(2), "settled near the deadline");
    }

    #[tokio::test]
    async fn late_executor_reply_is_dropped_after_timeout() {
        // Network takes 200 ms; the page-side deadline is 50 ms.
        let (fetcher, _) = ScriptedFetcher::new(|_| ScriptedReply {
            delay: Duration::from_millis(200),
            outcome: Ok(json_ok("{}")),
        });
        let pipeline = pipeline(fetcher, Arc::new(AllowAll));

        let response = pipeline
            .client
            .request(RequestOptions::get("https://slow.test/").timeout_ms(50))
            .await
            .expect("timeout resolution");
        assert_eq!(response.status, 0);

        // Give the late reply time to arrive and be ignored.
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(pipeline.client.pending_count(), 0);
        assert_eq!(pipeline.board.node_count(), 0, "agent still cleans up");
    }

    #[tokio::test]
    async fn malformed_carrier_leaks_but_leaves_the_relay_operable() {
        let (pipeline, _) = echo_pipeline();

        // A corrupt node appears on the board.
        pipeline.board.append(CarrierNode::new(
            carrier_node_id("req-corrupt"),
            "!!! definitely not base64 !!!",
        ));
        tokio::time::sleep(Duration::from_millis(50)).await;

        // It is never removed and never processed.
        assert!(pipeline
            .board
            .text(&carrier_node_id("req-corrupt"))
            .is_some());
        assert!(!pipeline.board.is_processing(&carrier_node_id("req-corrupt")));

        // A healthy request still goes through.
        let response = pipeline
            .client
            .request(RequestOptions::get("https://api.test/alive"))
            .await
            .expect("response");
        assert_eq!(response.status, 200);

        // Only the corrupt node remains.
        assert_eq!(pipeline.board.node_count(), 1);
    }

    #[tokio::test]
    async fn suspension_surfaces_request_cancelled() {
        let (fetcher, _) = ScriptedFetcher::new(|_| ScriptedReply {
            delay: Duration::from_secs(5),
            outcome: Ok(json_ok("{}")),
        });
        let pipeline = pipeline(fetcher, Arc::new(AllowAll));

        let client = Arc::new(pipeline.client);
        let call = {
            let client = Arc::clone(&client);
            tokio::spawn(async move {
                client
                    .request(RequestOptions::get("https://hang.test/"))
                    .await
            })
        };

        // Let the request reach the executor, then suspend the page.
        tokio::time::sleep(Duration::from_millis(50)).await;
        pipeline.port.suspend();

        let error = timeout(Duration::from_secs(1), call)
            .await
            .expect("settles promptly")
            .unwrap()
            .expect_err("rejection");
        assert!(error.to_string().contains("request cancelled"));
    }

    #[tokio::test]
    async fn board_events_for_unknown_ids_are_ignored() {
        let (pipeline, _) = echo_pipeline();

        // An event nobody asked for.
        pipeline.board.dispatch(courier_types::BoardEvent::Error {
            id: "ghost-1".to_string(),
            error: "stray".to_string(),
        });

        // The client stays healthy and a real request still works.
        let response = pipeline
            .client
            .request(RequestOptions::get("https://api.test/fine"))
            .await
            .expect("response");
        assert!(response.ok);
    }
}
