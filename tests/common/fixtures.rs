//! Static corpora used across harnesses.
//!
//! Telemetry payloads mirror what an LLM invocation logger emits: a
//! `call_type`, request/response bodies with dashed keys, usage counters,
//! and a `citations` list that must survive flattening untouched.

use serde_json::{json, Value};

/// Representative telemetry documents, one per call type.
pub fn corpus_telemetry() -> Vec<Value> {
    vec![
        json!({
            "call_type": "chat",
            "model-id": "gen-model",
            "request": {"messages": [{"role": "user", "content": "hi"}], "max-tokens": 256},
            "response": {"text": "hello", "stop-reason": "end_turn"},
            "usage": {"input-tokens": 12, "output-tokens": 3}
        }),
        json!({
            "call_type": "RAG-Evaluation",
            "input": {"questions": ["What is the refund window?"], "kb_id": "KB123"},
            "output": {"scores": [{"faithfulness": 0.91, "answer_relevancy": 0.88}]},
            "citations": [
                {"uri": "s3://docs/refunds.md", "score": 0.8},
                {"uri": "s3://docs/refunds.md", "score": 0.8},
                {"uri": "s3://docs/shipping.md", "score": 0.4}
            ]
        }),
        json!({
            "call_type": "retrieve",
            "results": [
                {"content": "30 days", "location": {"type": "S3", "uri": "s3://docs/refunds.md"}},
                {"content": "5 days", "location": {"type": "S3", "uri": "s3://docs/shipping.md"}}
            ],
            "tags": ["prod", "prod", "eu"]
        }),
    ]
}

/// Ground truth for two applications; three rows belong to `kb-chat`.
pub const GROUND_TRUTH_CSV: &str = "\u{feff}app_name,gt_id,question,ground_truth\n\
kb-chat,gt-1,What is the refund window?,30 days\n\
kb-search,gt-2,Which regions ship free?,EU and US\n\
kb-chat,gt-3,\"How long is shipping, usually?\",Five business days\n\
kb-chat,gt-4,Do you ship to Canada?,Yes\n";

/// Thresholds for `kb-chat`.
pub const THRESHOLDS_JSON: &str =
    r#"{"faithfulness": 0.7, "answer_relevancy": 0.6, "context_recall": 0.5}"#;

/// A complete evaluation event for `kb-chat`.
pub fn eval_event(run_mode: &str) -> Value {
    json!({
        "runMode": run_mode,
        "execution_name": "nightly-2024-01-15",
        "application_name": "kb-chat",
        "kb_id": ["KB123"],
        "gen_model_id": "gen-model",
        "judge_model_id": "judge-model",
        "embed_model_id": "embed-model",
        "max_token": 512,
        "temperature": 0.2,
        "top_p": 0.9,
        "num_retriever_results": 5,
        "custom_tag": "release-7",
        "experiment_param": {"chunk_size": 300}
    })
}
