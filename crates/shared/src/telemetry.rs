use tracing::debug;

/// 1回のインタラクションのトレーシング情報
#[derive(Debug, Clone)]
pub struct InteractionTraceContext {
    pub command: String,
    pub invoker_id: String,
    pub request_id: String,
}

impl InteractionTraceContext {
    pub fn new(command: impl Into<String>, invoker_id: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            invoker_id: invoker_id.into(),
            request_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// インタラクション用のスパンを作成
pub fn create_interaction_span(trace_context: &InteractionTraceContext) -> tracing::Span {
    tracing::span!(
        tracing::Level::INFO,
        "interaction",
        command = %trace_context.command,
        invoker_id = %trace_context.invoker_id,
        request_id = %trace_context.request_id,
    )
}

/// ストア操作の所要時間を記録
pub fn record_store_operation(document: &str, operation: &str, started: std::time::Instant) {
    debug!(
        document = document,
        operation = operation,
        duration_ms = started.elapsed().as_millis() as u64,
        "Store operation completed"
    );
}

/// ハンドラー実行をスパン内で行い、開始と結果をログに残すマクロ
#[macro_export]
macro_rules! trace_interaction {
    ($trace_context:expr, $handler:expr) => {{
        use tracing::Instrument;

        let trace_context: &$crate::telemetry::InteractionTraceContext = &$trace_context;
        let span = $crate::telemetry::create_interaction_span(trace_context);

        async {
            tracing::info!("Interaction started");

            let result = $handler.await;

            match &result {
                Ok(_) => tracing::info!("Interaction completed successfully"),
                Err(e) => tracing::warn!(error = %e, "Interaction failed"),
            }

            result
        }
        .instrument(span)
        .await
    }};
}
