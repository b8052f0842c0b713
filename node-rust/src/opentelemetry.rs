use crate::{
    api::{InvokeModelResponse, Usage},
    PromptNodeResult,
};
use opentelemetry::trace::Status;
use std::time::Instant;
use tracing::{info_span, Span};
use tracing_futures::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Span around one `InvokeModel` exchange, carrying `gen_ai.*` attributes.
pub struct InvokeSpan {
    span: Span,
    usage: Option<Usage>,
    stop_reason: Option<String>,
    start_time: Instant,
    max_tokens: u32,
    ended: bool,
}

impl InvokeSpan {
    pub fn new(provider: &str, model_id: &str, max_tokens: u32) -> Self {
        let span = info_span!("bedrock.invoke_model", model_id);
        span.set_attribute("gen_ai.operation.name", "chat");
        span.set_attribute("gen_ai.provider.name", provider.to_string());
        span.set_attribute("gen_ai.request.model", model_id.to_string());

        Self {
            span,
            usage: None,
            stop_reason: None,
            start_time: Instant::now(),
            max_tokens,
            ended: false,
        }
    }

    fn span(&self) -> Span {
        self.span.clone()
    }

    pub async fn instrument_future<F>(&self, future: F) -> F::Output
    where
        F: std::future::Future,
    {
        future.instrument(self.span()).await
    }

    pub fn on_response(&mut self, response: &InvokeModelResponse) {
        self.usage.clone_from(&response.usage);
        self.stop_reason.clone_from(&response.stop_reason);
    }

    pub fn on_error(&mut self, error: &(dyn std::error::Error + 'static)) {
        self.span
            .set_attribute("exception.message", error.to_string());
        self.span.set_status(Status::error(error.to_string()));
    }

    pub fn on_end(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;

        self.span
            .set_attribute("gen_ai.request.max_tokens", i64::from(self.max_tokens));

        if let Some(usage) = &self.usage {
            self.span
                .set_attribute("gen_ai.usage.input_tokens", i64::from(usage.input_tokens));
            self.span
                .set_attribute("gen_ai.usage.output_tokens", i64::from(usage.output_tokens));
        }

        if let Some(stop_reason) = self.stop_reason.take() {
            self.span
                .set_attribute("gen_ai.response.finish_reasons", stop_reason);
        }

        self.span.set_attribute(
            "bedrock.duration_seconds",
            self.start_time.elapsed().as_secs_f64(),
        );
    }
}

impl Drop for InvokeSpan {
    fn drop(&mut self) {
        self.on_end();
    }
}

/// Run `f` inside an [`InvokeSpan`], recording usage or the error on the
/// span.
pub async fn trace_invoke<F, Fut>(
    provider: &str,
    model_id: &str,
    max_tokens: u32,
    f: F,
) -> PromptNodeResult<InvokeModelResponse>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = PromptNodeResult<InvokeModelResponse>>,
{
    let mut span = InvokeSpan::new(provider, model_id, max_tokens);
    let result = span.instrument_future(f()).await;

    match &result {
        Ok(response) => span.on_response(response),
        Err(error) => span.on_error(error),
    }

    span.on_end();
    result
}
