//! Request parameter selection by model family.
//!
//! Total over all model names: recognized families get their own limits,
//! everything else falls back to the qwen/deepseek defaults.

/// Recognized model families, matched by substring of the model name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    Gpt,
    Claude,
    QwenDeepseek,
    Unknown,
}

impl ModelFamily {
    /// Short label used in logs and error messages.
    pub fn label(self) -> &'static str {
        match self {
            ModelFamily::Gpt => "gpt",
            ModelFamily::Claude => "claude",
            ModelFamily::QwenDeepseek => "qwen-deepseek",
            ModelFamily::Unknown => "compatible",
        }
    }
}

/// Completion request parameters resolved for one model name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelParams {
    pub family: ModelFamily,
    pub max_tokens: u32,
    pub temperature: f64,
}

/// Select request parameters for `model_name`, case-insensitively.
///
/// gpt models run near-deterministic, claude gets a short completion
/// budget, qwen and deepseek get the large budget that also serves as the
/// fallback for unrecognized names.
pub fn params_for_model(model_name: &str) -> ModelParams {
    let name = model_name.to_lowercase();
    if name.contains("gpt") {
        ModelParams { family: ModelFamily::Gpt, max_tokens: 8192, temperature: 0.01 }
    } else if name.contains("claude") {
        ModelParams { family: ModelFamily::Claude, max_tokens: 2000, temperature: 0.7 }
    } else if name.contains("qwen") || name.contains("deepseek") {
        ModelParams { family: ModelFamily::QwenDeepseek, max_tokens: 16000, temperature: 0.1 }
    } else {
        ModelParams { family: ModelFamily::Unknown, max_tokens: 16000, temperature: 0.1 }
    }
}
