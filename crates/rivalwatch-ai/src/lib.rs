pub mod error;
pub mod models;
pub mod prompt;
pub mod providers;
pub mod summary;

pub use providers::openai::OpenAIProvider;
pub use summary::{
    generate_landscape, generate_positioning, strip_json_fences, DEFAULT_LANDSCAPE,
};

use async_trait::async_trait;

/// 一次文本生成请求
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// 可选的 system 提示
    pub system: Option<String>,
    pub prompt: String,
    /// 覆盖 provider 默认值
    pub temperature: Option<f32>,
    pub max_tokens: Option<usize>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_limits(mut self, temperature: f32, max_tokens: usize) -> Self {
        self.temperature = Some(temperature);
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// 文本生成后端（OpenAI 兼容接口）
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn provider(&self) -> &str;

    fn model_name(&self) -> &str;

    /// 返回生成的纯文本（已去除首尾空白）
    async fn generate(&self, request: &GenerationRequest) -> error::Result<String>;
}
