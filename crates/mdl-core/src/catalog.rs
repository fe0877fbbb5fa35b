//! Built-in model alias catalog.
//!
//! Short names for common GGUF quants so `mdl model qwen3-8b` works without
//! knowing the repo layout. Each alias maps to one file in a Hugging Face
//! repo; single-model downloads run with concurrency 1.

use crate::hf;
use crate::scheduler::DownloadRequest;

/// One catalog entry: alias, repo, and the repo-relative file to fetch.
#[derive(Debug, Clone, Copy)]
pub struct ModelSpec {
    pub alias: &'static str,
    pub repo: &'static str,
    pub file: &'static str,
    pub about: &'static str,
}

pub const MODELS: &[ModelSpec] = &[
    ModelSpec {
        alias: "llama3.2-1b",
        repo: "bartowski/Llama-3.2-1B-Instruct-GGUF",
        file: "Llama-3.2-1B-Instruct-Q4_K_M.gguf",
        about: "Meta Llama 3.2 1B Instruct, Q4_K_M",
    },
    ModelSpec {
        alias: "llama3.2-3b",
        repo: "bartowski/Llama-3.2-3B-Instruct-GGUF",
        file: "Llama-3.2-3B-Instruct-Q4_K_M.gguf",
        about: "Meta Llama 3.2 3B Instruct, Q4_K_M",
    },
    ModelSpec {
        alias: "qwen3-4b",
        repo: "Qwen/Qwen3-4B-GGUF",
        file: "Qwen3-4B-Q4_K_M.gguf",
        about: "Qwen3 4B, Q4_K_M",
    },
    ModelSpec {
        alias: "qwen3-8b",
        repo: "Qwen/Qwen3-8B-GGUF",
        file: "Qwen3-8B-Q4_K_M.gguf",
        about: "Qwen3 8B, Q4_K_M",
    },
    ModelSpec {
        alias: "gemma3-4b",
        repo: "bartowski/google_gemma-3-4b-it-GGUF",
        file: "google_gemma-3-4b-it-Q4_K_M.gguf",
        about: "Google Gemma 3 4B instruct, Q4_K_M",
    },
    ModelSpec {
        alias: "phi4",
        repo: "bartowski/phi-4-GGUF",
        file: "phi-4-Q4_K_M.gguf",
        about: "Microsoft Phi-4 14B, Q4_K_M",
    },
    ModelSpec {
        alias: "mistral-7b",
        repo: "bartowski/Mistral-7B-Instruct-v0.3-GGUF",
        file: "Mistral-7B-Instruct-v0.3-Q4_K_M.gguf",
        about: "Mistral 7B Instruct v0.3, Q4_K_M",
    },
    ModelSpec {
        alias: "deepseek-r1-7b",
        repo: "bartowski/DeepSeek-R1-Distill-Qwen-7B-GGUF",
        file: "DeepSeek-R1-Distill-Qwen-7B-Q4_K_M.gguf",
        about: "DeepSeek R1 distill of Qwen 7B, Q4_K_M",
    },
    ModelSpec {
        alias: "smollm2-1.7b",
        repo: "bartowski/SmolLM2-1.7B-Instruct-GGUF",
        file: "SmolLM2-1.7B-Instruct-Q4_K_M.gguf",
        about: "SmolLM2 1.7B Instruct, Q4_K_M",
    },
];

/// Looks an alias up, case-insensitively.
pub fn find(alias: &str) -> Option<&'static ModelSpec> {
    MODELS.iter().find(|m| m.alias.eq_ignore_ascii_case(alias))
}

/// Download request for a catalog entry.
pub fn to_request(model: &ModelSpec) -> DownloadRequest {
    DownloadRequest::new(hf::resolve_url(model.repo, model.file)).with_name(model.file)
}
