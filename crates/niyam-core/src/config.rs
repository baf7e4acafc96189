use std::collections::HashMap;

use anyhow::{bail, Result};

/// Runtime configuration for a courtroom simulation.
/// Every key is read from the process environment first, then `.env`.
#[derive(Debug, Clone)]
pub struct Config {
    /// "gemini" (default) or "ollama".
    pub backend: String,
    pub model: String,
    pub google_api_key: String,
    pub gemini_base_url: String,
    pub ollama_base_url: String,
    /// Per-call completion timeout. 0 = wait indefinitely.
    pub completion_timeout_s: u64,
    pub judge_temperature: f32,
    pub defense_temperature: f32,

    // Simulation
    /// Parent directory of the per-run `courtroom_*` directories.
    pub simulation_dir: String,
    pub max_turns: u32,
    /// Conversation window bound. 0 = unbounded.
    pub history_limit: usize,
    pub next_hearing_cues: Vec<String>,
    pub closing_cues: Vec<String>,
}

fn parse_dotenv() -> HashMap<String, String> {
    let Ok(contents) = std::fs::read_to_string(".env") else {
        return HashMap::new();
    };
    parse_dotenv_str(&contents)
}

fn parse_dotenv_str(contents: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((k, v)) = line.split_once('=') {
            let v = v.trim().trim_matches('"');
            map.insert(k.trim().to_string(), v.to_string());
        }
    }
    map
}

fn get(key: &str, dotenv: &HashMap<String, String>) -> Option<String> {
    std::env::var(key).ok().or_else(|| dotenv.get(key).cloned())
}

fn get_str(key: &str, dotenv: &HashMap<String, String>, default: &str) -> String {
    get(key, dotenv).unwrap_or_else(|| default.to_string())
}

fn get_parsed<T: std::str::FromStr>(key: &str, dotenv: &HashMap<String, String>, default: T) -> T {
    get(key, dotenv)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn get_list(key: &str, dotenv: &HashMap<String, String>) -> Vec<String> {
    get_str(key, dotenv, "")
        .split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn resolve_tilde(path: &str) -> String {
    if path.starts_with("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return format!("{}/{}", home, path.strip_prefix("~/").unwrap_or(path));
        }
    }
    path.to_string()
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_sources(&parse_dotenv())
    }

    fn from_sources(dotenv: &HashMap<String, String>) -> Result<Self> {
        let backend = get_str("COMPLETION_BACKEND", dotenv, "gemini")
            .trim()
            .to_lowercase();
        let google_api_key = get_str("GOOGLE_API_KEY", dotenv, "");

        match backend.as_str() {
            "gemini" if google_api_key.is_empty() => {
                bail!("GOOGLE_API_KEY must be set when COMPLETION_BACKEND=gemini")
            },
            "gemini" | "ollama" => {},
            other => bail!("unknown COMPLETION_BACKEND '{other}' (expected gemini or ollama)"),
        }

        Ok(Config {
            backend,
            model: get_str("LLM_MODEL", dotenv, "gemini-2.5-pro"),
            google_api_key,
            gemini_base_url: get_str(
                "GEMINI_BASE_URL",
                dotenv,
                "https://generativelanguage.googleapis.com",
            ),
            ollama_base_url: get_str("OLLAMA_BASE_URL", dotenv, "http://localhost:11434"),
            completion_timeout_s: get_parsed("COMPLETION_TIMEOUT_S", dotenv, 0),
            judge_temperature: get_parsed("JUDGE_TEMPERATURE", dotenv, 0.3),
            defense_temperature: get_parsed("DEFENSE_TEMPERATURE", dotenv, 0.5),
            simulation_dir: resolve_tilde(&get_str("SIMULATION_DIR", dotenv, "data/simulations")),
            max_turns: get_parsed("MAX_TURNS", dotenv, 20),
            history_limit: get_parsed("HISTORY_LIMIT", dotenv, 0),
            next_hearing_cues: get_list("NEXT_HEARING_CUES", dotenv),
            closing_cues: get_list("CLOSING_CUES", dotenv),
        })
    }
}
