use std::path::PathBuf;

/// Environment variable overriding the data file location.
pub const DATA_PATH_ENV: &str = "EXCHANGE_STATS_DATA";
/// Environment variable naming the department selected at start-up.
pub const DEPARTMENT_ENV: &str = "EXCHANGE_STATS_DEPARTMENT";

pub const DEFAULT_DATA_PATH: &str = "./data/ntu_exchange.csv";
pub const DEFAULT_DEPARTMENT: &str = "經濟學系";

pub const WINDOW_SIZE: [f32; 2] = [1280.0, 860.0];
pub const MIN_WINDOW_SIZE: [f32; 2] = [720.0, 480.0];

// ---------------------------------------------------------------------------
// Viewer configuration
// ---------------------------------------------------------------------------

/// Start-up settings, resolved once in `main`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerConfig {
    /// File opened at start-up (first CLI argument, then env, then default).
    pub data_path: PathBuf,
    /// Department selected after a load, if the dataset has it.
    pub preferred_department: String,
}

impl ViewerConfig {
    pub fn from_env() -> Self {
        Self::resolve(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    fn resolve(
        mut args: impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let non_blank = |v: &String| !v.trim().is_empty();
        let data_path = args
            .next()
            .filter(non_blank)
            .or_else(|| env(DATA_PATH_ENV).filter(non_blank))
            .unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());

        let preferred_department = env(DEPARTMENT_ENV)
            .filter(non_blank)
            .unwrap_or_else(|| DEFAULT_DEPARTMENT.to_string());

        ViewerConfig {
            data_path: PathBuf::from(data_path),
            preferred_department,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let cfg = ViewerConfig::resolve(std::iter::empty(), env_of(&[]));
        assert_eq!(cfg.data_path, PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(cfg.preferred_department, DEFAULT_DEPARTMENT);
    }

    #[test]
    fn argument_wins_over_env() {
        let env = env_of(&[(DATA_PATH_ENV, "/env.csv"), (DEPARTMENT_ENV, "歷史學系")]);
        let cfg = ViewerConfig::resolve(vec!["/arg.csv".to_string()].into_iter(), env);
        assert_eq!(cfg.data_path, PathBuf::from("/arg.csv"));
        assert_eq!(cfg.preferred_department, "歷史學系");

        let cfg = ViewerConfig::resolve(std::iter::empty(), env_of(&[(DATA_PATH_ENV, "/env.csv")]));
        assert_eq!(cfg.data_path, PathBuf::from("/env.csv"));
    }

    #[test]
    fn blank_argument_falls_back_to_env() {
        let env = env_of(&[(DATA_PATH_ENV, "/env.csv"), (DEPARTMENT_ENV, "  ")]);
        let cfg = ViewerConfig::resolve(vec!["  ".to_string()].into_iter(), env);
        assert_eq!(cfg.data_path, PathBuf::from("/env.csv"));
        assert_eq!(cfg.preferred_department, DEFAULT_DEPARTMENT);

        let env = env_of(&[(DATA_PATH_ENV, "")]);
        let cfg = ViewerConfig::resolve(vec![String::new()].into_iter(), env);
        assert_eq!(cfg.data_path, PathBuf::from(DEFAULT_DATA_PATH));
    }
}
