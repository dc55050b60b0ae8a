use std::env;
use std::path::PathBuf;

/// Platform path-list separator, as used in `PATH`-style variables.
#[cfg(windows)]
const PATH_SEPARATOR: char = ';';
#[cfg(not(windows))]
const PATH_SEPARATOR: char = ':';

/// Process-level search-path facts, exposed as plain data.
///
/// Everything the run-mode heuristic and the resource locator consume
/// comes from here, so tests and embedding hosts can inject a synthetic
/// environment instead of relying on the real process state.
#[derive(Debug, Clone)]
pub struct PathEnvironment {
    search_paths: Vec<String>,
    work_dir: PathBuf,
    launch_command: String,
    archive_extension: String,
}

impl PathEnvironment {
    /// Creates an environment from explicit values.
    pub fn new(
        search_paths: Vec<String>,
        work_dir: impl Into<PathBuf>,
        launch_command: impl Into<String>,
    ) -> Self {
        Self {
            search_paths,
            work_dir: work_dir.into(),
            launch_command: launch_command.into(),
            archive_extension: "zip".to_string(),
        }
    }

    /// Reads the environment from the running process.
    ///
    /// The search-path list comes from the environment variable named by
    /// `path_var`, split on the platform path separator. The launch
    /// command is the process argument list joined with spaces; it is
    /// best-effort input for the packaged-mode heuristic, nothing more.
    pub fn from_process(path_var: &str) -> Self {
        let raw = env::var(path_var).unwrap_or_default();
        let search_paths = split_path_list(&raw);
        let work_dir = env::current_dir().unwrap_or_default();
        let launch_command = env::args().collect::<Vec<_>>().join(" ");
        Self::new(search_paths, work_dir, launch_command)
    }

    /// Overrides the file extension that identifies the packaged archive
    /// (and archive-type search-path entries). Defaults to `"zip"`.
    pub fn with_archive_extension(mut self, extension: impl Into<String>) -> Self {
        self.archive_extension = extension.into();
        self
    }

    /// The raw search-path list, order preserved.
    pub fn search_paths(&self) -> &[String] {
        &self.search_paths
    }

    /// The process working directory.
    pub fn work_dir(&self) -> &PathBuf {
        &self.work_dir
    }

    /// How the process was launched, as a single string.
    pub fn launch_command(&self) -> &str {
        &self.launch_command
    }

    pub fn archive_extension(&self) -> &str {
        &self.archive_extension
    }

    /// Whether a search-path entry names an archive rather than a directory.
    pub fn is_archive_entry(&self, entry: &str) -> bool {
        entry.ends_with(&self.archive_extension)
    }
}

fn split_path_list(raw: &str) -> Vec<String> {
    raw.split(PATH_SEPARATOR)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    // Serializes tests that touch process environment variables.
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    #[test]
    fn test_split_path_list_drops_empty_segments() {
        let paths = split_path_list(&format!(
            "lib{sep}{sep}conf{sep}",
            sep = PATH_SEPARATOR
        ));
        assert_eq!(paths, vec!["lib".to_string(), "conf".to_string()]);
    }

    #[test]
    fn test_split_path_list_empty_input() {
        assert!(split_path_list("").is_empty());
    }

    #[test]
    fn test_from_process_reads_path_variable() {
        let _guard = ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap();
        std::env::set_var(
            "RESCONF_TEST_PATH",
            format!("a{sep}b", sep = PATH_SEPARATOR),
        );

        let env = PathEnvironment::from_process("RESCONF_TEST_PATH");
        assert_eq!(env.search_paths(), &["a".to_string(), "b".to_string()]);
        assert!(!env.launch_command().is_empty());

        std::env::remove_var("RESCONF_TEST_PATH");
    }

    #[test]
    fn test_from_process_missing_variable_yields_empty_list() {
        let _guard = ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap();
        std::env::remove_var("RESCONF_TEST_PATH_MISSING");

        let env = PathEnvironment::from_process("RESCONF_TEST_PATH_MISSING");
        assert!(env.search_paths().is_empty());
    }

    #[test]
    fn test_archive_entry_detection() {
        let env = PathEnvironment::new(vec![], "/tmp", "");
        assert!(env.is_archive_entry("bundle/app.zip"));
        assert!(!env.is_archive_entry("conf"));

        let env = env.with_archive_extension("pak");
        assert!(env.is_archive_entry("app.pak"));
        assert!(!env.is_archive_entry("app.zip"));
    }
}
