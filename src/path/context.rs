use std::collections::HashMap;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::env::PathEnvironment;
use super::manifest::parse_class_path;

/// Logical id of the embedded manifest that declares extra search paths.
pub const MANIFEST_RESOURCE: &str = "manifest.mf";

/// How the process was deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Running from loose files or multiple search-path entries.
    Standalone,
    /// Running from a single packaged archive.
    Packaged,
}

/// Read access to resources bundled inside the packaged archive.
///
/// The packaged archive is an external collaborator; this trait is the
/// seam through which its contents are read. Hosts typically back it
/// with `include_bytes!` data or an archive reader of their choosing.
pub trait EmbeddedResources: Send + Sync {
    /// Opens the embedded resource with the given logical id, or `None`
    /// if no such resource is bundled.
    fn open(&self, logical_id: &str) -> Option<Box<dyn Read + Send>>;
}

/// An embedded-resource source with no resources at all.
#[derive(Debug, Default)]
pub struct NoEmbeddedResources;

impl EmbeddedResources for NoEmbeddedResources {
    fn open(&self, _logical_id: &str) -> Option<Box<dyn Read + Send>> {
        None
    }
}

/// Embedded resources backed by an in-memory map, for hosts that bundle
/// resource bytes into the binary.
#[derive(Debug, Default)]
pub struct StaticResources {
    entries: HashMap<String, Vec<u8>>,
}

impl StaticResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers resource bytes under a logical id.
    pub fn with(mut self, logical_id: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.entries.insert(logical_id.into(), bytes.into());
        self
    }
}

impl EmbeddedResources for StaticResources {
    fn open(&self, logical_id: &str) -> Option<Box<dyn Read + Send>> {
        self.entries
            .get(logical_id)
            .map(|bytes| Box::new(Cursor::new(bytes.clone())) as Box<dyn Read + Send>)
    }
}

/// Process-scoped resource context: run-mode detection and search-path
/// resolution over one [`PathEnvironment`].
///
/// Replaces the hidden process-wide caches such a subsystem tends to
/// grow: the run mode and the manifest-declared path list are memoized
/// per context instance, so tests construct a fresh context instead of
/// resetting global state.
pub struct ResourceContext {
    env: PathEnvironment,
    resources: Box<dyn EmbeddedResources>,
    run_mode: OnceLock<RunMode>,
    extra_paths: OnceLock<Vec<String>>,
}

impl std::fmt::Debug for ResourceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceContext")
            .field("env", &self.env)
            .field("run_mode", &self.run_mode)
            .field("extra_paths", &self.extra_paths)
            .finish_non_exhaustive()
    }
}

impl ResourceContext {
    /// Creates a context with no embedded resources.
    pub fn new(env: PathEnvironment) -> Self {
        Self::with_resources(env, NoEmbeddedResources)
    }

    /// Creates a context over the given embedded-resource source.
    pub fn with_resources(env: PathEnvironment, resources: impl EmbeddedResources + 'static) -> Self {
        Self {
            env,
            resources: Box::new(resources),
            run_mode: OnceLock::new(),
            extra_paths: OnceLock::new(),
        }
    }

    pub fn env(&self) -> &PathEnvironment {
        &self.env
    }

    /// Whether the process runs from a single packaged archive.
    ///
    /// Computed once and cached for the lifetime of the context. The
    /// classification is a best-effort heuristic, not a guarantee: a
    /// packaged launch exposes exactly one search-path entry (the
    /// archive itself) and a launch command mentioning it. Anything
    /// ambiguous classifies as standalone so resource lookup falls back
    /// to plain search-path resolution.
    pub fn is_packaged(&self) -> bool {
        self.run_mode() == RunMode::Packaged
    }

    /// The memoized run mode. See [`is_packaged`](Self::is_packaged).
    pub fn run_mode(&self) -> RunMode {
        *self.run_mode.get_or_init(|| self.detect_run_mode())
    }

    fn detect_run_mode(&self) -> RunMode {
        let paths = self.env.search_paths();
        if paths.len() != 1 {
            return RunMode::Standalone;
        }
        let command = self.env.launch_command().trim();
        if !command.is_empty() && command.contains(paths[0].as_str()) {
            RunMode::Packaged
        } else {
            RunMode::Standalone
        }
    }

    /// The effective search-path list: the raw entries, extended in
    /// packaged mode with the manifest-declared extras.
    pub fn effective_search_paths(&self) -> Vec<String> {
        let mut paths = self.env.search_paths().to_vec();
        if self.is_packaged() {
            paths.extend(self.extra_search_paths().iter().cloned());
        }
        paths
    }

    /// Paths declared by the embedded manifest's `Class-Path:` header.
    ///
    /// Parsed once and cached. A missing or malformed manifest yields an
    /// empty list, never an error.
    pub fn extra_search_paths(&self) -> &[String] {
        self.extra_paths.get_or_init(|| {
            match self.resources.open(MANIFEST_RESOURCE) {
                Some(reader) => parse_class_path(BufReader::new(reader)),
                None => Vec::new(),
            }
        })
    }

    /// Effective search-path entries that are not archives themselves.
    pub fn non_archive_search_paths(&self) -> Vec<String> {
        self.effective_search_paths()
            .into_iter()
            .filter(|entry| !self.env.is_archive_entry(entry))
            .collect()
    }

    /// Resolves a logical resource id to its on-disk location: the first
    /// effective search-path entry containing it as a regular file.
    ///
    /// Returns `None` when the resource exists only inside the packaged
    /// archive (or nowhere); absence is represented, never signaled as a
    /// failure.
    pub fn resolve(&self, logical_id: &str) -> Option<PathBuf> {
        for entry in self.effective_search_paths() {
            if self.env.is_archive_entry(&entry) {
                continue;
            }
            let candidate = self.absolutize(Path::new(&entry)).join(logical_id);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }

    /// Containing directory of the packaged archive, when packaged.
    pub fn archive_dir(&self) -> Option<PathBuf> {
        if !self.is_packaged() {
            return None;
        }
        let archive = self.env.search_paths().first()?;
        self.absolutize(Path::new(archive))
            .parent()
            .map(Path::to_path_buf)
    }

    /// Opens an embedded resource bundled inside the archive.
    pub fn open_embedded(&self, logical_id: &str) -> Option<Box<dyn Read + Send>> {
        self.resources.open(logical_id)
    }

    fn absolutize(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.env.work_dir().join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn context(paths: Vec<&str>, command: &str) -> ResourceContext {
        let env = PathEnvironment::new(
            paths.into_iter().map(str::to_string).collect(),
            "/tmp",
            command,
        );
        ResourceContext::new(env)
    }

    #[test]
    fn test_single_entry_matching_command_is_packaged() {
        let ctx = context(vec!["app.zip"], "runtime app.zip --serve");
        assert_eq!(ctx.run_mode(), RunMode::Packaged);
        assert!(ctx.is_packaged());
    }

    #[test]
    fn test_multiple_entries_are_standalone_regardless_of_command() {
        let ctx = context(vec!["app.zip", "conf"], "runtime app.zip");
        assert_eq!(ctx.run_mode(), RunMode::Standalone);
    }

    #[test]
    fn test_blank_command_is_standalone() {
        let ctx = context(vec!["app.zip"], "   ");
        assert_eq!(ctx.run_mode(), RunMode::Standalone);
    }

    #[test]
    fn test_empty_search_path_is_standalone() {
        let ctx = context(vec![], "runtime app.zip");
        assert_eq!(ctx.run_mode(), RunMode::Standalone);
    }

    #[test]
    fn test_command_not_mentioning_entry_is_standalone() {
        let ctx = context(vec!["app.zip"], "runtime other.zip");
        assert_eq!(ctx.run_mode(), RunMode::Standalone);
    }

    #[test]
    fn test_run_mode_is_memoized() {
        let ctx = context(vec!["app.zip"], "runtime app.zip");
        assert_eq!(ctx.run_mode(), RunMode::Packaged);
        assert_eq!(ctx.run_mode(), RunMode::Packaged);
    }

    #[test]
    fn test_effective_paths_include_manifest_extras_when_packaged() {
        let resources =
            StaticResources::new().with(MANIFEST_RESOURCE, "Class-Path: lib/a.zip\n conf\n");
        let env = PathEnvironment::new(vec!["app.zip".to_string()], "/tmp", "runtime app.zip");
        let ctx = ResourceContext::with_resources(env, resources);

        assert_eq!(
            ctx.effective_search_paths(),
            vec!["app.zip", "lib/a.zip", "conf"]
        );
    }

    #[test]
    fn test_manifest_extras_ignored_when_standalone() {
        let resources =
            StaticResources::new().with(MANIFEST_RESOURCE, "Class-Path: lib/a.zip\n");
        let env = PathEnvironment::new(
            vec!["one".to_string(), "two".to_string()],
            "/tmp",
            "runtime",
        );
        let ctx = ResourceContext::with_resources(env, resources);

        assert_eq!(ctx.effective_search_paths(), vec!["one", "two"]);
    }

    #[test]
    fn test_missing_manifest_yields_empty_extras() {
        let ctx = context(vec!["app.zip"], "runtime app.zip");
        assert!(ctx.extra_search_paths().is_empty());
    }

    #[test]
    fn test_non_archive_paths_filter_archives() {
        let env = PathEnvironment::new(
            vec!["conf".to_string(), "lib/dep.zip".to_string()],
            "/tmp",
            "",
        );
        let ctx = ResourceContext::new(env);
        assert_eq!(ctx.non_archive_search_paths(), vec!["conf"]);
    }

    #[test]
    fn test_resolve_finds_first_matching_entry() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first");
        let second = dir.path().join("second");
        fs::create_dir_all(&first).unwrap();
        fs::create_dir_all(&second).unwrap();
        fs::write(second.join("app.properties"), "k=v\n").unwrap();

        let env = PathEnvironment::new(
            vec![
                first.to_string_lossy().into_owned(),
                second.to_string_lossy().into_owned(),
            ],
            dir.path(),
            "",
        );
        let ctx = ResourceContext::new(env);

        assert_eq!(
            ctx.resolve("app.properties"),
            Some(second.join("app.properties"))
        );
    }

    #[test]
    fn test_resolve_relative_entry_against_work_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("conf")).unwrap();
        fs::write(dir.path().join("conf/app.properties"), "k=v\n").unwrap();

        let env = PathEnvironment::new(vec!["conf".to_string()], dir.path(), "");
        let ctx = ResourceContext::new(env);

        assert_eq!(
            ctx.resolve("app.properties"),
            Some(dir.path().join("conf/app.properties"))
        );
    }

    #[test]
    fn test_resolve_absent_resource_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let env = PathEnvironment::new(
            vec![dir.path().to_string_lossy().into_owned()],
            dir.path(),
            "",
        );
        let ctx = ResourceContext::new(env);
        assert_eq!(ctx.resolve("missing.properties"), None);
    }

    #[test]
    fn test_archive_dir_is_parent_of_archive_entry() {
        let ctx = context(vec!["bundle/app.zip"], "runtime bundle/app.zip");
        assert_eq!(ctx.archive_dir(), Some(PathBuf::from("/tmp/bundle")));
    }

    #[test]
    fn test_archive_dir_none_when_standalone() {
        let ctx = context(vec!["a", "b"], "runtime");
        assert_eq!(ctx.archive_dir(), None);
    }
}
