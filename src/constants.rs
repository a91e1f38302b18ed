//! Central constants for the codesight application

/// Default values for configuration
pub mod config {
    /// Default configuration file name
    pub const DEFAULT_CONFIG_FILE: &str = "codesight.yaml";

    /// Directory holding materialized projects and persisted analyses
    pub const DEFAULT_PROJECTS_DIR: &str = "projects";

    /// Directory holding uploaded archives named `<projectId>.zip`
    pub const DEFAULT_UPLOADS_DIR: &str = "uploads";

    /// Append-only log of aborted operations
    pub const DEFAULT_ERROR_LOG: &str = "DEBUG_ERROR.txt";

    /// Suffix of the persisted analysis file next to the project directory
    pub const ANALYSIS_FILE_SUFFIX: &str = "_analysis.json";

    /// Suffix of the advisory lock file held while a project run is in flight
    pub const LOCK_FILE_SUFFIX: &str = ".lock";
}

/// Environment variables overriding directory settings
pub mod env {
    pub const PROJECTS_DIR: &str = "CODESIGHT_PROJECTS_DIR";
    pub const UPLOADS_DIR: &str = "CODESIGHT_UPLOADS_DIR";
    pub const ERROR_LOG: &str = "CODESIGHT_ERROR_LOG";
}

/// Limits enforced on uploaded and analyzed content
pub mod limits {
    /// Maximum archive size in bytes (50 MiB)
    pub const MAX_ARCHIVE_BYTES: u64 = 50 * 1024 * 1024;

    /// Maximum number of file entries inside an archive
    pub const MAX_ARCHIVE_FILES: usize = 5000;

    /// Maximum total declared uncompressed size of an archive (500 MiB)
    pub const MAX_UNCOMPRESSED_BYTES: u64 = 500 * 1024 * 1024;

    /// Seconds allowed for archive pre-validation
    pub const ARCHIVE_VALIDATION_TIMEOUT_SECS: u64 = 10;

    /// Deepest directory level that still gets its children listed
    pub const MAX_TREE_DEPTH: usize = 10;

    /// Maximum entries emitted per directory before the placeholder node
    pub const MAX_DIR_ENTRIES: usize = 50;

    /// Maximum number of source files a scan will visit
    pub const MAX_SOURCE_FILES: usize = 5000;

    /// Source files larger than this are not parsed for components
    pub const MAX_PARSE_BYTES: u64 = 1024 * 1024;

    /// End-to-end analysis budget in seconds
    pub const ANALYSIS_TIMEOUT_SECS: u64 = 60;

    /// Maximum number of files forwarded as feature context
    pub const MAX_CONTEXT_FILES: usize = 5;

    /// Characters of each context file included in the digest
    pub const CONTEXT_SNIPPET_CHARS: usize = 1200;

    /// Maximum accepted length of a project id
    pub const MAX_PROJECT_ID_LEN: usize = 64;
}

/// Default values for git operations
pub mod git {
    /// Seconds allowed for a single clone attempt
    pub const CLONE_ATTEMPT_TIMEOUT_SECS: u64 = 60;

    /// Clone attempts before giving up
    pub const CLONE_MAX_ATTEMPTS: u32 = 3;

    /// Base delay of the exponential backoff between attempts
    pub const CLONE_BACKOFF_BASE_SECS: u64 = 2;

    /// Transport options passed to `git clone`
    pub const CLONE_OPTIONS: &[&str] = &[
        "--depth",
        "1",
        "-c",
        "http.version=HTTP/1.1",
        "-c",
        "http.postBuffer=524288000",
        "-c",
        "http.lowSpeedLimit=1000",
        "-c",
        "http.lowSpeedTime=60",
    ];
}

/// Source discovery and resolution
pub mod source {
    /// Extensions treated as source files, without the leading dot
    pub const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx"];

    /// Suffixes probed when resolving an extensionless import, in order
    pub const RESOLVE_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".js", ".jsx"];

    /// Conventional entry points probed for module-graph resolution, in order
    pub const ENTRY_POINTS: &[&str] = &[
        "index.js",
        "index.ts",
        "src/index.js",
        "src/index.tsx",
        "src/main.tsx",
        "App.js",
        "App.tsx",
        "main.js",
        "main.ts",
    ];

    /// Directory names never descended into by any scan
    pub const EXCLUDED_DIRS: &[&str] = &["node_modules"];

    /// Additional names hidden from the file tree
    pub const TREE_EXCLUDED_NAMES: &[&str] = &["node_modules", "dist", "build"];
}

/// Retention of materialized projects
pub mod retention {
    /// Age in hours after which projects are swept
    pub const MAX_AGE_HOURS: u64 = 24;
}
