//! Process version metadata, fixed at startup.

use serde::Serialize;

/// Immutable build/version identity of the running process.
///
/// Read-only after construction; consumed verbatim by the version endpoint,
/// the health responses, and the `app_version_info` metric.
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub version: String,
    pub build_number: Option<String>,
    pub git_commit: Option<String>,
    pub git_branch: Option<String>,
    pub environment: Option<String>,
}

impl VersionInfo {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            build_number: None,
            git_commit: None,
            git_branch: None,
            environment: None,
        }
    }

    pub fn with_build(mut self, build_number: Option<String>) -> Self {
        self.build_number = build_number;
        self
    }

    pub fn with_commit(mut self, git_commit: Option<String>) -> Self {
        self.git_commit = git_commit;
        self
    }

    pub fn with_branch(mut self, git_branch: Option<String>) -> Self {
        self.git_branch = git_branch;
        self
    }

    pub fn with_environment(mut self, environment: Option<String>) -> Self {
        self.environment = environment;
        self
    }
}
