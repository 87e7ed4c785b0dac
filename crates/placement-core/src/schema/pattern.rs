use regex::Regex;
use std::sync::LazyLock;

static GITHUB_REPOSITORY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?(www\.)?github\.com/[a-zA-Z0-9_-]+/[a-zA-Z0-9_-]+/?$")
        .expect("github repository pattern is valid")
});

static WEB_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?|ftp)://[^\s/$.?#].[^\s]*$").expect("web url pattern is valid")
});

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.+@.+\..+$").expect("email pattern is valid"));

/// Named regular expressions usable from field tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    GithubRepository,
    WebUrl,
    Email,
}

impl Pattern {
    pub fn regex(&self) -> &'static Regex {
        match self {
            Pattern::GithubRepository => &GITHUB_REPOSITORY,
            Pattern::WebUrl => &WEB_URL,
            Pattern::Email => &EMAIL,
        }
    }

    /// Completes "must be ..." in violation messages.
    pub fn hint(&self) -> &'static str {
        match self {
            Pattern::GithubRepository => "a GitHub repository URL (github.com/<owner>/<repo>)",
            Pattern::WebUrl => "an http(s) or ftp URL",
            Pattern::Email => "a valid email address",
        }
    }
}
