/// Agent sent to sites that only serve OGP tags to recognised crawlers.
pub const CRAWLER_USER_AGENT: &str =
    "facebookexternalhit/1.1 (+http://www.facebook.com/externalhit_uatext.php)";

/// Firefox on macOS.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 15.5; rv:141.0) Gecko/20100101 Firefox/141.0";

pub const YOUTUBE_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "youtu.be",
    "m.youtube.com",
    "music.youtube.com",
    "youtube.co.jp",
];

#[derive(Debug, Clone)]
struct OverrideRule {
    hosts: Vec<String>,
    agent: String,
}

/// Maps a host name to the `User-Agent` header used for every request made
/// on behalf of that host's page.
#[derive(Debug, Clone)]
pub struct UserAgentSelector {
    rules: Vec<OverrideRule>,
    default_agent: String,
}

impl Default for UserAgentSelector {
    fn default() -> Self {
        UserAgentSelector {
            rules: Vec::new(),
            default_agent: DEFAULT_USER_AGENT.to_string(),
        }
        .with_override(YOUTUBE_HOSTS, CRAWLER_USER_AGENT)
    }
}

impl UserAgentSelector {
    /// Register an override. Rules added later take precedence.
    pub fn with_override<S: AsRef<str>>(mut self, hosts: &[S], agent: &str) -> Self {
        self.rules.insert(
            0,
            OverrideRule {
                hosts: hosts.iter().map(|h| h.as_ref().to_string()).collect(),
                agent: agent.to_string(),
            },
        );
        self
    }

    /// `host` is a bare DNS name, without scheme or port.
    pub fn select(&self, host: &str) -> &str {
        self.rules
            .iter()
            .find(|rule| is_listed(&rule.hosts, host))
            .map(|rule| rule.agent.as_str())
            .unwrap_or(&self.default_agent)
    }
}

fn is_listed<S: AsRef<str>>(hosts: &[S], host: &str) -> bool {
    hosts.iter().any(|h| h.as_ref().eq_ignore_ascii_case(host))
}

/// Built-in table only.
pub fn select_user_agent(host: &str) -> &'static str {
    if is_listed(YOUTUBE_HOSTS, host) {
        CRAWLER_USER_AGENT
    } else {
        DEFAULT_USER_AGENT
    }
}
