use url::Url;

const PROFILE_HOSTS: &[&str] = &["x.com", "twitter.com"];

/// First path segments that belong to site navigation rather than accounts.
const NON_PROFILE_SEGMENTS: &[&str] = &[
    "home",
    "explore",
    "messages",
    "notifications",
    "settings",
    "i",
    "compose",
    "search",
    "login",
    "signup",
    "tos",
    "privacy",
    "about",
    "help",
    "account",
];

fn host_allowed(url: &Url) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    PROFILE_HOSTS.iter().any(|allowed| {
        host == *allowed
            || host
                .strip_suffix(*allowed)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

/// Host-only check used before the page is even asked for data.
pub fn is_supported_host(location: &str) -> bool {
    Url::parse(location).is_ok_and(|url| host_allowed(&url))
}

/// Whether `location` can be an account profile: a supported host and a
/// first path segment that is not a navigation section.
pub fn is_profile_page(location: &str) -> bool {
    let Ok(url) = Url::parse(location) else {
        return false;
    };
    if !host_allowed(&url) {
        return false;
    }

    let Some(first) = url
        .path_segments()
        .and_then(|mut segments| segments.find(|segment| !segment.is_empty()))
    else {
        return false;
    };

    let first = first.to_ascii_lowercase();
    !NON_PROFILE_SEGMENTS.contains(&first.as_str())
}
