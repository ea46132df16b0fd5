//! Path utilities shared by registration, lookup and reverse routing.

/// Registered path prefix marking a route that accepts any subdomain.
pub const SUBDOMAIN_WILDCARD: &str = "*.";

/// Placeholder substituted for each parameter in a formatted path.
pub const FORMAT_PLACEHOLDER: &str = "{}";

/// Normalize a path: collapse repeated `/`, resolve `.` and `..`, drop the
/// trailing `/` and make sure it is rooted.
///
/// ```
/// use brrtmux::path::clean_path;
///
/// assert_eq!(clean_path("api//v1/./users/../items/"), "/api/v1/items");
/// assert_eq!(clean_path("/.."), "/");
/// assert_eq!(clean_path(""), "/");
/// ```
#[must_use]
pub fn clean_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }
    let mut out = String::with_capacity(path.len() + 1);
    for s in segments {
        out.push('/');
        out.push_str(s);
    }
    out
}

/// Split a registered path into its subdomain selector and path.
///
/// Anything before the first `/` is the subdomain, kept with its trailing
/// dot (`admin.`, or [`SUBDOMAIN_WILDCARD`]). The path part is returned as
/// written; templates are cleaned after they are parsed.
///
/// ```
/// use brrtmux::path::split_subdomain_and_path;
///
/// assert_eq!(split_subdomain_and_path("admin./users"), ("admin.", "/users"));
/// assert_eq!(split_subdomain_and_path("*./"), ("*.", "/"));
/// assert_eq!(split_subdomain_and_path("/users"), ("", "/users"));
/// assert_eq!(split_subdomain_and_path(""), ("", "/"));
/// ```
#[must_use]
pub fn split_subdomain_and_path(full: &str) -> (&str, &str) {
    match full.find('/') {
        None if full.is_empty() => ("", "/"),
        None => (full, "/"),
        Some(0) => ("", full),
        Some(idx) => (&full[..idx], &full[idx..]),
    }
}

/// True when the registered subdomain is the dynamic `*.` form.
#[must_use]
pub fn is_wildcard_subdomain(subdomain: &str) -> bool {
    subdomain == SUBDOMAIN_WILDCARD
}

/// Join a party prefix and a relative template.
///
/// Only the joint is normalized, so parameter blocks in `relative` reach
/// the parser untouched.
#[must_use]
pub fn join_path(prefix: &str, relative: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let relative = relative.trim_start_matches('/');
    if relative.is_empty() {
        return if prefix.is_empty() {
            "/".to_string()
        } else {
            prefix.to_string()
        };
    }
    format!("{prefix}/{relative}")
}

/// Replace every `:name` / `*name` segment of a bare path with
/// [`FORMAT_PLACEHOLDER`].
#[must_use]
pub fn format_path(bare: &str) -> String {
    bare.split('/')
        .map(|segment| {
            if segment.starts_with([':', '*']) {
                FORMAT_PLACEHOLDER
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Drop the `:port` suffix of a host, if any.
#[must_use]
pub fn strip_port(host: &str) -> &str {
    // bracketed IPv6 literal
    if let Some(end) = host.find(']') {
        return &host[..=end];
    }
    match host.rfind(':') {
        Some(idx) if host[idx + 1..].bytes().all(|b| b.is_ascii_digit()) => &host[..idx],
        _ => host,
    }
}

/// Pick a URL scheme for a virtual host: `https` for port 443, else `http`.
#[must_use]
pub fn scheme_from_vhost(vhost: &str) -> &'static str {
    if vhost.starts_with("https://") || vhost.ends_with(":443") {
        "https"
    } else {
        "http"
    }
}
