//! Path helpers for the keyed store: `<collection>/<id>` addressing and key rules.

/// Characters the remote store forbids inside a key segment.
const FORBIDDEN: [char; 5] = ['.', '#', '$', '[', ']'];

/// Normalize a slash path: backslashes become '/', empty, "." and ".." segments are dropped.
pub fn normalize(raw: &str) -> String {
    segments(raw).join("/")
}

/// Split a path into its normalized segments.
pub fn segments(raw: &str) -> Vec<String> {
    raw.replace('\\', "/")
        .split('/')
        .map(|p| p.trim())
        .filter(|p| !p.is_empty() && *p != "." && *p != "..")
        .map(|p| p.to_string())
        .collect()
}

/// True if every segment is a legal key and there is at least one.
pub fn is_valid_path(raw: &str) -> bool {
    let segs = segments(raw);
    !segs.is_empty() && segs.iter().all(|s| !s.contains(|c| FORBIDDEN.contains(&c) || c.is_control()))
}

/// Path of a record inside its collection.
pub fn record_path(collection: &str, id: &str) -> String {
    let base = normalize(collection);
    if base.is_empty() { normalize(id) } else { format!("{}/{}", base, normalize(id)) }
}

/// True if `a` equals `b` or one is an ancestor of the other.
pub fn overlaps(a: &str, b: &str) -> bool {
    let sa = segments(a);
    let sb = segments(b);
    sa.iter().zip(sb.iter()).all(|(x, y)| x == y)
}
