use std::sync::LazyLock;

use regex::Regex;

use crate::model::Identity;

static DIR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)_(.+)$").unwrap());
static FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)_(.+?)(?:\.[^.]+)?$").unwrap());
static MENUNO_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"menuno=(\d+)").unwrap());

/// Category identity from a directory name: `"287_이른둥이"` → `{287, "이른둥이"}`.
pub fn parse_category(dir_name: &str) -> Option<Identity> {
    capture_identity(&DIR_RE, dir_name.trim())
}

/// Page identity from a file name, trailing extension stripped.
pub fn parse_page(file_name: &str) -> Option<Identity> {
    capture_identity(&FILE_RE, file_name.trim())
}

/// `menuno` query parameter of a portal link.
pub fn menu_id_from_href(href: &str) -> Option<i64> {
    MENUNO_RE.captures(href)?.get(1)?.as_str().parse().ok()
}

fn capture_identity(re: &Regex, value: &str) -> Option<Identity> {
    let caps = re.captures(value)?;
    // Overflowing ids count as a mismatch.
    let id = caps[1].parse().ok()?;
    Some(Identity {
        id,
        name: caps[2].to_string(),
    })
}
