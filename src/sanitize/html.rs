//! Allow-list HTML filtering for text leaves.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// `<script>` blocks including their content, plus stray open/close tags.
static SCRIPT_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<script\b[^>]*>|</script\s*>")
        .expect("script pattern")
});

/// Inline event-handler attributes inside a tag (`onclick=...`).
static EVENT_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\son[a-z]+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#).expect("event attr pattern")
});

/// Executable URI schemes.
static EXEC_URI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:javascript|vbscript)\s*:|data\s*:\s*text/html").expect("uri pattern"));

/// Any remaining tag; capture group 1 is the tag name.
static TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)</?([a-z][a-z0-9-]*)\b[^>]*>").expect("tag pattern"));

/// Allow-list policy for [`scrub_text`]. Empty by default: plain text only.
#[derive(Debug, Clone, Default)]
pub struct SanitizePolicy {
    allowed_tags: HashSet<String>,
}

impl SanitizePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Permit a tag to survive scrubbing. Event-handler attributes and
    /// executable URIs are still removed from permitted tags.
    pub fn allow_tag(mut self, tag: &str) -> Self {
        self.allowed_tags.insert(tag.to_ascii_lowercase());
        self
    }

    pub fn allows(&self, tag: &str) -> bool {
        self.allowed_tags.contains(&tag.to_ascii_lowercase())
    }
}

/// Strip unsafe markup from a text leaf.
///
/// Removes `<script>` blocks with their content, every tag not on the
/// allow-list, event-handler attributes and executable URI schemes.
/// Rewriting only deletes, so each pass shrinks the input; the passes are
/// iterated until a fixpoint so reassembled payloads (`<scr<script>ipt>`)
/// do not survive.
pub fn scrub_text(input: &str, policy: &SanitizePolicy) -> String {
    let mut current = input.to_string();
    loop {
        let next = scrub_pass(&current, policy);
        if next == current {
            return next;
        }
        current = next;
    }
}

fn scrub_pass(input: &str, policy: &SanitizePolicy) -> String {
    let without_scripts = SCRIPT_BLOCK.replace_all(input, "");

    let stripped = TAG.replace_all(&without_scripts, |caps: &Captures<'_>| {
        if policy.allows(&caps[1]) {
            let kept = EVENT_ATTR.replace_all(&caps[0], "");
            EXEC_URI.replace_all(&kept, "").into_owned()
        } else {
            String::new()
        }
    });

    EXEC_URI.replace_all(&stripped, "").into_owned()
}
