//! Comment Tag Parser
//!
//! Share ownership is recorded in the volume comment by the share service,
//! e.g. `share_id: <uuid>, share_name: <name>, project: <project id>`.
//! Keys are matched in any order and each one is optional. Unknown keys are
//! skipped. At most three `key: value` tokens are scanned.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

/// `key: value` token; ASCII word characters, values may contain hyphens
static TAG_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"((?-u:\w)+):[ \t]*((?-u:[\w-])+)").expect("Invalid share tag regex")
});

/// Maximum number of tokens scanned per comment
pub const MAX_TAG_TOKENS: usize = 3;

pub const SHARE_ID_KEY: &str = "share_id";
pub const SHARE_NAME_KEY: &str = "share_name";
pub const PROJECT_KEY: &str = "project";

/// Share ownership parsed from a volume comment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareTag {
    pub share_id: String,
    pub share_name: String,
    pub project_id: String,
}

impl ShareTag {
    /// Render the present fields in canonical comment form
    pub fn to_comment(&self) -> String {
        [
            (SHARE_ID_KEY, &self.share_id),
            (SHARE_NAME_KEY, &self.share_name),
            (PROJECT_KEY, &self.project_id),
        ]
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// Parse the share tag out of a volume comment
///
/// A non-empty comment lacking `share_id` or `project` logs a warning; the
/// missing field is left empty. An empty comment is silently untagged.
pub fn parse_tag(comment: &str) -> ShareTag {
    let mut tag = ShareTag::default();

    for token in TAG_TOKEN.captures_iter(comment).take(MAX_TAG_TOKENS) {
        let value = &token[2];
        match &token[1] {
            SHARE_ID_KEY => tag.share_id = value.to_string(),
            SHARE_NAME_KEY => tag.share_name = value.to_string(),
            PROJECT_KEY => tag.project_id = value.to_string(),
            other => trace!(key = other, "ignoring unknown comment key"),
        }
    }

    if !comment.is_empty() {
        if tag.share_id.is_empty() {
            warn!(comment, "share_id not found in volume comment");
        }
        if tag.project_id.is_empty() {
            warn!(comment, "project not found in volume comment");
        }
    }

    tag
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filer::testing::CapturedEvents;
    use tracing::Level;

    #[test]
    fn test_parse_tag_without_share_name() {
        let tag = parse_tag(
            "share_id: 193b4209-2ef0-4752-a262-261b9fa27b25 in project: 631a3518e93d436fbdf57525babe8606",
        );
        assert_eq!(tag.share_id, "193b4209-2ef0-4752-a262-261b9fa27b25");
        assert_eq!(tag.share_name, "");
        assert_eq!(tag.project_id, "631a3518e93d436fbdf57525babe8606");
    }

    #[test]
    fn test_parse_tag_full() {
        let tag = parse_tag(
            "share_id: 69fe1228-360c-4063-8f29-3a5bfb6d9772, share_name: c_blackbox_1553028005, project: d940aae3f8084f15a9b67de5b3b39720",
        );
        assert_eq!(tag.share_id, "69fe1228-360c-4063-8f29-3a5bfb6d9772");
        assert_eq!(tag.share_name, "c_blackbox_1553028005");
        assert_eq!(tag.project_id, "d940aae3f8084f15a9b67de5b3b39720");
    }

    #[test]
    fn test_parse_tag_any_order_and_subset() {
        let tag = parse_tag("project: p-1, share_id: s-1");
        assert_eq!(
            tag,
            ShareTag {
                share_id: "s-1".into(),
                share_name: String::new(),
                project_id: "p-1".into(),
            }
        );

        let tag = parse_tag("share_name: backup_01");
        assert_eq!(tag.share_name, "backup_01");
        assert!(tag.share_id.is_empty());
        assert!(tag.project_id.is_empty());
    }

    #[test]
    fn test_parse_tag_ignores_unknown_keys() {
        let tag = parse_tag("owner: ops, share_id: s-2, project: p-2");
        assert_eq!(tag.share_id, "s-2");
        assert_eq!(tag.project_id, "p-2");
    }

    #[test]
    fn test_parse_tag_scans_three_tokens() {
        // The fourth token is never reached
        let tag = parse_tag("owner: ops, env: prod, share_id: s-3, project: p-3");
        assert_eq!(tag.share_id, "s-3");
        assert!(tag.project_id.is_empty());
    }

    #[test]
    fn test_parse_tag_empty_and_garbage() {
        assert_eq!(parse_tag(""), ShareTag::default());
        assert_eq!(parse_tag("created by hand, do not delete"), ShareTag::default());
    }

    #[test]
    fn test_parse_tag_round_trips_canonical_form() {
        let fields = [
            "69fe1228-360c-4063-8f29-3a5bfb6d9772",
            "c_blackbox_1553028005",
            "d940aae3f8084f15a9b67de5b3b39720",
        ];

        for mask in 1..8u8 {
            let pick = |bit: u8| {
                if mask & (1 << bit) != 0 {
                    fields[bit as usize].to_string()
                } else {
                    String::new()
                }
            };
            let tag = ShareTag {
                share_id: pick(0),
                share_name: pick(1),
                project_id: pick(2),
            };

            let comment = tag.to_comment();
            assert_eq!(parse_tag(&comment), tag, "comment {:?}", comment);
        }
    }

    #[test]
    fn test_parse_tag_permuted_order() {
        let tag = parse_tag(
            "project: d940aae3f8084f15a9b67de5b3b39720, share_name: c_blackbox_1553028005, share_id: 69fe1228-360c-4063-8f29-3a5bfb6d9772",
        );
        assert_eq!(
            tag.to_comment(),
            "share_id: 69fe1228-360c-4063-8f29-3a5bfb6d9772, share_name: c_blackbox_1553028005, project: d940aae3f8084f15a9b67de5b3b39720"
        );
        assert_eq!(parse_tag(&tag.to_comment()), tag);
    }

    #[test]
    fn test_parse_tag_value_stays_on_its_line() {
        let tag = parse_tag("share_id: s-6, share_name:\nproject: p-6");
        assert_eq!(tag.share_id, "s-6");
        assert_eq!(tag.share_name, "");
        assert_eq!(tag.project_id, "p-6");
    }

    #[test]
    fn test_parse_tag_words_are_ascii() {
        let tag = parse_tag("share_name: café, share_id: s-7, project: p-7");
        assert_eq!(tag.share_name, "caf");
        assert_eq!(tag.share_id, "s-7");
        assert_eq!(tag.project_id, "p-7");
    }

    #[test]
    fn test_partial_tag_warns() {
        let captured = CapturedEvents::default();
        tracing::subscriber::with_default(captured.subscriber(), || {
            parse_tag("share_id: s-4");
        });

        let warnings = captured.matching(Level::WARN, "not found in volume comment");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("project"));
    }

    #[test]
    fn test_empty_comment_does_not_warn() {
        let captured = CapturedEvents::default();
        tracing::subscriber::with_default(captured.subscriber(), || {
            parse_tag("");
        });

        assert!(captured.matching(Level::WARN, "").is_empty());
    }
}
