//! Field-level merge of the directory record and the public profile.

use super::Record;

use serde_json::Value;

pub const MEMBER_GLYPH: &str = "✅";
pub const NON_MEMBER_GLYPH: &str = "❌";

/// The candidate record handed to the output schema.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    pub fields: Record,
    /// Whether the handle was found in the directory snapshot.
    pub is_member: bool,
}

/// Merge the public profile with the directory entry for `handle`.
///
/// Layers, lowest precedence first:
/// 1. the public profile,
/// 2. the directory record, which wins every key it shares with the profile,
/// 3. the computed `isHubber` glyph and `recent` links.
///
/// `login` is then rebuilt as a link from the public profile's `login` (or
/// `handle` when the profile has none), and a null or absent
/// `twitter_username` is removed.
pub fn merge(directory: &[Value], handle: &str, public: Record) -> MergedRecord {
    let directory_record = find_directory_record(directory, handle);
    let is_member = directory_record.is_some();
    let login = public
        .get("login")
        .and_then(Value::as_str)
        .unwrap_or(handle)
        .to_string();

    let mut fields = Record::new();
    overlay(&mut fields, public);
    if let Some(record) = directory_record {
        overlay(&mut fields, record.clone());
    }
    fields.insert(
        "isHubber".into(),
        Value::String(membership_glyph(is_member).into()),
    );
    fields.insert("recent".into(), Value::String(recent_activity_links(handle)));

    if fields
        .get("twitter_username")
        .is_none_or(Value::is_null)
    {
        fields.remove("twitter_username");
    }

    fields.insert(
        "login".into(),
        Value::String(login_link(&login, handle, is_member)),
    );

    MergedRecord { fields, is_member }
}

/// Find the snapshot entry whose `github_login` is exactly `handle`.
fn find_directory_record<'a>(directory: &'a [Value], handle: &str) -> Option<&'a Record> {
    if handle.is_empty() {
        return None;
    }

    directory
        .iter()
        .filter_map(Value::as_object)
        .find(|record| record.get("github_login").and_then(Value::as_str) == Some(handle))
}

fn overlay(target: &mut Record, layer: Record) {
    for (key, value) in layer {
        target.insert(key, value);
    }
}

fn membership_glyph(is_member: bool) -> &'static str {
    if is_member {
        MEMBER_GLYPH
    } else {
        NON_MEMBER_GLYPH
    }
}

fn recent_activity_links(handle: &str) -> String {
    let author = urlencoding::encode(handle);
    format!(
        "[issues](https://github.com/search?q=author%3A{author}&type=issues&s=created&o=desc) &#x7c; \
         [pull requests](https://github.com/search?q=author%3A{author}&type=pullrequests&s=created&o=desc) &#x7c; \
         [commits](https://github.com/search?q=author%3A{author}&type=commits&s=committer-date&o=desc)"
    )
}

fn login_link(login: &str, handle: &str, is_member: bool) -> String {
    let profile = format!("[@{login}](https://github.com/{login})");
    if is_member {
        format!("{profile} ([{handle}@github.com](mailto:{handle}@github.com))")
    } else {
        profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().expect("test record must be an object")
    }

    fn directory(value: Value) -> Vec<Value> {
        value.as_array().cloned().expect("test directory must be an array")
    }

    #[test]
    fn non_member_gets_cross_and_plain_login_link() {
        let merged = merge(
            &[],
            "octocat",
            record(json!({"login": "octocat", "name": "The Octocat"})),
        );

        assert!(!merged.is_member);
        assert_eq!(merged.fields["isHubber"], NON_MEMBER_GLYPH);
        assert_eq!(
            merged.fields["login"],
            "[@octocat](https://github.com/octocat)"
        );
    }

    #[test]
    fn member_gets_check_and_mailto() {
        let merged = merge(
            &directory(json!([{"github_login": "mona", "title": "Engineer"}])),
            "mona",
            record(json!({"login": "mona"})),
        );

        assert!(merged.is_member);
        assert_eq!(merged.fields["isHubber"], MEMBER_GLYPH);
        assert_eq!(
            merged.fields["login"],
            "[@mona](https://github.com/mona) ([mona@github.com](mailto:mona@github.com))"
        );
        assert_eq!(merged.fields["title"], "Engineer");
    }

    #[test]
    fn directory_lookup_is_case_sensitive() {
        let merged = merge(
            &directory(json!([{"github_login": "Mona"}])),
            "mona",
            record(json!({"login": "mona"})),
        );
        assert!(!merged.is_member);
    }

    #[test]
    fn non_object_directory_entries_never_match() {
        let merged = merge(
            &directory(json!(["mona", 42, null, {"github_login": "mona"}])),
            "mona",
            record(json!({"login": "mona"})),
        );
        assert!(merged.is_member);
    }

    #[test]
    fn directory_wins_conflicts_and_profile_fills_gaps() {
        let merged = merge(
            &directory(json!([{
                "github_login": "mona",
                "name": "Mona Lisa Octocat",
                "manager": "hubot"
            }])),
            "mona",
            record(json!({"login": "mona", "name": "Mona", "bio": "Ships things"})),
        );

        assert_eq!(merged.fields["name"], "Mona Lisa Octocat");
        assert_eq!(merged.fields["manager"], "hubot");
        assert_eq!(merged.fields["bio"], "Ships things");
    }

    #[test]
    fn computed_fields_override_both_sources() {
        let merged = merge(
            &directory(json!([{
                "github_login": "mona",
                "isHubber": true,
                "recent": "stale",
                "login": "not-a-link"
            }])),
            "mona",
            record(json!({"login": "mona", "recent": "also stale"})),
        );

        assert_eq!(merged.fields["isHubber"], MEMBER_GLYPH);
        assert!(merged.fields["recent"].as_str().unwrap().starts_with("[issues]"));
        assert_eq!(
            merged.fields["login"],
            "[@mona](https://github.com/mona) ([mona@github.com](mailto:mona@github.com))"
        );
    }

    #[test]
    fn directory_login_never_redirects_the_profile_link() {
        let merged = merge(
            &directory(json!([{"github_login": "mona", "login": "someone-else"}])),
            "mona",
            record(json!({"login": "mona"})),
        );
        assert_eq!(
            merged.fields["login"],
            "[@mona](https://github.com/mona) ([mona@github.com](mailto:mona@github.com))"
        );

        let merged = merge(
            &directory(json!([{"github_login": "octocat", "login": "someone-else"}])),
            "octocat",
            Record::new(),
        );
        assert_eq!(
            merged.fields["login"],
            "[@octocat](https://github.com/octocat) ([octocat@github.com](mailto:octocat@github.com))"
        );
    }

    #[test]
    fn recent_has_three_links_for_the_handle() {
        let merged = merge(&[], "octocat", record(json!({"login": "octocat"})));
        let recent = merged.fields["recent"].as_str().unwrap();

        let links: Vec<&str> = recent.split(" &#x7c; ").collect();
        assert_eq!(links.len(), 3);
        assert_eq!(
            links[0],
            "[issues](https://github.com/search?q=author%3Aoctocat&type=issues&s=created&o=desc)"
        );
        assert_eq!(
            links[1],
            "[pull requests](https://github.com/search?q=author%3Aoctocat&type=pullrequests&s=created&o=desc)"
        );
        assert_eq!(
            links[2],
            "[commits](https://github.com/search?q=author%3Aoctocat&type=commits&s=committer-date&o=desc)"
        );
    }

    #[test]
    fn null_twitter_username_is_removed() {
        let merged = merge(
            &[],
            "octocat",
            record(json!({"login": "octocat", "twitter_username": null})),
        );
        assert!(!merged.fields.contains_key("twitter_username"));
    }

    #[test]
    fn present_twitter_username_is_kept_raw_for_the_schema() {
        let merged = merge(
            &[],
            "octocat",
            record(json!({"login": "octocat", "twitter_username": "octo"})),
        );
        assert_eq!(merged.fields["twitter_username"], "octo");
    }

    #[test]
    fn missing_login_falls_back_to_handle() {
        let merged = merge(&[], "octocat", Record::new());
        assert_eq!(
            merged.fields["login"],
            "[@octocat](https://github.com/octocat)"
        );
    }

    #[test]
    fn login_keeps_profile_casing_and_mailto_uses_handle() {
        let merged = merge(
            &directory(json!([{"github_login": "mona"}])),
            "mona",
            record(json!({"login": "Mona"})),
        );
        assert_eq!(
            merged.fields["login"],
            "[@Mona](https://github.com/Mona) ([mona@github.com](mailto:mona@github.com))"
        );
    }
}
