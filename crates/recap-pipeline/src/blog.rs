//! Deterministic Markdown + YAML front-matter renderer (spec §4.14, §6).
//!
//! A pure function of its input: no I/O, no timestamps beyond the `date`
//! field the caller supplies.

use chrono::NaiveDate;
use recap_models::Manifest;

const MEDIA_EMBED_HEIGHT: u32 = 378;
const MEDIA_EMBED_WIDTH: u32 = 620;
const MEDIA_EMBED_SANDBOX: &str = "allow-scripts allow-same-origin allow-presentation";

pub fn blog_path(date: NaiveDate) -> String {
    format!("content/blog/development/{date}-daily-dev-recap.md")
}

pub fn branch_name(date: NaiveDate) -> String {
    format!("auto/daily-recap-{date}")
}

/// Renders the full Markdown document, front matter first.
pub fn render(manifest: &Manifest, date: NaiveDate, canonical: Option<&str>, draft: bool) -> String {
    let mut out = String::new();
    render_front_matter(manifest, date, canonical, draft, &mut out);
    out.push('\n');
    render_body(manifest, date, &mut out);
    out
}

fn render_front_matter(manifest: &Manifest, date: NaiveDate, canonical: Option<&str>, draft: bool, out: &mut String) {
    out.push_str("---\n");
    out.push_str(&format!("title: {}\n", yaml_scalar(&manifest.title)));
    out.push_str(&format!("category: {}\n", yaml_scalar("development")));
    out.push_str(&format!("tags: [{}]\n", manifest.tags.iter().map(|t| yaml_scalar(t)).collect::<Vec<_>>().join(", ")));
    out.push_str(&format!("description: {}\n", yaml_scalar(&manifest.summary)));
    out.push_str(&format!("date: {date}\n"));
    out.push_str(&format!("updated: {date}\n"));
    if let Some(canonical) = canonical {
        out.push_str(&format!("canonical: {}\n", yaml_scalar(canonical)));
    } else {
        out.push_str("canonical: null\n");
    }
    out.push_str(&format!("draft: {draft}\n"));
    out.push_str("---\n");
}

fn render_body(manifest: &Manifest, date: NaiveDate, out: &mut String) {
    out.push_str(&manifest.summary);
    out.push_str("\n\n");

    for section in &manifest.sections {
        out.push_str(&format!("## {}\n\n", section.title));
        for bullet in &section.bullets {
            out.push_str(&format!("- {bullet}\n"));
        }
        out.push('\n');
        out.push_str(&section.paragraph);
        out.push_str("\n\n");
        out.push_str(&media_embed(&section.clip_url));
        out.push_str("\n\n");
    }

    out.push_str(&format!("*Generated from Twitch clips on {date}*\n"));
}

fn media_embed(src: &str) -> String {
    format!(
        "<iframe src=\"{src}\" height=\"{MEDIA_EMBED_HEIGHT}\" width=\"{MEDIA_EMBED_WIDTH}\" frameborder=\"0\" scrolling=\"no\" allowfullscreen=\"true\" sandbox=\"{MEDIA_EMBED_SANDBOX}\"></iframe>"
    )
}

/// Double-quoted YAML scalar, escaping backslash, double-quote, CR, LF.
fn yaml_scalar(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('"');
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\r' => escaped.push_str("\\r"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped.push('"');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use recap_models::Section;

    fn sample_manifest() -> Manifest {
        Manifest {
            post_id: "2025-08-29".to_string(),
            tz: "UTC".to_string(),
            title: "Daily Dev Recap".to_string(),
            summary: "A day of shipping.".to_string(),
            tags: vec!["rust".to_string(), "devlog".to_string()],
            sections: vec![Section {
                title: "Fixing the flaky test".to_string(),
                bullets: vec!["found the race".to_string(), "added a retry".to_string()],
                paragraph: "The stream spent twenty minutes chasing a flaky integration test.".to_string(),
                clip_url: "https://clips.twitch.tv/abcDEF_12".to_string(),
                source_deep_link: None,
                repo: Some("org/repo".to_string()),
                pr_links: None,
            }],
            judge_axes: None,
            ai_generation_metadata: serde_json::json!({}),
        }
    }

    #[test]
    fn escapes_backslash_quote_and_newlines() {
        let escaped = yaml_scalar("a \"quoted\" \\path\\\r\nline2");
        assert_eq!(escaped, "\"a \\\"quoted\\\" \\\\path\\\\\\r\\nline2\"");
    }

    #[test]
    fn front_matter_keys_are_in_spec_order() {
        let manifest = sample_manifest();
        let date = NaiveDate::from_ymd_opt(2025, 8, 29).unwrap();
        let doc = render(&manifest, date, Some("https://blog.example.com/p/1"), false);
        let keys: Vec<&str> = doc
            .lines()
            .skip(1)
            .take_while(|l| *l != "---")
            .map(|l| l.split(':').next().unwrap())
            .collect();
        assert_eq!(keys, vec!["title", "category", "tags", "description", "date", "updated", "canonical", "draft"]);
    }

    #[test]
    fn body_includes_media_embed_with_fixed_attributes() {
        let manifest = sample_manifest();
        let date = NaiveDate::from_ymd_opt(2025, 8, 29).unwrap();
        let doc = render(&manifest, date, None, true);
        assert!(doc.contains("height=\"378\""));
        assert!(doc.contains("width=\"620\""));
        assert!(doc.contains("sandbox=\"allow-scripts allow-same-origin allow-presentation\""));
        assert!(doc.contains("*Generated from Twitch clips on 2025-08-29*"));
    }

    #[test]
    fn is_a_pure_function_of_its_input() {
        let manifest = sample_manifest();
        let date = NaiveDate::from_ymd_opt(2025, 8, 29).unwrap();
        assert_eq!(render(&manifest, date, None, false), render(&manifest, date, None, false));
    }

    #[test]
    fn blog_path_and_branch_name_match_spec_format() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 29).unwrap();
        assert_eq!(blog_path(date), "content/blog/development/2025-08-29-daily-dev-recap.md");
        assert_eq!(branch_name(date), "auto/daily-recap-2025-08-29");
    }
}
