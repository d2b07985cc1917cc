//! Atom rendering of a bug list.

use bugtrack_sql::sql::schema::{Bug, Environment, Project};
use chrono::{DateTime, SecondsFormat, Utc};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn entry(base: &str, bug: &Bug) -> String {
    format!(
        "  <entry>\n    <id>{base}/{number}</id>\n    <title>{title}</title>\n    <published>{published}</published>\n    <updated>{updated}</updated>\n    <link href=\"{href}\"/>\n    <summary>{count} occurrences</summary>\n  </entry>\n",
        base = text(base),
        number = bug.number,
        title = text(&format!("{}: {}", bug.class_name, bug.message)),
        published = timestamp(&bug.first_occurrence),
        updated = timestamp(&bug.latest_occurrence),
        href = attr(&format!("{}/{}", base, bug.number)),
        count = bug.occurrences_count,
    )
}

/// Feed of the given bugs; `generated_at` stands in for `updated` when empty
pub fn render_feed(
    project: &Project,
    environment: &Environment,
    bugs: &[Bug],
    generated_at: DateTime<Utc>,
) -> String {
    let base = format!(
        "/projects/{}/environments/{}/bugs",
        project.slug, environment.name
    );

    let updated = bugs
        .iter()
        .map(|bug| bug.latest_occurrence)
        .max()
        .unwrap_or(generated_at);

    let entries: String = bugs.iter().map(|bug| entry(&base, bug)).collect();

    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<feed xmlns=\"http://www.w3.org/2005/Atom\">\n  <id>{id}</id>\n  <title>{title}</title>\n  <updated>{updated}</updated>\n  <link rel=\"self\" href=\"{href}\"/>\n{entries}</feed>\n",
        id = text(&base),
        title = text(&format!("{} ({}) bugs", project.name, environment.name)),
        updated = timestamp(&updated),
        href = attr(&format!("{}.atom", base)),
        entries = entries,
    )
}
