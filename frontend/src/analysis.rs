//! Turns the assistant's markdown-ish answer into plain chat text.
//!
//! The answer is parsed into an intro paragraph plus `{title, bullets}`
//! sections; a section starts at a `**` marker preceded by a blank line.
//! Rendering is separate so the layout can change without touching parsing.

use once_cell::sync::Lazy;
use regex::Regex;

static BLANK_LINE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n(?:[ \t]*\n)+").expect("valid regex"));

static BULLET_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:\*+\s*|[-•]\s+)").expect("valid regex"));

const SECTION_MARKER: &str = "\n\n**";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Section {
    pub title: String,
    pub bullets: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnalysisReply {
    pub intro: String,
    pub sections: Vec<Section>,
}

fn strip_emphasis(text: &str) -> String {
    text.replace('*', "")
}

fn clean_bullet(text: &str) -> String {
    strip_emphasis(text).trim().trim_end_matches('.').trim_end().to_string()
}

fn parse_section(raw: &str) -> Section {
    let mut lines = raw.lines();
    let title = strip_emphasis(lines.next().unwrap_or_default())
        .trim()
        .trim_end_matches(':')
        .trim_end()
        .to_string();

    let mut bullets: Vec<String> = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        match BULLET_MARKER.find(line) {
            Some(marker) => bullets.push(clean_bullet(&line[marker.end()..])),
            None => match bullets.last_mut() {
                // unmarked lines continue the previous bullet
                Some(last) => {
                    let rest = clean_bullet(line);
                    if !rest.is_empty() {
                        last.push(' ');
                        last.push_str(&rest);
                    }
                }
                None => bullets.push(clean_bullet(line)),
            },
        }
    }
    bullets.retain(|bullet| !bullet.is_empty());

    Section { title, bullets }
}

pub fn parse(text: &str) -> AnalysisReply {
    let normalized = text.replace("\r\n", "\n");
    let collapsed = BLANK_LINE_RUN.replace_all(&normalized, "\n\n");

    let mut parts = collapsed.split(SECTION_MARKER);
    let intro = strip_emphasis(parts.next().unwrap_or_default())
        .trim()
        .to_string();
    let sections = parts.map(parse_section).collect();

    AnalysisReply { intro, sections }
}

impl AnalysisReply {
    pub fn render(&self) -> String {
        let mut blocks = Vec::with_capacity(self.sections.len() + 1);
        if !self.intro.is_empty() {
            blocks.push(self.intro.clone());
        }

        for section in &self.sections {
            if section.bullets.is_empty() {
                blocks.push(format!("**{}**:", section.title));
            } else {
                blocks.push(format!(
                    "**{}**:\n\n{}.",
                    section.title,
                    section.bullets.join(".\n")
                ));
            }
        }

        blocks.join("\n\n")
    }
}

/// Parse and render in one go.
pub fn format_answer(text: &str) -> String {
    parse(text).render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_titles_and_bullets_are_reassembled() {
        let rendered = format_answer("Intro\n\n**Spending**\n*Point one\n*Point two");
        assert_eq!(rendered, "Intro\n\n**Spending**:\n\nPoint one.\nPoint two.");
    }

    #[test]
    fn parses_structure() {
        let reply = parse(
            "You spend a lot on *food*.\n\n\n\n**Top categories:**\n* Groceries: $50.\n* Transport\n\n**Advice**\n- Cook at home\n  more often",
        );

        assert_eq!(reply.intro, "You spend a lot on food.");
        assert_eq!(
            reply.sections,
            vec![
                Section {
                    title: "Top categories".to_string(),
                    bullets: vec!["Groceries: $50".to_string(), "Transport".to_string()],
                },
                Section {
                    title: "Advice".to_string(),
                    bullets: vec!["Cook at home more often".to_string()],
                },
            ]
        );
    }

    #[test]
    fn plain_text_only_loses_emphasis_and_extra_blank_lines() {
        assert_eq!(
            format_answer("Your **balance** is fine.\n\n\n\nKeep going."),
            "Your balance is fine.\n\nKeep going."
        );
    }

    #[test]
    fn title_with_its_own_colon_gets_only_one() {
        assert_eq!(
            format_answer("Overview\n\n**Top categories:**\n* Groceries"),
            "Overview\n\n**Top categories**:\n\nGroceries."
        );
    }

    #[test]
    fn title_only_section_renders_without_bullets() {
        assert_eq!(format_answer("Hi\n\n**Summary**"), "Hi\n\n**Summary**:");
    }

    #[test]
    fn empty_intro_is_dropped() {
        assert_eq!(
            format_answer("\n\n**Savings**\n*Save more"),
            "**Savings**:\n\nSave more."
        );
    }
}
