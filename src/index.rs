//! Document Index parsing
//!
//! Reads the README as a sequence of sections: each heading opens a section
//! and the list items that follow it (at any nesting depth) become its
//! bullets. Text and inline code are flattened; other markup is dropped.

use crate::layout::Subfolder;
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Parser, Tag, TagEnd};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// 1..=6
    pub level: u8,
    pub title: String,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DocumentIndex {
    pub sections: Vec<Section>,
    /// Flattened text content, including code blocks and inline code.
    text: String,
    code_spans: Vec<String>,
    unclosed_fences: usize,
}

fn level_number(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// A fenced block's source range runs to EOF when no closing fence exists.
/// It is closed when its last line is a run of the opening fence character
/// at least as long as the opening run.
fn fence_is_closed(block: &str) -> bool {
    let strip = |line: &str| line.trim_start_matches(|c: char| c == '>' || c.is_whitespace()).trim_end().to_string();
    let lines: Vec<String> = block.lines().map(strip).collect();
    let (Some(open), Some(close)) = (lines.first(), lines.last()) else {
        return false;
    };
    if lines.len() < 2 {
        return false;
    }
    let Some(fence_char) = open.chars().next() else {
        return false;
    };
    let open_len = open.chars().take_while(|c| *c == fence_char).count();
    !close.is_empty()
        && close.chars().all(|c| c == fence_char)
        && close.chars().count() >= open_len
}

impl DocumentIndex {
    pub fn parse(markdown: &str) -> Self {
        let mut index = DocumentIndex::default();

        let mut heading: Option<(u8, String)> = None;
        // (section, bullet) of each open list item, innermost last
        let mut open_items: Vec<(usize, usize)> = Vec::new();

        for (event, range) in Parser::new(markdown).into_offset_iter() {
            match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    heading = Some((level_number(level), String::new()));
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some((level, title)) = heading.take() {
                        index.sections.push(Section {
                            level,
                            title: title.trim().to_string(),
                            bullets: Vec::new(),
                        });
                    }
                }
                Event::Start(Tag::Item) => {
                    if let Some(section_idx) = index.sections.len().checked_sub(1) {
                        let bullets = &mut index.sections[section_idx].bullets;
                        bullets.push(String::new());
                        open_items.push((section_idx, bullets.len() - 1));
                    }
                }
                Event::End(TagEnd::Item) => {
                    if let Some(bullet) = open_items.pop().and_then(|slot| index.bullet_mut(slot)) {
                        *bullet = bullet.trim().to_string();
                    }
                }
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(_))) => {
                    if !fence_is_closed(&markdown[range]) {
                        index.unclosed_fences += 1;
                    }
                }
                Event::Text(text) => {
                    index.append(&mut heading, &open_items, &text);
                }
                Event::Code(code) => {
                    index.code_spans.push(code.to_string());
                    index.append(&mut heading, &open_items, &code);
                }
                Event::SoftBreak | Event::HardBreak => {
                    index.append(&mut heading, &open_items, " ");
                }
                _ => {}
            }
        }

        index
    }

    fn bullet_mut(&mut self, (section_idx, bullet_idx): (usize, usize)) -> Option<&mut String> {
        self.sections
            .get_mut(section_idx)
            .and_then(|s| s.bullets.get_mut(bullet_idx))
    }

    fn append(&mut self, heading: &mut Option<(u8, String)>, open_items: &[(usize, usize)], fragment: &str) {
        self.text.push_str(fragment);
        self.text.push(' ');

        if let Some((_, title)) = heading.as_mut() {
            title.push_str(fragment);
        } else if let Some(bullet) = open_items.last().and_then(|slot| self.bullet_mut(*slot)) {
            bullet.push_str(fragment);
        }
    }

    /// Fenced code blocks that run to the end of the document.
    pub fn unclosed_fences(&self) -> usize {
        self.unclosed_fences
    }

    pub fn headings(&self) -> impl Iterator<Item = (u8, &str)> {
        self.sections.iter().map(|s| (s.level, s.title.as_str()))
    }

    /// First section whose title matches case-insensitively.
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.title.eq_ignore_ascii_case(title.trim()))
    }

    /// `name/` at a word start anywhere in the content, or an inline code
    /// span equal to `name`.
    pub fn mentions_folder(&self, folder: Subfolder) -> bool {
        let name = folder.dir_name();
        let with_slash = format!("{}/", name);
        let at_word_start = self.text.match_indices(&with_slash).any(|(pos, _)| {
            self.text[..pos]
                .chars()
                .next_back()
                .map_or(true, |c| !(c.is_alphanumeric() || c == '_' || c == '-'))
        });
        at_word_start
            || self
                .code_spans
                .iter()
                .any(|c| c.trim().trim_end_matches('/') == name)
    }
}
