//! HTML to Markdown conversion
//!
//! The document is parsed once and rendered up to twice: a full-document
//! pass and, when main-content extraction is enabled, a pass that also skips
//! boilerplate. The main-content pass is discarded when it comes out empty or
//! implausibly short.

use crate::config::MarkdownOptions;
use crate::result::ConversionResult;
use crate::tidy;
use crate::urls::{clean_url, collapse_whitespace, escape_parens, resolve_href, resolve_src};
use scraper::{ElementRef, Html, Node};
use tracing::{debug, warn};
use url::Url;

/// Converts HTML documents with a fixed set of options
#[derive(Debug, Clone, Default)]
pub struct MarkdownConverter {
    options: MarkdownOptions,
}

impl MarkdownConverter {
    /// Create a converter with the given options
    pub fn new(options: MarkdownOptions) -> Self {
        Self { options }
    }

    /// The options in use
    pub fn options(&self) -> &MarkdownOptions {
        &self.options
    }

    /// Convert `html`, resolving relative URLs against `source_url`
    pub fn convert(&self, html: &str, source_url: Option<&str>) -> ConversionResult {
        convert_document(html, &self.options, source_url)
    }
}

/// Convert `html` to Markdown
pub fn to_markdown(html: &str, options: &MarkdownOptions, source_url: Option<&str>) -> String {
    convert_document(html, options, source_url).markdown
}

fn convert_document(
    html: &str,
    options: &MarkdownOptions,
    source_url: Option<&str>,
) -> ConversionResult {
    let document = Html::parse_document(html);
    let base = source_url.and_then(|raw| match Url::parse(raw) {
        Ok(url) => Some(url),
        Err(err) => {
            warn!(source_url = raw, error = %err, "Unparsable source URL, relative URLs kept as is");
            None
        }
    });

    let render = |main_only: bool| {
        let renderer = Renderer {
            options,
            base: base.as_ref(),
            main_only,
        };
        let mut buffer = Buffer::default();
        renderer.element(document.root_element(), &mut buffer, 0);
        buffer.finish()
    };

    let mut result = ConversionResult::new(render(false));
    if let Some(title) = document_title(&document) {
        result = result.with_title(title);
    }
    if !options.extract_main_html {
        return result;
    }

    let main = render(true);
    let main_length = main.chars().count();
    let keep = !falls_back(main_length, result.full_length, options);
    if !keep {
        debug!(
            main_length,
            full_length = result.full_length,
            "Main content implausibly short, using full document"
        );
    }
    result.with_main_content(main, keep)
}

/// Empty main content, or main content that is both relatively and
/// absolutely short, is not trusted
fn falls_back(main_length: usize, full_length: usize, options: &MarkdownOptions) -> bool {
    main_length == 0
        || ((main_length as f64) < options.min_main_ratio * full_length as f64
            && main_length < options.min_main_chars)
}

fn document_title(document: &Html) -> Option<String> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == "title")
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .filter(|title| !title.is_empty())
}

/// Markdown under construction. Text is whitespace-collapsed as it arrives;
/// block boundaries become blank lines.
#[derive(Default)]
struct Buffer {
    out: String,
    space: bool,
}

impl Buffer {
    fn push_text(&mut self, text: &str) {
        for c in text.chars() {
            if c.is_whitespace() {
                self.space = true;
            } else {
                self.flush_space();
                self.out.push(c);
            }
        }
    }

    /// Request a separating space before the next output
    fn push_space(&mut self) {
        self.space = true;
    }

    fn push_raw(&mut self, markup: &str) {
        self.flush_space();
        self.out.push_str(markup);
    }

    fn flush_space(&mut self) {
        if self.space && !self.out.is_empty() && !self.out.ends_with(char::is_whitespace) {
            self.out.push(' ');
        }
        self.space = false;
    }

    fn trim_trailing_spaces(&mut self) {
        let kept = self.out.trim_end_matches([' ', '\t']).len();
        self.out.truncate(kept);
    }

    fn block(&mut self) {
        self.space = false;
        self.trim_trailing_spaces();
        if self.out.is_empty() {
            return;
        }
        while !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    fn line_break(&mut self) {
        self.space = false;
        self.trim_trailing_spaces();
        self.out.push('\n');
    }

    fn push_block(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.block();
        self.out.push_str(text);
        self.block();
    }

    /// Trim line ends, collapse blank-line runs, trim the whole
    fn finish(self) -> String {
        let mut lines: Vec<&str> = Vec::new();
        let mut previous_blank = true;
        for line in self.out.lines() {
            let line = line.trim_end();
            let blank = line.is_empty();
            if !(blank && previous_blank) {
                lines.push(line);
            }
            previous_blank = blank;
        }
        while lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }
        lines.join("\n")
    }

    /// Single-line form for inline contexts
    fn finish_inline(self) -> String {
        collapse_whitespace(&self.out)
    }
}

struct Renderer<'a> {
    options: &'a MarkdownOptions,
    base: Option<&'a Url>,
    main_only: bool,
}

impl Renderer<'_> {
    fn skipped(&self, element: ElementRef<'_>) -> bool {
        let value = element.value();
        if tidy::is_dropped(value, self.options.include_images) {
            return true;
        }
        self.main_only
            && self.options.boilerplate.matches(
                value.name(),
                value.id(),
                value.classes(),
                value.attr("role"),
            )
    }

    fn children(&self, element: ElementRef<'_>, buffer: &mut Buffer, depth: usize) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => buffer.push_text(text),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.element(child, buffer, depth + 1);
                    }
                }
                _ => {}
            }
        }
    }

    fn element(&self, element: ElementRef<'_>, buffer: &mut Buffer, depth: usize) {
        if depth > self.options.max_depth {
            debug!(
                tag = element.value().name(),
                max_depth = self.options.max_depth,
                "Skipping deeply nested element"
            );
            return;
        }
        if self.skipped(element) {
            return;
        }

        match element.value().name() {
            "head" => {
                for child in element.children().filter_map(ElementRef::wrap) {
                    if child.value().name() == "title" {
                        self.heading(child, 1, buffer, depth + 1);
                    }
                }
            }
            "title" => self.heading(element, 1, buffer, depth),
            "h1" => self.heading(element, 1, buffer, depth),
            "h2" => self.heading(element, 2, buffer, depth),
            "h3" => self.heading(element, 3, buffer, depth),
            "h4" => self.heading(element, 4, buffer, depth),
            "h5" => self.heading(element, 5, buffer, depth),
            "h6" => self.heading(element, 6, buffer, depth),
            "br" => buffer.line_break(),
            "hr" => buffer.push_block("---"),
            "strong" | "b" => self.wrapped(element, "**", buffer, depth),
            "em" | "i" => self.wrapped(element, "_", buffer, depth),
            "s" | "del" | "strike" => self.wrapped(element, "~~", buffer, depth),
            "code" | "kbd" | "samp" => self.inline_code(element, buffer),
            "pre" => self.code_block(element, buffer),
            "a" => self.link(element, buffer, depth),
            "img" => self.image(element, buffer),
            "ul" => self.list(element, false, buffer, depth),
            "ol" => self.list(element, true, buffer, depth),
            "blockquote" => self.blockquote(element, buffer, depth),
            "table" => self.table(element, buffer, depth),
            "p" | "div" | "section" | "article" | "main" | "header" | "footer" | "aside"
            | "figure" | "figcaption" | "address" | "details" | "summary" | "dl" | "dt"
            | "dd" | "li" | "form" | "fieldset" | "legend" | "tr" | "caption" => {
                buffer.block();
                self.children(element, buffer, depth);
                buffer.block();
            }
            _ => self.children(element, buffer, depth),
        }
    }

    fn inline_content(&self, element: ElementRef<'_>, depth: usize) -> String {
        let mut inner = Buffer::default();
        self.children(element, &mut inner, depth);
        inner.finish_inline()
    }

    fn heading(&self, element: ElementRef<'_>, level: usize, buffer: &mut Buffer, depth: usize) {
        let text = self.inline_content(element, depth);
        if text.is_empty() {
            return;
        }
        buffer.push_block(&format!("{} {}", "#".repeat(level), text));
    }

    fn wrapped(&self, element: ElementRef<'_>, marker: &str, buffer: &mut Buffer, depth: usize) {
        let text = self.inline_content(element, depth);
        if text.is_empty() {
            return;
        }
        let raw = element.text().collect::<String>();
        if raw.starts_with(char::is_whitespace) {
            buffer.push_space();
        }
        buffer.push_raw(&format!("{marker}{text}{marker}"));
        if raw.ends_with(char::is_whitespace) {
            buffer.push_space();
        }
    }

    fn inline_code(&self, element: ElementRef<'_>, buffer: &mut Buffer) {
        let text = collapse_whitespace(&element.text().collect::<String>());
        if text.is_empty() {
            return;
        }
        let fence = if text.contains('`') { "``" } else { "`" };
        buffer.push_raw(&format!("{fence}{text}{fence}"));
    }

    fn code_block(&self, element: ElementRef<'_>, buffer: &mut Buffer) {
        let code = element.text().collect::<String>();
        let code = code.trim_matches('\n');
        if code.trim().is_empty() {
            return;
        }

        let language = element
            .children()
            .filter_map(ElementRef::wrap)
            .find(|child| child.value().name() == "code")
            .and_then(|code| {
                code.value()
                    .classes()
                    .find_map(|class| class.strip_prefix("language-"))
                    .map(str::to_string)
            })
            .unwrap_or_default();

        let fence = if code.contains("```") { "````" } else { "```" };
        buffer.push_block(&format!("{fence}{language}\n{code}\n{fence}"));
    }

    /// Final form of a resolved URL inside Markdown link syntax
    fn finish_url(&self, resolved: String) -> String {
        let resolved = if self.options.clean_urls {
            clean_url(&resolved, &self.options.clean_rules)
        } else {
            resolved
        };
        collapse_whitespace(&escape_parens(&resolved))
    }

    fn link(&self, element: ElementRef<'_>, buffer: &mut Buffer, depth: usize) {
        let href = element
            .value()
            .attr("href")
            .map(str::trim)
            .filter(|href| !href.is_empty());

        let Some(href) = href else {
            self.children(element, buffer, depth);
            return;
        };

        let text = self.inline_content(element, depth);
        if text.is_empty() {
            return;
        }
        let url = self.finish_url(resolve_href(href, self.base));
        buffer.push_raw(&format!("[{}]({})", text, url));
    }

    fn image(&self, element: ElementRef<'_>, buffer: &mut Buffer) {
        let value = element.value();
        let Some(src) = value.attr("src").map(str::trim).filter(|src| !src.is_empty()) else {
            return;
        };
        let alt = collapse_whitespace(value.attr("alt").unwrap_or_default());
        let url = self.finish_url(resolve_src(src, self.base));
        buffer.push_raw(&format!("![{}]({})", alt, url));
    }

    fn list(&self, element: ElementRef<'_>, ordered: bool, buffer: &mut Buffer, depth: usize) {
        let mut number = element
            .value()
            .attr("start")
            .and_then(|start| start.trim().parse::<usize>().ok())
            .unwrap_or(1);

        let mut items = Vec::new();
        for child in element.children().filter_map(ElementRef::wrap) {
            if self.skipped(child) {
                continue;
            }
            let mut inner = Buffer::default();
            if child.value().name() == "li" {
                self.children(child, &mut inner, depth + 1);
            } else {
                // Stray content such as a nested list directly inside the list
                self.element(child, &mut inner, depth + 1);
            }
            let body = inner.finish();
            if body.is_empty() {
                continue;
            }

            let marker = if ordered {
                let marker = format!("{}. ", number);
                number += 1;
                marker
            } else {
                "- ".to_string()
            };
            items.push(indent(&marker, &body));
        }

        buffer.push_block(&items.join("\n"));
    }

    fn blockquote(&self, element: ElementRef<'_>, buffer: &mut Buffer, depth: usize) {
        let mut inner = Buffer::default();
        self.children(element, &mut inner, depth);
        let body = inner.finish();
        if body.is_empty() {
            return;
        }

        let quoted = body
            .lines()
            .map(|line| {
                if line.is_empty() {
                    ">".to_string()
                } else {
                    format!("> {}", line)
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        buffer.push_block(&quoted);
    }

    fn table(&self, element: ElementRef<'_>, buffer: &mut Buffer, depth: usize) {
        let mut rows: Vec<Vec<String>> = Vec::new();
        self.collect_rows(element, &mut rows, depth);

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if width == 0 {
            return;
        }
        for row in &mut rows {
            row.resize(width, String::new());
        }

        let line = |cells: &[String]| format!("| {} |", cells.join(" | "));
        let mut lines = vec![line(&rows[0]), line(&vec!["---".to_string(); width])];
        lines.extend(rows[1..].iter().map(|row| line(row)));
        buffer.push_block(&lines.join("\n"));
    }

    /// Rows of this table, not of tables nested inside its cells
    fn collect_rows(&self, element: ElementRef<'_>, rows: &mut Vec<Vec<String>>, depth: usize) {
        for child in element.children().filter_map(ElementRef::wrap) {
            if self.skipped(child) {
                continue;
            }
            match child.value().name() {
                "thead" | "tbody" | "tfoot" => self.collect_rows(child, rows, depth + 1),
                "tr" => {
                    let cells: Vec<String> = child
                        .children()
                        .filter_map(ElementRef::wrap)
                        .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                        .map(|cell| self.inline_content(cell, depth + 2).replace('|', "\\|"))
                        .collect();
                    if !cells.is_empty() {
                        rows.push(cells);
                    }
                }
                _ => {}
            }
        }
    }
}

/// Prefix the first line with `marker` and indent the rest to match
fn indent(marker: &str, body: &str) -> String {
    let padding = " ".repeat(marker.len());
    body.lines()
        .enumerate()
        .map(|(index, line)| {
            if index == 0 {
                format!("{}{}", marker, line)
            } else if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", padding, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
