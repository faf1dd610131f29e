use chrono::Datelike;
use log::{ debug, info, warn };
use thiserror::Error;

use crate::models::artifact::{ FileOrigin, FileSet };
use crate::models::generation::GenerationResult;
use crate::models::request::GenerationRequest;

pub const ENTRY_PAGE: &str = "index.html";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ArtifactError {
    #[error("generated content is empty")]
    EmptyContent,

    #[error("no usable files in generated content: {0}")]
    NoUsableFiles(String),
}

/// A fenced block lifted out of the model output
#[derive(Debug, Clone, PartialEq, Eq)]
struct CodeBlock {
    /// Backtick count of the opening fence
    fence: usize,
    info: String,
    /// Nearest non-blank line before the opening fence
    caption: Option<String>,
    body: String,
}

/// Turns model output into a publishable file set.
///
/// Pure function of its inputs: the same generation result and request always
/// produce the same files in the same order.
#[derive(Debug, Clone)]
pub struct ArtifactBuilder {
    owner: String,
}

impl ArtifactBuilder {
    pub fn new(owner: impl Into<String>) -> Self {
        Self { owner: owner.into() }
    }

    pub fn build(
        &self,
        generation: &GenerationResult,
        request: &GenerationRequest
    ) -> Result<FileSet, ArtifactError> {
        let content = generation.content.trim();
        if content.is_empty() {
            return Err(ArtifactError::EmptyContent);
        }

        let (mut files, block_count) = collect_generated(content);
        if files.is_empty() {
            let reason = if block_count == 0 {
                "no fenced code blocks and no HTML document".to_string()
            } else {
                format!("{} code blocks, none usable", block_count)
            };
            return Err(ArtifactError::NoUsableFiles(reason));
        }

        self.synthesize(&mut files, generation, request);
        info!(
            "Built {} files ({} generated): {}",
            files.len(),
            files.generated_count(),
            files.paths().join(", ")
        );
        Ok(files)
    }

    fn synthesize(&self, files: &mut FileSet, generation: &GenerationResult, request: &GenerationRequest) {
        if !files.contains(ENTRY_PAGE) {
            let entry = entry_page(files, &request.repo_name);
            files.insert(ENTRY_PAGE, entry, FileOrigin::Synthesized);
        }

        if !files.contains("README.md") {
            let mut readme = format!("# {}\n\n{}\n", request.repo_name, request.brief);
            if !request.checks.is_empty() {
                readme.push_str("\n## Checks\n\n");
                for check in &request.checks {
                    readme.push_str(&format!("- {}\n", check));
                }
            }
            readme.push_str(
                &format!("\nGenerated with {} ({}).\n", generation.provider, generation.model)
            );
            files.insert("README.md", readme, FileOrigin::Synthesized);
        }

        if !files.contains("LICENSE") {
            let license = mit_license(request.received_at.year(), &self.owner);
            files.insert("LICENSE", license, FileOrigin::Synthesized);
        }
    }
}

/// Files parsed out of model output, in output order, before any support files are added
pub fn generated_files(content: &str) -> FileSet {
    collect_generated(content.trim()).0
}

fn collect_generated(content: &str) -> (FileSet, usize) {
    let mut files = FileSet::new();
    let blocks = parse_blocks(content);

    if blocks.is_empty() {
        if let Some(html) = find_html_document(content) {
            debug!("No code blocks found, using the HTML document as {}", ENTRY_PAGE);
            files.insert(ENTRY_PAGE, ensure_trailing_newline(html), FileOrigin::Generated);
        }
        return (files, 0);
    }

    for (index, block) in blocks.iter().enumerate() {
        if block.body.trim().is_empty() {
            debug!("Skipping empty code block {}", index + 1);
            continue;
        }

        let labelled = path_from_info(&block.info).or_else(||
            block.caption.as_deref().and_then(path_from_caption)
        );
        let path = match labelled {
            Some(raw) =>
                match normalize_path(&raw) {
                    Some(path) => path,
                    None => {
                        warn!("Skipping code block with unsafe path: {}", raw);
                        continue;
                    }
                }
            None => default_path(&block.info, index + 1, &files),
        };

        if !files.insert(path.clone(), ensure_trailing_newline(&block.body), FileOrigin::Generated) {
            warn!("Duplicate path {} in generated content, keeping the first", path);
        }
    }
    (files, blocks.len())
}

fn parse_blocks(content: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<CodeBlock> = None;
    let mut last_text_line: Option<String> = None;

    for line in content.lines() {
        let trimmed = line.trim();
        match current.as_mut() {
            Some(block) => {
                if is_closing_fence(trimmed, block.fence) {
                    blocks.extend(current.take());
                    last_text_line = None;
                } else {
                    block.body.push_str(line);
                    block.body.push('\n');
                }
            }
            None => {
                let fence = fence_length(trimmed);
                if fence >= 3 {
                    current = Some(CodeBlock {
                        fence,
                        info: trimmed[fence..].trim().to_string(),
                        caption: last_text_line.take(),
                        body: String::new(),
                    });
                } else if !trimmed.is_empty() {
                    last_text_line = Some(trimmed.to_string());
                }
            }
        }
    }

    // Output cut off mid-block still carries a usable file
    if let Some(block) = current {
        warn!("Code block {} was never closed, keeping what was generated", blocks.len() + 1);
        blocks.push(block);
    }
    blocks
}

fn fence_length(trimmed: &str) -> usize {
    trimmed.chars().take_while(|c| *c == '`').count()
}

/// A run of backticks at least as long as the opening fence, and nothing else
fn is_closing_fence(trimmed: &str, opening: usize) -> bool {
    let length = fence_length(trimmed);
    length >= opening && length == trimmed.len()
}

fn path_from_info(info: &str) -> Option<String> {
    for token in info.split_whitespace() {
        let token = token.trim_matches(|c: char| c == '"' || c == '\'');
        for prefix in ["path=", "file=", "filename="] {
            if let Some(value) = token.strip_prefix(prefix) {
                let value = value.trim_matches(|c: char| c == '"' || c == '\'');
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
        if looks_like_path(token) {
            return Some(token.to_string());
        }
    }
    None
}

fn path_from_caption(caption: &str) -> Option<String> {
    let mut text = caption
        .trim_start_matches(|c: char| (c == '#' || c == '*' || c == '-' || c == '`' || c.is_whitespace()))
        .trim_end_matches(|c: char| (c == '*' || c == '`' || c == ':' || c.is_whitespace()));

    for prefix in ["file:", "filename:", "path:"] {
        let matches = text.get(..prefix.len()).map_or(false, |head| head.eq_ignore_ascii_case(prefix));
        if matches {
            text = text[prefix.len()..].trim_start_matches(|c: char| (c == '*' || c == '`' || c.is_whitespace()));
        }
    }
    let text = text.trim_matches(|c: char| c == '`' || c == '*' || c == '"');

    if looks_like_path(text) {
        Some(text.to_string())
    } else {
        None
    }
}

/// A directory component or a file extension makes a token a path
fn looks_like_path(token: &str) -> bool {
    if token.is_empty() || token.contains(char::is_whitespace) || token.contains("://") {
        return false;
    }
    let token = token.replace('\\', "/");
    let name = match token.rsplit_once('/') {
        Some((dir, name)) => {
            if !dir.is_empty() && !name.is_empty() {
                return true;
            }
            name
        }
        None => token.as_str(),
    };
    match name.rsplit_once('.') {
        Some((_, ext)) => !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()),
        None => false,
    }
}

/// Relative, forward-slash path inside the repository, or `None` if it escapes it
pub fn normalize_path(raw: &str) -> Option<String> {
    let mut path = raw.trim().replace('\\', "/");
    while let Some(rest) = path.strip_prefix("./") {
        path = rest.to_string();
    }
    if path.is_empty() || path.starts_with('/') || path.contains(':') {
        return None;
    }
    let segments: Vec<&str> = path.split('/').collect();
    let unsafe_segment = segments
        .iter()
        .any(|s| (s.is_empty() || *s == "." || *s == ".." || s.eq_ignore_ascii_case(".git")));
    if unsafe_segment {
        return None;
    }
    Some(segments.join("/"))
}

fn default_path(info: &str, position: usize, files: &FileSet) -> String {
    let language = info.split_whitespace().next().unwrap_or("").to_ascii_lowercase();
    let (stem, ext) = match language.as_str() {
        "html" | "htm" => ("index", "html"),
        "css" => ("style", "css"),
        "js" | "javascript" => ("script", "js"),
        "json" => ("data", "json"),
        "md" | "markdown" => ("NOTES", "md"),
        _ => {
            return format!("snippet-{}.txt", position);
        }
    };
    let preferred = format!("{}.{}", stem, ext);
    if files.contains(&preferred) {
        format!("{}-{}.{}", stem, position, ext)
    } else {
        preferred
    }
}

fn find_html_document(content: &str) -> Option<&str> {
    let lower = content.to_ascii_lowercase();
    let start = lower.find("<!doctype").or_else(|| lower.find("<html"))?;
    Some(content[start..].trim())
}

fn ensure_trailing_newline(text: &str) -> String {
    if text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{}\n", text)
    }
}

fn entry_page(files: &FileSet, title: &str) -> String {
    let title = html_escape(title);
    let first_html = files
        .iter()
        .map(|f| f.path.as_str())
        .find(|p| p.ends_with(".html") || p.ends_with(".htm"));

    if let Some(target) = first_html {
        let target = html_escape(target);
        return format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<meta http-equiv=\"refresh\" content=\"0; url={target}\">\n<title>{title}</title>\n</head>\n<body>\n<p><a href=\"{target}\">{title}</a></p>\n</body>\n</html>\n"
        );
    }

    let links: String = files
        .iter()
        .map(|f| {
            let path = html_escape(&f.path);
            format!("<li><a href=\"{path}\">{path}</a></li>\n")
        })
        .collect();
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n<ul>\n{links}</ul>\n</body>\n</html>\n"
    )
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

fn mit_license(year: i32, owner: &str) -> String {
    format!(
        "MIT License

Copyright (c) {year} {owner}

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the \"Software\"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED \"AS IS\", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
"
    )
}
