#[cfg(test)]
mod tests {
    use chrono::{ TimeZone, Utc };
    use std::time::Duration;

    use crate::implementations::artifact_builder::{ ArtifactBuilder, ArtifactError, ENTRY_PAGE };
    use crate::models::artifact::FileOrigin;
    use crate::models::generation::GenerationResult;
    use crate::models::request::{ GenerationRequest, Requester };
    use crate::tests::fakes::{ setup, HELLO_PAGE, OWNER };

    fn generation(content: &str) -> GenerationResult {
        GenerationResult {
            content: content.to_string(),
            provider: "aipipe".to_string(),
            model: "gpt-4o-mini".to_string(),
            fallback_used: false,
            primary_error: None,
            elapsed: Duration::from_millis(1200),
            generated_at: Utc::now(),
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            id: "req-1".to_string(),
            brief: "A hello world page".to_string(),
            repo_name: "gen-hello".to_string(),
            checks: vec!["Shows a heading".to_string()],
            requester: Requester { round: 1, ..Requester::default() },
            evaluation_url: None,
            attachments: Vec::new(),
            received_at: Utc.with_ymd_and_hms(2025, 3, 4, 10, 0, 0).unwrap(),
        }
    }

    fn build(content: &str) -> Result<crate::models::artifact::FileSet, ArtifactError> {
        setup();
        ArtifactBuilder::new(OWNER).build(&generation(content), &request())
    }

    #[test]
    fn test_hello_page_becomes_entry_page_plus_support_files() {
        let files = build(HELLO_PAGE).unwrap();

        assert_eq!(files.paths(), vec![ENTRY_PAGE, "README.md", "LICENSE"]);
        let index = files.get(ENTRY_PAGE).unwrap();
        assert_eq!(index.origin, FileOrigin::Generated);
        assert!(index.content.contains("<h1>Hello, world</h1>"));
        assert_eq!(files.generated_count(), 1);
    }

    #[test]
    fn test_support_files_content() {
        let files = build(HELLO_PAGE).unwrap();

        let readme = &files.get("README.md").unwrap().content;
        assert!(readme.starts_with("# gen-hello\n"));
        assert!(readme.contains("A hello world page"));
        assert!(readme.contains("- Shows a heading"));
        assert!(readme.contains("aipipe"));

        let license = &files.get("LICENSE").unwrap().content;
        assert!(license.starts_with("MIT License"));
        assert!(license.contains(&format!("Copyright (c) 2025 {}", OWNER)));
    }

    #[test]
    fn test_multiple_files_keep_their_order_and_paths() {
        let content = "\
**index.html**
```html
<!DOCTYPE html><html><head><link rel=\"stylesheet\" href=\"css/style.css\"></head></html>
```

```css css/style.css
body { margin: 0; }
```

```js path=app.js
console.log('hi');
```
";
        let files = build(content).unwrap();
        assert_eq!(files.paths(), vec!["index.html", "css/style.css", "app.js", "README.md", "LICENSE"]);
        assert_eq!(files.get("app.js").unwrap().content, "console.log('hi');\n");
    }

    #[test]
    fn test_generated_readme_and_license_are_not_replaced() {
        let content = "\
```html index.html
<html></html>
```
```markdown README.md
# Custom
```
```text LICENSE.txt
Apache
```
";
        let files = build(content).unwrap();
        assert_eq!(files.get("README.md").unwrap().content, "# Custom\n");
        assert_eq!(files.get("README.md").unwrap().origin, FileOrigin::Generated);
        // LICENSE.txt is a different path, so LICENSE is still added
        assert!(files.contains("LICENSE.txt"));
        assert_eq!(files.get("LICENSE").unwrap().origin, FileOrigin::Synthesized);
    }

    #[test]
    fn test_readme_with_inner_fences_is_kept_whole() {
        let content = "\
```html index.html
<h1>Docs site</h1>
```

````markdown README.md
# Title

```bash
npm i
```

More docs
````
";
        let files = build(content).unwrap();
        assert_eq!(files.paths(), vec!["index.html", "README.md", "LICENSE"]);
        let readme = files.get("README.md").unwrap();
        assert_eq!(readme.origin, FileOrigin::Generated);
        assert_eq!(readme.content, "# Title\n\n```bash\nnpm i\n```\n\nMore docs\n");
    }

    #[test]
    fn test_directory_path_without_extension() {
        let content = "```html index.html\n<p>x</p>\n```\n```sh scripts/run\n#!/bin/sh\necho hi\n```\n";
        let files = build(content).unwrap();
        assert_eq!(files.get("scripts/run").unwrap().content, "#!/bin/sh\necho hi\n");
    }

    #[test]
    fn test_generation_result_exposes_file_pairs() {
        let result = generation("Intro\n```css css/site.css\nbody {}\n```\n```html\n<p>hi</p>\n```\n");
        assert_eq!(
            result.files(),
            vec![
                ("css/site.css".to_string(), "body {}\n".to_string()),
                ("index.html".to_string(), "<p>hi</p>\n".to_string())
            ]
        );
        assert!(generation("no code here").files().is_empty());
    }

    #[test]
    fn test_duplicate_paths_keep_first() {
        let content = "```html index.html\n<p>first</p>\n```\n```html index.html\n<p>second</p>\n```\n";
        let files = build(content).unwrap();
        assert!(files.get(ENTRY_PAGE).unwrap().content.contains("first"));
        assert_eq!(files.generated_count(), 1);
    }

    #[test]
    fn test_unlabelled_blocks_get_default_names() {
        let content = "```html\n<p>a</p>\n```\n```css\np {}\n```\n```html\n<p>b</p>\n```\n```\nplain\n```\n";
        let files = build(content).unwrap();
        assert_eq!(
            files.paths(),
            vec!["index.html", "style.css", "index-3.html", "snippet-4.txt", "README.md", "LICENSE"]
        );
    }

    #[test]
    fn test_unsafe_paths_are_skipped() {
        let content = "```html ../evil.html\n<p>x</p>\n```\n```html about.html\n<p>about</p>\n```\n";
        let files = build(content).unwrap();
        assert!(!files.paths().iter().any(|p| p.contains("..")));
        assert!(files.contains("about.html"));
    }

    #[test]
    fn test_missing_entry_page_redirects_to_first_html() {
        let content = "```html about.html\n<p>about</p>\n```\n";
        let files = build(content).unwrap();
        let index = files.get(ENTRY_PAGE).unwrap();
        assert_eq!(index.origin, FileOrigin::Synthesized);
        assert!(index.content.contains("url=about.html"));
    }

    #[test]
    fn test_missing_entry_page_lists_files_without_html() {
        let content = "```js app.js\nalert(1)\n```\n";
        let files = build(content).unwrap();
        let index = &files.get(ENTRY_PAGE).unwrap().content;
        assert!(index.contains("<a href=\"app.js\">app.js</a>"));
        assert!(index.contains("<title>gen-hello</title>"));
    }

    #[test]
    fn test_bare_html_document_is_used() {
        let content = "Sure! Here you go:\n<!DOCTYPE html>\n<html><body>plain</body></html>";
        let files = build(content).unwrap();
        let index = &files.get(ENTRY_PAGE).unwrap().content;
        assert!(index.starts_with("<!DOCTYPE html>"));
        assert!(index.contains("plain"));
    }

    #[test]
    fn test_unusable_content_is_an_error() {
        assert_eq!(build("  \n "), Err(ArtifactError::EmptyContent));
        assert!(matches!(build("I cannot help with that."), Err(ArtifactError::NoUsableFiles(_))));
        assert!(matches!(build("```html\n\n```\n"), Err(ArtifactError::NoUsableFiles(_))));
    }

    #[test]
    fn test_same_input_same_output() {
        let first = build(HELLO_PAGE).unwrap();
        let second = build(HELLO_PAGE).unwrap();
        assert_eq!(first, second);
    }
}
