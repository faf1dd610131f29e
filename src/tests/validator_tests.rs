#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::config::Secret;
    use crate::implementations::validator::{ derive_repo_name, is_valid_repo_name, RequestValidator, ValidationError };
    use crate::tests::fakes::{ request_body, setup, SECRET };

    fn validator() -> RequestValidator {
        setup();
        RequestValidator::new(&Secret::new(SECRET))
    }

    #[test]
    fn test_valid_request_is_accepted() {
        let request = validator().validate(&request_body("A hello world page")).unwrap();

        assert_eq!(request.brief, "A hello world page");
        assert_eq!(request.repo_name, "gen-hello-world");
        assert_eq!(request.checks, vec!["Page shows a heading".to_string()]);
        assert_eq!(request.requester.email.as_deref(), Some("student@example.com"));
        assert_eq!(request.requester.round, 1);
        assert_eq!(request.requester.nonce.as_deref(), Some("abc123"));
        assert_eq!(request.evaluation_url.as_deref(), Some("https://evaluator.example.com/notify"));
        assert!(request.attachments.is_empty());
        assert!(!request.id.is_empty());
    }

    #[test]
    fn test_wrong_or_missing_secret_is_unauthorized() {
        let mut body = request_body("page");
        body["secret"] = json!("guess");
        assert!(matches!(validator().validate(&body), Err(ValidationError::Unauthorized(_))));

        let mut body = request_body("page");
        body.as_object_mut().unwrap().remove("secret");
        assert!(matches!(validator().validate(&body), Err(ValidationError::Unauthorized(_))));
    }

    #[test]
    fn test_secret_is_checked_before_other_fields() {
        // Broken in every other way, but the answer must still be about the secret
        let body = json!({ "secret": "nope", "round": "many", "attachments": 7 });
        assert!(matches!(validator().validate(&body), Err(ValidationError::Unauthorized(_))));
    }

    #[test]
    fn test_missing_or_blank_brief_is_malformed() {
        let mut body = request_body("x");
        body.as_object_mut().unwrap().remove("brief");
        assert!(matches!(validator().validate(&body), Err(ValidationError::Malformed(_))));

        let body = request_body("   ");
        assert!(matches!(validator().validate(&body), Err(ValidationError::Malformed(_))));
    }

    #[test]
    fn test_prompt_is_accepted_as_brief() {
        let body = json!({ "secret": SECRET, "prompt": "Make a todo list" });
        let request = validator().validate(&body).unwrap();
        assert_eq!(request.brief, "Make a todo list");
        assert_eq!(request.requester.round, 1);
        assert!(request.repo_name.starts_with("gen-"));
        assert_eq!(request.repo_name.len(), "gen-".len() + 8);
    }

    #[test]
    fn test_non_object_and_bad_field_types_are_malformed() {
        assert!(matches!(validator().validate(&json!(["a"])), Err(ValidationError::Malformed(_))));

        let mut body = request_body("page");
        body["round"] = json!("two");
        assert!(matches!(validator().validate(&body), Err(ValidationError::Malformed(_))));

        let mut body = request_body("page");
        body["round"] = json!(0);
        assert!(matches!(validator().validate(&body), Err(ValidationError::Malformed(_))));
    }

    #[test]
    fn test_email_and_evaluation_url_are_checked() {
        let mut body = request_body("page");
        body["email"] = json!("not-an-address");
        assert!(matches!(validator().validate(&body), Err(ValidationError::Malformed(_))));

        let mut body = request_body("page");
        body["evaluation_url"] = json!("ftp://example.com/x");
        assert!(matches!(validator().validate(&body), Err(ValidationError::Malformed(_))));

        let mut body = request_body("page");
        body["evaluation_url"] = json!("");
        assert_eq!(validator().validate(&body).unwrap().evaluation_url, None);
    }

    #[test]
    fn test_explicit_repo_name_must_follow_host_rules() {
        let mut body = request_body("page");
        body["repo_name"] = json!("my-site_v2.0");
        assert_eq!(validator().validate(&body).unwrap().repo_name, "my-site_v2.0");

        let mut body = request_body("page");
        body["repo_name"] = json!("bad name!");
        assert!(matches!(validator().validate(&body), Err(ValidationError::Malformed(_))));
    }

    #[test]
    fn test_attachments_are_decoded() {
        let mut body = request_body("page");
        body["attachments"] = json!([
            { "filename": "data.csv", "content_base64": "YSxiCjEsMgo=" },
            { "filename": "logo.txt", "content_base64": "data:text/plain;base64,aGk=" }
        ]);
        let request = validator().validate(&body).unwrap();
        assert_eq!(request.attachments.len(), 2);
        assert_eq!(request.attachments[0].bytes, b"a,b\n1,2\n".to_vec());
        assert_eq!(request.attachments[1].bytes, b"hi".to_vec());
    }

    #[test]
    fn test_invalid_attachment_is_malformed() {
        let mut body = request_body("page");
        body["attachments"] = json!([{ "filename": "x.bin", "content_base64": "!!not base64!!" }]);
        assert!(matches!(validator().validate(&body), Err(ValidationError::Malformed(_))));

        let mut body = request_body("page");
        body["attachments"] = json!([{ "filename": " ", "content_base64": "aGk=" }]);
        assert!(matches!(validator().validate(&body), Err(ValidationError::Malformed(_))));
    }

    #[test]
    fn test_repo_name_rules() {
        assert!(is_valid_repo_name("gen-abc"));
        assert!(!is_valid_repo_name(""));
        assert!(!is_valid_repo_name(".."));
        assert!(!is_valid_repo_name("has/slash"));
        assert!(!is_valid_repo_name(&"a".repeat(101)));
    }

    #[test]
    fn test_derived_names() {
        assert_eq!(derive_repo_name(Some("Captcha Solver #3")), "gen-captcha-solver-3");
        assert_eq!(derive_repo_name(Some("---")).len(), "gen-".len() + 8);
        assert!(is_valid_repo_name(&derive_repo_name(Some(&"long task ".repeat(30)))));
        assert!(is_valid_repo_name(&derive_repo_name(None)));
    }

    #[test]
    fn test_derived_name_never_ends_in_git_suffix_or_dot() {
        assert_eq!(derive_repo_name(Some("landing.git")), "gen-landing");
        assert_eq!(derive_repo_name(Some("Site.GIT.")), "gen-site");

        // Truncation lands right after ".git"
        let task = format!("{}.git.extra", "a".repeat(92));
        assert_eq!(derive_repo_name(Some(&task)), format!("gen-{}", "a".repeat(92)));

        // Truncation lands right after a dot
        let task = format!("{}.b", "a".repeat(95));
        assert_eq!(derive_repo_name(Some(&task)), format!("gen-{}", "a".repeat(95)));
    }
}
