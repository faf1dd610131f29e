#[cfg(test)]
mod tests {
    use tokio::test;

    use crate::errors::{ ErrorKind, HostError, PipelineError };
    use crate::implementations::publisher::{ describe, PublishError, RepositoryPublisher };
    use crate::models::artifact::{ FileOrigin, FileSet };
    use crate::models::repository::PublishStep;
    use crate::tests::fakes::{ setup, FakeHost, OWNER };

    fn files() -> FileSet {
        let mut files = FileSet::new();
        files.insert("index.html", "<html></html>\n", FileOrigin::Generated);
        files.insert("README.md", "# site\n", FileOrigin::Synthesized);
        files
    }

    #[test]
    async fn test_publish_runs_all_three_steps() {
        setup();
        let host = FakeHost::new();
        let publisher = RepositoryPublisher::new(host.clone(), OWNER);

        let receipt = publisher.publish("gen-site", "A site", &files(), "Initial site").await.unwrap();

        assert_eq!(receipt.repository.name, "gen-site");
        assert_eq!(receipt.repository.html_url, format!("https://github.com/{}/gen-site", OWNER));
        assert_eq!(receipt.site_url, "https://octoorg.github.io/gen-site/");
        assert_eq!(receipt.repository.site_url.as_deref(), Some("https://octoorg.github.io/gen-site/"));
        assert_eq!(receipt.commit_sha.len(), 40);

        let (repo, pushed, message) = host.last_push().unwrap();
        assert_eq!(repo, "gen-site");
        assert_eq!(pushed, files());
        assert_eq!(message, "Initial site");
        assert_eq!((host.create_calls(), host.push_calls(), host.site_calls()), (1, 1, 1));
    }

    #[test]
    async fn test_existing_repository_is_a_conflict() {
        setup();
        let host = FakeHost::new();
        let publisher = RepositoryPublisher::new(host.clone(), OWNER);
        publisher.publish("gen-site", "", &files(), "first").await.unwrap();

        let err = publisher.publish("gen-site", "", &files(), "second").await.unwrap_err();

        assert_eq!(err.step(), PublishStep::CreateRepository);
        assert!(err.repository().is_none());
        let err = PipelineError::from(err);
        assert_eq!(err.kind(), ErrorKind::RepoAlreadyExists);
        // Nothing was pushed the second time
        assert_eq!(host.push_calls(), 1);
    }

    #[test]
    async fn test_create_failure_is_not_a_publish_failure() {
        setup();
        let host = FakeHost::failing_at(PublishStep::CreateRepository, HostError::Unauthorized("Bad credentials".to_string()));
        let publisher = RepositoryPublisher::new(host.clone(), OWNER);

        let err = publisher.publish("gen-site", "", &files(), "m").await.unwrap_err();

        assert!(matches!(err, PublishError::Create(HostError::Unauthorized(_))));
        assert_eq!(PipelineError::from(err).kind(), ErrorKind::RepoCreateFailed);
        assert_eq!(host.push_calls(), 0);
    }

    #[test]
    async fn test_push_failure_keeps_repository() {
        setup();
        let host = FakeHost::failing_at(PublishStep::PushFiles, HostError::Http { status: 500, message: "oops".to_string() });
        let publisher = RepositoryPublisher::new(host.clone(), OWNER);

        let err = publisher.publish("gen-site", "", &files(), "m").await.unwrap_err();

        assert_eq!(err.step(), PublishStep::PushFiles);
        assert_eq!(err.repository().unwrap().name, "gen-site");
        assert!(host.exists("gen-site"));
        assert_eq!(host.site_calls(), 0);
    }

    #[test]
    async fn test_site_failure_reports_repository_url() {
        setup();
        let host = FakeHost::failing_at(PublishStep::EnableSite, HostError::NotFound("pages".to_string()));
        let publisher = RepositoryPublisher::new(host, OWNER);

        let err = PipelineError::from(publisher.publish("gen-site", "", &files(), "m").await.unwrap_err());

        assert_eq!(err.kind(), ErrorKind::RepoPublishFailed);
        assert_eq!(err.repository().unwrap().html_url, format!("https://github.com/{}/gen-site", OWNER));
        assert!(err.to_string().contains("enable-site"));
    }

    #[test]
    async fn test_describe_uses_first_line() {
        assert_eq!(describe("Calculator\nwith buttons"), "Calculator");
        let long = "x".repeat(200);
        assert_eq!(describe(&long).chars().count(), 123);
    }
}
