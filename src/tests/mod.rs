
mod artifact_builder_tests;
mod generation_client_tests;
mod publisher_tests;
mod validator_tests;
