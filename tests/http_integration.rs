//! HTTP-level integration tests against a local mockito server.

mod integration;
