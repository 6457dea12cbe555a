//! Request-time orchestration: signup onboarding, snapshot capture and
//! AI insights. Every step that talks to a paid or flaky provider degrades
//! to stored data instead of failing the request.

pub mod insights;
pub mod onboarding;
pub mod snapshots;
