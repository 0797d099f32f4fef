// Admin handlers: every route is protected by the JWT principal middleware
// and keyed by the `:entity` path segment.

pub mod admin;
