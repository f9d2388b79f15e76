//! Unit tests for the authorization decision table.
