//! Unit tests for the planning bounded context.

mod support;
