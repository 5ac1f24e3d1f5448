//! End-to-end tests for the sweep engine, driven by mock collaborators.

#[cfg(test)]
mod support;
#[cfg(test)]
mod sweep;
