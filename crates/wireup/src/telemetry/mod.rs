// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Structured log events emitted while deriving and validating providers.
//!
//! Events are only emitted when the `logs` feature is enabled.

#[cfg(test)]
pub(crate) mod testing;

use crate::{Provider, ValidationError};

pub(crate) const PROVIDER_DERIVED: &str = "wireup.provider.derived";
pub(crate) const PROVIDER_INVALID: &str = "wireup.provider.invalid";

#[cfg_attr(
    not(any(feature = "logs", test)),
    expect(unused_variables, reason = "unused when logs feature not used")
)]
pub(crate) fn provider_derived(provider: &Provider) {
    #[cfg(any(feature = "logs", test))]
    tracing::event!(
        name: PROVIDER_DERIVED,
        tracing::Level::DEBUG,
        provider.kind = %provider.kind(),
        provider.scope = %provider.scope(),
        provider.dependencies = provider.dependencies().len(),
        provider.components = provider.components().len(),
    );
}

#[cfg_attr(
    not(any(feature = "logs", test)),
    expect(unused_variables, reason = "unused when logs feature not used")
)]
pub(crate) fn provider_invalid(provider: &Provider, error: &ValidationError) {
    #[cfg(any(feature = "logs", test))]
    tracing::event!(
        name: PROVIDER_INVALID,
        tracing::Level::WARN,
        provider.kind = %provider.kind(),
        provider.scope = %provider.scope(),
        provider.location = %provider.location().map_or_else(|| "<unknown>".to_string(), ToString::to_string),
        validation.issues = error.issues().len(),
        validation.error = %error,
    );
}
