// crates/pact-harness-model/src/selection.rs
// ============================================================================
// Module: Interaction Selection
// Description: Filter pacts by participant and interactions by state.
// Purpose: Locate the interaction a verification targets.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Selection is a pair of predicates applied in order:
//! - [`PactFilter`] keeps pacts whose consumer/provider names match exactly.
//! - [`InteractionSelector`] keeps interactions whose provider state and
//!   description match, compared ASCII case-insensitively.
//!
//! Unset fields match everything. When several interactions match, the first
//! one in pact order, then interaction order, wins.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::model::Interaction;
use crate::model::Pact;

// ============================================================================
// SECTION: Pact Filter
// ============================================================================

/// Consumer/provider name filter over pacts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PactFilter {
    /// Required consumer name.
    pub consumer: Option<String>,
    /// Required provider name.
    pub provider: Option<String>,
}

impl PactFilter {
    /// Restricts the filter to a consumer name.
    #[must_use]
    pub fn with_consumer(mut self, consumer: impl Into<String>) -> Self {
        self.consumer = Some(consumer.into());
        self
    }

    /// Restricts the filter to a provider name.
    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Returns true when the pact passes the filter.
    #[must_use]
    pub fn matches(&self, pact: &Pact) -> bool {
        self.provider.as_deref().is_none_or(|name| name == pact.provider.name)
            && self.consumer.as_deref().is_none_or(|name| name == pact.consumer.name)
    }

    /// Keeps the pacts that pass the filter, preserving order.
    #[must_use]
    pub fn apply(&self, pacts: Vec<Pact>) -> Vec<Pact> {
        pacts.into_iter().filter(|pact| self.matches(pact)).collect()
    }
}

// ============================================================================
// SECTION: Interaction Selector
// ============================================================================

/// Provider-state and description predicate over interactions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionSelector {
    /// Required provider state name.
    pub provider_state: Option<String>,
    /// Required interaction description.
    pub description: Option<String>,
}

impl InteractionSelector {
    /// Creates a selector for a provider state.
    #[must_use]
    pub fn for_state(provider_state: impl Into<String>) -> Self {
        Self {
            provider_state: Some(provider_state.into()),
            description: None,
        }
    }

    /// Restricts the selector to an interaction description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns true when neither state nor description is set.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.provider_state.is_none() && self.description.is_none()
    }

    /// Returns true when the interaction satisfies every set field.
    #[must_use]
    pub fn matches(&self, interaction: &Interaction) -> bool {
        let state_matches = self
            .provider_state
            .as_deref()
            .is_none_or(|expected| interaction.has_provider_state(expected));
        let description_matches = self
            .description
            .as_deref()
            .is_none_or(|expected| interaction.description().eq_ignore_ascii_case(expected));
        state_matches && description_matches
    }
}

/// An interaction together with the pact that declares it.
#[derive(Debug, Clone, Copy)]
pub struct SelectedInteraction<'a> {
    /// Declaring pact.
    pub pact: &'a Pact,
    /// Matched interaction.
    pub interaction: &'a Interaction,
}

// ============================================================================
// SECTION: Selection
// ============================================================================

/// Iterates the interactions of all pacts that match the selector.
pub fn interactions<'a, I>(
    pacts: I,
    selector: &'a InteractionSelector,
) -> impl Iterator<Item = &'a Interaction> + 'a
where
    I: IntoIterator<Item = &'a Pact>,
    I::IntoIter: 'a,
{
    selected(pacts, selector).map(|selected| selected.interaction)
}

/// Returns the first interaction matching the selector.
#[must_use]
pub fn first_interaction<'a, I>(
    pacts: I,
    selector: &'a InteractionSelector,
) -> Option<SelectedInteraction<'a>>
where
    I: IntoIterator<Item = &'a Pact>,
    I::IntoIter: 'a,
{
    selected(pacts, selector).next()
}

/// Iterates matching interactions paired with their pacts.
fn selected<'a, I>(
    pacts: I,
    selector: &'a InteractionSelector,
) -> impl Iterator<Item = SelectedInteraction<'a>> + 'a
where
    I: IntoIterator<Item = &'a Pact>,
    I::IntoIter: 'a,
{
    pacts
        .into_iter()
        .flat_map(|pact| {
            pact.interactions.iter().map(move |interaction| SelectedInteraction {
                pact,
                interaction,
            })
        })
        .filter(move |selected| selector.matches(selected.interaction))
}
