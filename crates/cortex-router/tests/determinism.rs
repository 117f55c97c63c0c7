// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Selection and routing are pure functions of their inputs.

use cortex_core::ModelId;
use cortex_router::{Availability, ModelSelector, ProviderRouter, TaskProfiler, next_fallback};
use proptest::prelude::*;
use strum::IntoEnumIterator;

fn any_model() -> impl Strategy<Value = ModelId> {
    proptest::sample::select(ModelId::iter().collect::<Vec<_>>())
}

fn any_router() -> impl Strategy<Value = ProviderRouter> {
    (any::<bool>(), any::<bool>(), any::<[bool; 3]>()).prop_map(|(direct, fallback, keys)| {
        ProviderRouter::new(
            direct,
            fallback,
            Availability {
                anthropic: keys[0],
                openai: keys[1],
                openrouter: keys[2],
            },
            "https://openrouter.ai/api/v1",
        )
    })
}

proptest! {
    #[test]
    fn select_is_deterministic(input in "[a-zA-Z ,.?!']{0,200}") {
        let profile = TaskProfiler::new().profile(&input);
        let selector = ModelSelector::new();
        prop_assert_eq!(selector.select(&profile), selector.select(&profile));
    }

    #[test]
    fn forced_select_is_deterministic(input in "[a-z ]{0,80}", model in any_model()) {
        let profile = TaskProfiler::new().profile(&input);
        let selector = ModelSelector::new();
        prop_assert_eq!(
            selector.select_forced(model, &profile),
            selector.select_forced(model, &profile)
        );
    }

    #[test]
    fn route_is_deterministic(router in any_router(), model in any_model()) {
        prop_assert_eq!(router.route(model), router.route(model));
    }

    #[test]
    fn upgrade_chain_terminates(input in "[a-z ]{0,80}", model in any_model()) {
        let profile = TaskProfiler::new().profile(&input);
        let selector = ModelSelector::new();
        let mut selection = selector.select_forced(model, &profile);
        let mut steps = 0;
        while selection.fallback.is_some() {
            selection = selector.upgrade(&selection, &profile);
            steps += 1;
            prop_assert!(steps <= 8, "escalation chain did not terminate");
        }
        prop_assert_eq!(selection.fallback, None);
    }
}

#[test]
fn every_chain_ends_at_a_model_without_successor() {
    for model in ModelId::iter() {
        let mut current = model;
        let mut hops = 0;
        while let Some(next) = next_fallback(current) {
            current = next;
            hops += 1;
            assert!(hops <= 8);
        }
        assert_eq!(next_fallback(current), None);
    }
}
