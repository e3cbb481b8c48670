//! Payload Builder
//!
//! Turns the fixture set into the immutable job payloads that the
//! dispatcher posts on every iteration. Each payload carries three
//! test cases built from the same input/expected-output pair.
//!
//! **Known defect, kept as observed:** the PYTHON payload's `test3`
//! expected output comes from the C fixture rather than the Python one.
//! The compile service should therefore report a wrong answer for that
//! test case. See `expected_output_for`.

use crate::fixtures::FixtureSet;
use injector_common::config::JobLimits;
use injector_common::types::{test_case_key, CompileRequest, Language, TestCase};
use std::collections::BTreeMap;

pub const TEST_CASES_PER_PAYLOAD: usize = 3;

/// Expected output used for a given 1-based test case slot
fn expected_output_for<'a>(language: Language, slot: usize, fixtures: &'a FixtureSet) -> &'a str {
    match (language, slot) {
        (Language::Python, 3) => fixtures.get(Language::C).expected_output.as_str(),
        _ => fixtures.get(language).expected_output.as_str(),
    }
}

/// Build the job payload for a single language
pub fn build_payload(language: Language, fixtures: &FixtureSet, limits: JobLimits) -> CompileRequest {
    let fixture = fixtures.get(language);

    let test_cases: BTreeMap<String, TestCase> = (1..=TEST_CASES_PER_PAYLOAD)
        .map(|slot| {
            (
                test_case_key(slot),
                TestCase {
                    expected_output: expected_output_for(language, slot, fixtures).to_string(),
                    input: fixture.input.clone(),
                },
            )
        })
        .collect();

    CompileRequest {
        test_cases,
        language,
        memory_limit: limits.memory_limit,
        source_code: fixture.source_code.clone(),
        time_limit: limits.time_limit,
    }
}

/// Build payloads for the selected languages in canonical order.
/// An empty selection means every language.
pub fn build_payloads(
    fixtures: &FixtureSet,
    limits: JobLimits,
    selection: &[Language],
) -> Vec<CompileRequest> {
    Language::ALL
        .into_iter()
        .filter(|language| selection.is_empty() || selection.contains(language))
        .map(|language| build_payload(language, fixtures, limits))
        .collect()
}
